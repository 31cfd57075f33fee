// ABOUTME: Evaluator, reduces an Expr against an Environment to a Value

use crate::builtins::{arithmetic, comparison, lists, logic, types};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::expr::Expr;
use crate::syntax::Syntax;
use crate::tables::{primitive_name, PrimTag};
use crate::value::{ProcedureData, Value};
use std::rc::Rc;

/// Applicative-order, left-to-right, recursive descent on the host call
/// stack. There is no trampoline here, and deep recursion is a documented
/// limitation, not a bug (tail calls are a non-goal).
pub fn eval(expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Fixnum(n) => Ok(Value::Integer(*n)),
        Expr::RationalNum(n, d) => Ok(Value::rational(*n, *d)),
        Expr::StringExpr(s) => Ok(Value::string(s)),
        Expr::True => Ok(Value::Boolean(true)),
        Expr::False => Ok(Value::Boolean(false)),
        Expr::MakeVoid => Ok(Value::Void),
        Expr::Exit => Ok(Value::Terminate),
        Expr::Var(name) => eval_var(name, env),
        Expr::Quote(syntax) => Ok(syntax_to_value(syntax)),
        Expr::If(c, t, e) => {
            if eval(c, env)?.is_truthy() {
                eval(t, env)
            } else {
                eval(e, env)
            }
        }
        Expr::Cond(clauses) => eval_cond(clauses, env),
        Expr::AndVar(rands) => eval_and(rands, env),
        Expr::OrVar(rands) => eval_or(rands, env),
        Expr::Begin(exprs) => eval_begin(exprs, env),
        Expr::Lambda { params, body } => Ok(Value::Procedure(Rc::new(ProcedureData::Closure {
            params: params.clone(),
            body: body.clone(),
            env: env.clone(),
        }))),
        Expr::Apply(rator, rands) => eval_apply(rator, rands, env),
        Expr::Define(name, value_expr) => {
            let value = eval(value_expr, env)?;
            env.define(name.clone(), value);
            Ok(Value::Void)
        }
        Expr::Let { bindings, body } => eval_let(bindings, body, env),
        Expr::Letrec { bindings, body } => eval_letrec(bindings, body, env),
        Expr::Set(name, value_expr) => {
            let value = eval(value_expr, env)?;
            env.set(name, value)?;
            Ok(Value::Void)
        }
        Expr::Prim1(tag, a) => eval_prim1(*tag, eval(a, env)?),
        Expr::Prim2(tag, a, b) => eval_prim2(*tag, eval(a, env)?, eval(b, env)?),
        Expr::PrimVar(tag, rands) => {
            let args = rands.iter().map(|r| eval(r, env)).collect::<Result<Vec<_>, _>>()?;
            eval_prim_var(*tag, args)
        }
    }
}

fn eval_var(name: &str, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    if let Some(value) = env.get(name) {
        return Ok(value);
    }
    if let Some(tag) = crate::tables::lookup_primitive(name) {
        return Ok(Value::Procedure(Rc::new(ProcedureData::Native(tag))));
    }
    Err(RuntimeError::UndefinedVariable(name.to_string()))
}

fn eval_cond(clauses: &[Vec<Expr>], env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    for clause in clauses {
        let (test, rest) = clause.split_first().expect("parser rejects empty cond clauses");
        let taken = match test {
            Expr::Var(name) if name == "else" => true,
            _ => eval(test, env)?.is_truthy(),
        };
        if taken {
            return eval_begin(rest, env);
        }
    }
    Ok(Value::Void)
}

fn eval_and(rands: &[Expr], env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    for rand in rands {
        if !eval(rand, env)?.is_truthy() {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn eval_or(rands: &[Expr], env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    for rand in rands {
        if eval(rand, env)?.is_truthy() {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn eval_begin(exprs: &[Expr], env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    let mut result = Value::Void;
    for e in exprs {
        result = eval(e, env)?;
    }
    Ok(result)
}

fn eval_apply(rator: &Expr, rands: &[Expr], env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    let proc = eval(rator, env)?;
    let proc = match proc {
        Value::Procedure(p) => p,
        other => {
            return Err(RuntimeError::wrong_type(
                "apply",
                "a procedure",
                other.type_name(),
            ))
        }
    };
    let args = rands.iter().map(|r| eval(r, env)).collect::<Result<Vec<_>, _>>()?;
    match &*proc {
        ProcedureData::Closure { params, body, env: closure_env } => {
            if args.len() != params.len() {
                return Err(RuntimeError::wrong_arity(
                    "procedure",
                    params.len().to_string(),
                    args.len(),
                ));
            }
            // Extend the closure's captured environment, not the caller's.
            // This is what makes `c`'s later reference to `x` in
            // `(define c (let ((x 1)) (lambda () x)))` immune to a later
            // top-level `(define x 999)`.
            let call_env = Environment::with_parent(closure_env.clone());
            for (param, arg) in params.iter().zip(args) {
                call_env.define(param.clone(), arg);
            }
            eval(body, &call_env)
        }
        ProcedureData::Native(tag) => apply_native(*tag, args),
    }
}

/// Applies a bare (first-class) primitive to already-evaluated arguments,
/// using the same arity policy the parser enforces at a direct call site:
/// variadic tags dispatch straight to their `*_var` kernel with whatever
/// argument count was supplied, and fixed-arity tags check their arity here
/// instead of relying on a materialized lambda's parameter count.
fn apply_native(tag: PrimTag, args: Vec<Value>) -> Result<Value, RuntimeError> {
    use PrimTag::*;
    match tag {
        Plus | Minus | Mul | Div | Lt | Le | NumEq | Ge | Gt | List => eval_prim_var(tag, args),
        MakeVoid | Exit => {
            if !args.is_empty() {
                return Err(RuntimeError::wrong_arity(primitive_name(tag), "0", args.len()));
            }
            Ok(if tag == MakeVoid { Value::Void } else { Value::Terminate })
        }
        Car | Cdr | Not | Display | IsBoolean | IsInteger | IsNull | IsPair | IsProcedure
        | IsSymbol | IsString | IsList => {
            if args.len() != 1 {
                return Err(RuntimeError::wrong_arity(primitive_name(tag), "1", args.len()));
            }
            eval_prim1(tag, args.into_iter().next().unwrap())
        }
        Modulo | Expt | Cons | SetCar | SetCdr | IsEq => {
            if args.len() != 2 {
                return Err(RuntimeError::wrong_arity(primitive_name(tag), "2", args.len()));
            }
            let mut args = args.into_iter();
            let a = args.next().unwrap();
            let b = args.next().unwrap();
            eval_prim2(tag, a, b)
        }
    }
}

fn eval_let(bindings: &[(String, Expr)], body: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    let new_env = Environment::with_parent(env.clone());
    for (name, rhs) in bindings {
        // Every rhs sees the outer env; none of them see each other.
        let value = eval(rhs, env)?;
        new_env.define(name.clone(), value);
    }
    eval(body, &new_env)
}

fn eval_letrec(bindings: &[(String, Expr)], body: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    let new_env = Environment::with_parent(env.clone());
    for (name, _) in bindings {
        new_env.define(name.clone(), Value::Void);
    }
    for (name, rhs) in bindings {
        // Each rhs sees the fully-extended env, enabling mutual recursion
        // among letrec-bound lambdas.
        let value = eval(rhs, &new_env)?;
        new_env.set(name, value)?;
    }
    eval(body, &new_env)
}

/// Converts a quoted `Syntax` tree into a `Value` by structural fold:
/// numbers/rationals/strings/booleans map to their value counterparts,
/// symbols become `Symbol`, and lists become right-associated `Pair`
/// chains terminated by `Null` (an empty list becomes `Null`).
fn syntax_to_value(stx: &Syntax) -> Value {
    match stx {
        Syntax::Number(n) => Value::Integer(*n),
        Syntax::Rational(n, d) => Value::rational(*n, *d),
        Syntax::StringLit(s) => Value::string(s),
        Syntax::Symbol(s) => Value::symbol(s),
        Syntax::True => Value::Boolean(true),
        Syntax::False => Value::Boolean(false),
        Syntax::List(items) => items
            .iter()
            .rev()
            .fold(Value::Null, |tail, item| Value::cons(syntax_to_value(item), tail)),
    }
}

fn eval_prim1(tag: PrimTag, a: Value) -> Result<Value, RuntimeError> {
    use PrimTag::*;
    match tag {
        Car => lists::car(&a),
        Cdr => lists::cdr(&a),
        Not => logic::not(&a),
        Display => {
            print!("{}", crate::value::display_string(&a));
            Ok(Value::Void)
        }
        IsBoolean => Ok(types::is_boolean(&a)),
        IsInteger => Ok(types::is_integer(&a)),
        IsNull => Ok(types::is_null(&a)),
        IsPair => Ok(types::is_pair(&a)),
        IsProcedure => Ok(types::is_procedure(&a)),
        IsSymbol => Ok(types::is_symbol(&a)),
        IsString => Ok(types::is_string(&a)),
        IsList => Ok(lists::is_list(&a)),
        other => unreachable!("{other:?} is not a unary primitive"),
    }
}

fn eval_prim2(tag: PrimTag, a: Value, b: Value) -> Result<Value, RuntimeError> {
    use PrimTag::*;
    match tag {
        Plus => arithmetic::add2(&a, &b),
        Minus => arithmetic::sub2(&a, &b),
        Mul => arithmetic::mul2(&a, &b),
        Div => arithmetic::div2(&a, &b),
        Modulo => arithmetic::modulo(&a, &b),
        Expt => arithmetic::expt(&a, &b),
        Lt => comparison::lt2(&a, &b),
        Le => comparison::le2(&a, &b),
        NumEq => comparison::num_eq2(&a, &b),
        Ge => comparison::ge2(&a, &b),
        Gt => comparison::gt2(&a, &b),
        Cons => Ok(lists::cons(a, b)),
        SetCar => lists::set_car(&a, b),
        SetCdr => lists::set_cdr(&a, b),
        IsEq => Ok(Value::Boolean(a.is_eq(&b))),
        other => unreachable!("{other:?} is not a binary primitive"),
    }
}

fn eval_prim_var(tag: PrimTag, args: Vec<Value>) -> Result<Value, RuntimeError> {
    use PrimTag::*;
    match tag {
        Plus => arithmetic::add_var(&args),
        Minus => arithmetic::sub_var(&args),
        Mul => arithmetic::mul_var(&args),
        Div => arithmetic::div_var(&args),
        Lt => comparison::lt_var(&args),
        Le => comparison::le_var(&args),
        NumEq => comparison::num_eq_var(&args),
        Ge => comparison::ge_var(&args),
        Gt => comparison::gt_var(&args),
        List => Ok(lists::list(args)),
        other => unreachable!("{other:?} is not a variadic primitive"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::syntax::Syntax;

    fn run(src: Syntax) -> Value {
        let env = Environment::new();
        let expr = parse(&src, &env).unwrap();
        eval(&expr, &env).unwrap()
    }

    fn sym(s: &str) -> Syntax {
        Syntax::Symbol(s.to_string())
    }
    fn list(items: Vec<Syntax>) -> Syntax {
        Syntax::List(items)
    }
    fn num(n: i64) -> Syntax {
        Syntax::Number(n)
    }

    #[test]
    fn arithmetic_sum() {
        let v = run(list(vec![sym("+"), num(1), num(2), num(3)]));
        assert!(matches!(v, Value::Integer(6)));
    }

    #[test]
    fn rational_arithmetic() {
        let v = run(list(vec![sym("/"), num(1), num(2)]));
        assert!(matches!(v, Value::Rational(1, 2)));

        let v = run(list(vec![sym("*"), Syntax::Rational(1, 2), num(4)]));
        assert!(matches!(v, Value::Integer(2)));

        let v = run(list(vec![sym("+"), Syntax::Rational(1, 3), Syntax::Rational(1, 6)]));
        assert!(matches!(v, Value::Rational(1, 2)));
    }

    #[test]
    fn modulo_by_zero_errors() {
        let env = Environment::new();
        let expr = parse(&list(vec![sym("modulo"), num(10), num(0)]), &env).unwrap();
        assert!(eval(&expr, &env).is_err());
    }

    #[test]
    fn factorial_via_recursive_define() {
        let env = Environment::new();
        let def = list(vec![
            sym("define"),
            list(vec![sym("f"), sym("n")]),
            list(vec![
                sym("if"),
                list(vec![sym("="), sym("n"), num(0)]),
                num(1),
                list(vec![
                    sym("*"),
                    sym("n"),
                    list(vec![sym("f"), list(vec![sym("-"), sym("n"), num(1)])]),
                ]),
            ]),
        ]);
        eval(&parse(&def, &env).unwrap(), &env).unwrap();
        let call = list(vec![sym("f"), num(5)]);
        let v = eval(&parse(&call, &env).unwrap(), &env).unwrap();
        assert!(matches!(v, Value::Integer(120)));
    }

    #[test]
    fn pair_mutation_and_identity() {
        let env = Environment::new();
        let prog = list(vec![
            sym("let"),
            list(vec![list(vec![
                sym("p"),
                list(vec![sym("cons"), num(1), list(vec![sym("cons"), num(2), list(vec![sym("quote"), list(vec![])])])]),
            ])]),
            list(vec![
                sym("set-car!"),
                list(vec![sym("cdr"), sym("p")]),
                num(9),
            ]),
        ]);
        let expr = parse(&prog, &env).unwrap();
        eval(&expr, &env).unwrap();

        // (let ((p (cons 1 2))) (eq? p p)) => #t
        let eqp = list(vec![
            sym("let"),
            list(vec![list(vec![sym("p"), list(vec![sym("cons"), num(1), num(2)])])]),
            list(vec![sym("eq?"), sym("p"), sym("p")]),
        ]);
        let v = run(eqp);
        assert!(matches!(v, Value::Boolean(true)));
    }

    #[test]
    fn cond_picks_first_true_clause_and_else() {
        let v = run(list(vec![
            sym("cond"),
            list(vec![list(vec![sym("="), num(1), num(2)]), list(vec![sym("quote"), sym("a")])]),
            list(vec![list(vec![sym("="), num(2), num(2)]), list(vec![sym("quote"), sym("b")])]),
            list(vec![sym("else"), list(vec![sym("quote"), sym("c")])]),
        ]));
        assert!(matches!(v, Value::Symbol(ref s) if &**s == "b"));
    }

    #[test]
    fn let_shadows_if_as_variable() {
        let v = run(list(vec![
            sym("let"),
            list(vec![list(vec![sym("if"), num(42)])]),
            list(vec![sym("+"), sym("if"), num(1)]),
        ]));
        assert!(matches!(v, Value::Integer(43)));
    }

    #[test]
    fn and_or_return_literal_booleans() {
        assert!(matches!(
            run(list(vec![sym("and"), num(1), num(2), num(3)])),
            Value::Boolean(true)
        ));
        assert!(matches!(
            run(list(vec![sym("and"), num(1), Syntax::False, num(3)])),
            Value::Boolean(false)
        ));
        assert!(matches!(
            run(list(vec![sym("or"), Syntax::False, Syntax::False, num(5)])),
            Value::Boolean(true)
        ));
    }

    #[test]
    fn eq_on_symbols_vs_strings() {
        assert!(matches!(
            run(list(vec![sym("eq?"), list(vec![sym("quote"), sym("a")]), list(vec![sym("quote"), sym("a")])])),
            Value::Boolean(true)
        ));
        assert!(matches!(
            run(list(vec![sym("eq?"), Syntax::StringLit("a".into()), Syntax::StringLit("a".into())])),
            Value::Boolean(false)
        ));
    }

    #[test]
    fn letrec_mutual_recursion_terminates() {
        let env = Environment::new();
        let prog = list(vec![
            sym("letrec"),
            list(vec![
                list(vec![
                    sym("even?"),
                    list(vec![
                        sym("lambda"),
                        list(vec![sym("n")]),
                        list(vec![
                            sym("if"),
                            list(vec![sym("="), sym("n"), num(0)]),
                            Syntax::True,
                            list(vec![sym("odd?"), list(vec![sym("-"), sym("n"), num(1)])]),
                        ]),
                    ]),
                ]),
                list(vec![
                    sym("odd?"),
                    list(vec![
                        sym("lambda"),
                        list(vec![sym("n")]),
                        list(vec![
                            sym("if"),
                            list(vec![sym("="), sym("n"), num(0)]),
                            Syntax::False,
                            list(vec![sym("even?"), list(vec![sym("-"), sym("n"), num(1)])]),
                        ]),
                    ]),
                ]),
            ]),
            list(vec![sym("even?"), num(10)]),
        ]);
        let expr = parse(&prog, &env).unwrap();
        assert!(matches!(eval(&expr, &env).unwrap(), Value::Boolean(true)));
    }

    #[test]
    fn closure_captures_defining_env_not_later_redefinitions() {
        let env = Environment::new();
        let def_c = list(vec![
            sym("define"),
            sym("c"),
            list(vec![
                sym("let"),
                list(vec![list(vec![sym("x"), num(1)])]),
                list(vec![sym("lambda"), list(vec![]), sym("x")]),
            ]),
        ]);
        eval(&parse(&def_c, &env).unwrap(), &env).unwrap();
        let redefine_x = list(vec![sym("define"), sym("x"), num(999)]);
        eval(&parse(&redefine_x, &env).unwrap(), &env).unwrap();
        let call_c = list(vec![sym("c")]);
        let v = eval(&parse(&call_c, &env).unwrap(), &env).unwrap();
        assert!(matches!(v, Value::Integer(1)));
    }

    #[test]
    fn bare_primitive_materializes_as_first_class_procedure() {
        let env = Environment::new();
        let def = list(vec![sym("define"), sym("add+"), sym("+")]);
        eval(&parse(&def, &env).unwrap(), &env).unwrap();
        let call = list(vec![sym("add+"), num(1), num(2)]);
        let v = eval(&parse(&call, &env).unwrap(), &env).unwrap();
        assert!(matches!(v, Value::Integer(3)));
    }

    #[test]
    fn display_writes_raw_string_without_quotes() {
        let v = run(list(vec![sym("display"), Syntax::StringLit("hi".into())]));
        assert!(matches!(v, Value::Void));
    }

    #[test]
    fn bare_variadic_primitive_stays_variadic() {
        // ((lambda (op) (op 1 2 3)) +) => 6, not a WrongArity or a panic.
        let v = run(list(vec![
            list(vec![sym("lambda"), list(vec![sym("op")]), list(vec![sym("op"), num(1), num(2), num(3)])]),
            sym("+"),
        ]));
        assert!(matches!(v, Value::Integer(6)));
    }

    #[test]
    fn bare_list_primitive_materializes_without_panicking() {
        let env = Environment::new();
        let def = list(vec![sym("define"), sym("l"), sym("list")]);
        eval(&parse(&def, &env).unwrap(), &env).unwrap();
        let call = list(vec![sym("l"), num(1), num(2), num(3)]);
        let v = eval(&parse(&call, &env).unwrap(), &env).unwrap();
        match v {
            Value::Pair(_) => {}
            other => panic!("expected a proper list, got {other:?}"),
        }
    }
}
