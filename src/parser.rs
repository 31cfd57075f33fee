// ABOUTME: Syntax -> Expression translator with shadowing-aware keyword resolution

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::expr::Expr;
use crate::syntax::Syntax;
use crate::tables::{lookup_primitive, lookup_reserved, PrimTag, ReservedTag};
use crate::value::Value;
use std::rc::Rc;

/// Translates one `Syntax` tree into an `Expr`, resolving keywords against
/// `env`: a symbol is treated as a primitive or special form only if it is
/// *not* already bound in scope. This is what makes `(let ((if 1)) (+ if 2))`
/// parse `if` as a variable rather than the conditional.
pub fn parse(stx: &Syntax, env: &Rc<Environment>) -> Result<Expr, RuntimeError> {
    match stx {
        Syntax::Number(n) => Ok(Expr::Fixnum(*n)),
        Syntax::Rational(n, d) => Ok(Expr::RationalNum(*n, *d)),
        Syntax::StringLit(s) => Ok(Expr::StringExpr(s.clone())),
        Syntax::True => Ok(Expr::True),
        Syntax::False => Ok(Expr::False),
        Syntax::Symbol(name) => Ok(Expr::Var(name.clone())),
        Syntax::List(items) => parse_list(items, env),
    }
}

fn parse_all(items: &[Syntax], env: &Rc<Environment>) -> Result<Vec<Expr>, RuntimeError> {
    items.iter().map(|s| parse(s, env)).collect()
}

fn parse_list(items: &[Syntax], env: &Rc<Environment>) -> Result<Expr, RuntimeError> {
    if items.is_empty() {
        return Ok(Expr::Quote(Syntax::List(vec![])));
    }
    let head = &items[0];
    let args = &items[1..];

    let op = match head {
        Syntax::Symbol(name) => name,
        _ => {
            let rator = parse(head, env)?;
            let rands = parse_all(args, env)?;
            return Ok(Expr::Apply(Box::new(rator), rands));
        }
    };

    if env.is_bound(op) {
        let rands = parse_all(args, env)?;
        return Ok(Expr::Apply(Box::new(Expr::Var(op.clone())), rands));
    }
    if let Some(tag) = lookup_primitive(op) {
        return parse_primitive(tag, op, args, env);
    }
    if let Some(tag) = lookup_reserved(op) {
        return parse_reserved(tag, args, env);
    }

    let rands = parse_all(args, env)?;
    Ok(Expr::Apply(Box::new(Expr::Var(op.clone())), rands))
}

fn arity_error(name: &str, expected: &str, actual: usize) -> RuntimeError {
    RuntimeError::SyntaxError(format!(
        "{name}: expected {expected} argument(s), got {actual}"
    ))
}

fn parse_primitive(
    tag: PrimTag,
    name: &str,
    args: &[Syntax],
    env: &Rc<Environment>,
) -> Result<Expr, RuntimeError> {
    use PrimTag::*;
    match tag {
        Plus | Minus | Mul | Div => {
            let rands = parse_all(args, env)?;
            Ok(binary_or_variadic(tag, rands))
        }
        Lt | Le | NumEq | Ge | Gt => {
            if args.len() < 2 {
                return Err(arity_error(name, "at least 2", args.len()));
            }
            let rands = parse_all(args, env)?;
            Ok(binary_or_variadic(tag, rands))
        }
        Modulo | Expt | Cons | SetCar | SetCdr | IsEq => {
            if args.len() != 2 {
                return Err(arity_error(name, "2", args.len()));
            }
            let mut rands = parse_all(args, env)?;
            let b = rands.pop().unwrap();
            let a = rands.pop().unwrap();
            Ok(Expr::Prim2(tag, Box::new(a), Box::new(b)))
        }
        Car | Cdr | Not | Display | IsBoolean | IsInteger | IsNull | IsPair | IsProcedure
        | IsSymbol | IsString | IsList => {
            if args.len() != 1 {
                return Err(arity_error(name, "1", args.len()));
            }
            let mut rands = parse_all(args, env)?;
            Ok(Expr::Prim1(tag, Box::new(rands.pop().unwrap())))
        }
        List => {
            let rands = parse_all(args, env)?;
            Ok(Expr::PrimVar(tag, rands))
        }
        MakeVoid | Exit => {
            if !args.is_empty() {
                return Err(arity_error(name, "0", args.len()));
            }
            Ok(if tag == MakeVoid { Expr::MakeVoid } else { Expr::Exit })
        }
    }
}

fn binary_or_variadic(tag: PrimTag, mut rands: Vec<Expr>) -> Expr {
    if rands.len() == 2 {
        let b = rands.pop().unwrap();
        let a = rands.pop().unwrap();
        Expr::Prim2(tag, Box::new(a), Box::new(b))
    } else {
        Expr::PrimVar(tag, rands)
    }
}

fn extend_with_placeholders(env: &Rc<Environment>, names: &[String]) -> Rc<Environment> {
    let child = Environment::with_parent(env.clone());
    for name in names {
        child.define(name.clone(), Value::Void);
    }
    child
}

fn wrap_body(mut exprs: Vec<Expr>) -> Result<Expr, RuntimeError> {
    if exprs.len() == 1 {
        Ok(exprs.pop().unwrap())
    } else {
        Ok(Expr::Begin(exprs))
    }
}

fn symbol_names(list: &[Syntax], context: &str) -> Result<Vec<String>, RuntimeError> {
    list.iter()
        .map(|s| match s {
            Syntax::Symbol(name) => Ok(name.clone()),
            _ => Err(RuntimeError::SyntaxError(format!(
                "{context}: expected a symbol"
            ))),
        })
        .collect()
}

fn as_list<'a>(stx: &'a Syntax, context: &str) -> Result<&'a [Syntax], RuntimeError> {
    match stx {
        Syntax::List(items) => Ok(items),
        _ => Err(RuntimeError::SyntaxError(format!("{context}: expected a list"))),
    }
}

fn parse_reserved(tag: ReservedTag, args: &[Syntax], env: &Rc<Environment>) -> Result<Expr, RuntimeError> {
    use ReservedTag::*;
    match tag {
        If => {
            if args.len() != 3 {
                return Err(arity_error("if", "3", args.len()));
            }
            let c = parse(&args[0], env)?;
            let t = parse(&args[1], env)?;
            let e = parse(&args[2], env)?;
            Ok(Expr::If(Box::new(c), Box::new(t), Box::new(e)))
        }
        Lambda => {
            if args.is_empty() {
                return Err(RuntimeError::SyntaxError(
                    "lambda: expected a parameter list and a body".to_string(),
                ));
            }
            let params = symbol_names(as_list(&args[0], "lambda")?, "lambda")?;
            let inner = extend_with_placeholders(env, &params);
            let body = wrap_body(parse_all(&args[1..], &inner)?)?;
            Ok(Expr::Lambda {
                params,
                body: Rc::new(body),
            })
        }
        Quote => {
            if args.len() != 1 {
                return Err(arity_error("quote", "1", args.len()));
            }
            Ok(Expr::Quote(args[0].clone()))
        }
        Define => {
            if args.is_empty() {
                return Err(RuntimeError::SyntaxError("define: missing target".to_string()));
            }
            match &args[0] {
                Syntax::Symbol(name) => {
                    if args.len() != 2 {
                        return Err(arity_error("define", "2", args.len()));
                    }
                    let value = parse(&args[1], env)?;
                    Ok(Expr::Define(name.clone(), Box::new(value)))
                }
                Syntax::List(head) => {
                    let (fname, params) = head.split_first().ok_or_else(|| {
                        RuntimeError::SyntaxError("define: empty function header".to_string())
                    })?;
                    let fname = match fname {
                        Syntax::Symbol(name) => name.clone(),
                        _ => {
                            return Err(RuntimeError::SyntaxError(
                                "define: function name must be a symbol".to_string(),
                            ))
                        }
                    };
                    let params = symbol_names(params, "define")?;
                    if args.len() < 2 {
                        return Err(RuntimeError::SyntaxError(
                            "define: function body is required".to_string(),
                        ));
                    }
                    let inner = extend_with_placeholders(env, &params);
                    let body = wrap_body(parse_all(&args[1..], &inner)?)?;
                    Ok(Expr::Define(
                        fname,
                        Box::new(Expr::Lambda {
                            params,
                            body: Rc::new(body),
                        }),
                    ))
                }
                _ => Err(RuntimeError::SyntaxError(
                    "define: expected a name or a function header".to_string(),
                )),
            }
        }
        Begin => Ok(Expr::Begin(parse_all(args, env)?)),
        Cond => {
            let mut clauses = Vec::with_capacity(args.len());
            for clause in args {
                let items = as_list(clause, "cond")?;
                if items.is_empty() {
                    return Err(RuntimeError::SyntaxError(
                        "cond: clause must not be empty".to_string(),
                    ));
                }
                clauses.push(parse_all(items, env)?);
            }
            Ok(Expr::Cond(clauses))
        }
        Let => {
            if args.is_empty() {
                return Err(RuntimeError::SyntaxError(
                    "let: expected a binding list and a body".to_string(),
                ));
            }
            let binding_forms = as_list(&args[0], "let")?;
            let mut names = Vec::with_capacity(binding_forms.len());
            let mut rhs_exprs = Vec::with_capacity(binding_forms.len());
            for binding in binding_forms {
                let pair = as_list(binding, "let")?;
                if pair.len() != 2 {
                    return Err(RuntimeError::SyntaxError(
                        "let: each binding must be (name expr)".to_string(),
                    ));
                }
                let name = match &pair[0] {
                    Syntax::Symbol(n) => n.clone(),
                    _ => {
                        return Err(RuntimeError::SyntaxError(
                            "let: binding name must be a symbol".to_string(),
                        ))
                    }
                };
                // Each rhs is parsed in the outer (unaugmented) env.
                rhs_exprs.push(parse(&pair[1], env)?);
                names.push(name);
            }
            let inner = extend_with_placeholders(env, &names);
            let body = wrap_body(parse_all(&args[1..], &inner)?)?;
            let bindings = names.into_iter().zip(rhs_exprs).collect();
            Ok(Expr::Let {
                bindings,
                body: Box::new(body),
            })
        }
        Letrec => {
            if args.is_empty() {
                return Err(RuntimeError::SyntaxError(
                    "letrec: expected a binding list and a body".to_string(),
                ));
            }
            let binding_forms = as_list(&args[0], "letrec")?;
            let mut names = Vec::with_capacity(binding_forms.len());
            let mut rhs_forms = Vec::with_capacity(binding_forms.len());
            for binding in binding_forms {
                let pair = as_list(binding, "letrec")?;
                if pair.len() != 2 {
                    return Err(RuntimeError::SyntaxError(
                        "letrec: each binding must be (name expr)".to_string(),
                    ));
                }
                let name = match &pair[0] {
                    Syntax::Symbol(n) => n.clone(),
                    _ => {
                        return Err(RuntimeError::SyntaxError(
                            "letrec: binding name must be a symbol".to_string(),
                        ))
                    }
                };
                names.push(name);
                rhs_forms.push(pair[1].clone());
            }
            // All names go in first, so each rhs (and the body) can refer
            // to every other letrec-bound name.
            let inner = extend_with_placeholders(env, &names);
            let rhs_exprs = parse_all(&rhs_forms, &inner)?;
            let body = wrap_body(parse_all(&args[1..], &inner)?)?;
            let bindings = names.into_iter().zip(rhs_exprs).collect();
            Ok(Expr::Letrec {
                bindings,
                body: Box::new(body),
            })
        }
        Set => {
            if args.len() != 2 {
                return Err(arity_error("set!", "2", args.len()));
            }
            let name = match &args[0] {
                Syntax::Symbol(n) => n.clone(),
                _ => {
                    return Err(RuntimeError::SyntaxError(
                        "set!: target must be a symbol".to_string(),
                    ))
                }
            };
            let value = parse(&args[1], env)?;
            Ok(Expr::Set(name, Box::new(value)))
        }
        And => Ok(Expr::AndVar(parse_all(args, env)?)),
        Or => Ok(Expr::OrVar(parse_all(args, env)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(src: Syntax) -> Expr {
        let env = Environment::new();
        parse(&src, &env).unwrap()
    }

    fn sym(s: &str) -> Syntax {
        Syntax::Symbol(s.to_string())
    }

    fn list(items: Vec<Syntax>) -> Syntax {
        Syntax::List(items)
    }

    #[test]
    fn plus_two_args_is_binary() {
        let e = p(list(vec![sym("+"), Syntax::Number(1), Syntax::Number(2)]));
        assert!(matches!(e, Expr::Prim2(PrimTag::Plus, _, _)));
    }

    #[test]
    fn plus_three_args_is_variadic() {
        let e = p(list(vec![
            sym("+"),
            Syntax::Number(1),
            Syntax::Number(2),
            Syntax::Number(3),
        ]));
        assert!(matches!(e, Expr::PrimVar(PrimTag::Plus, _)));
    }

    #[test]
    fn shadowed_keyword_becomes_apply() {
        let env = Environment::new();
        env.define("if", Value::Integer(42));
        let e = parse(
            &list(vec![sym("if"), Syntax::Number(1), Syntax::Number(2)]),
            &env,
        )
        .unwrap();
        match e {
            Expr::Apply(rator, rands) => {
                assert!(matches!(*rator, Expr::Var(ref n) if n == "if"));
                assert_eq!(rands.len(), 2);
            }
            other => panic!("expected Apply, got {:?}", other),
        }
    }

    #[test]
    fn let_binding_shadows_reserved_word_inside_body() {
        // (let ((if 1)) (+ if 2)) must parse inner `if` as a variable.
        let e = p(list(vec![
            sym("let"),
            list(vec![list(vec![sym("if"), Syntax::Number(1)])]),
            list(vec![sym("+"), sym("if"), Syntax::Number(2)]),
        ]));
        match e {
            Expr::Let { body, .. } => match *body {
                Expr::Prim2(PrimTag::Plus, a, _) => {
                    assert!(matches!(*a, Expr::Var(ref n) if n == "if"));
                }
                other => panic!("expected Prim2(Plus, ..), got {:?}", other),
            },
            other => panic!("expected Let, got {:?}", other),
        }
    }

    #[test]
    fn letrec_binds_all_names_before_parsing_rhs() {
        let e = p(list(vec![
            sym("letrec"),
            list(vec![
                list(vec![
                    sym("even?"),
                    list(vec![sym("lambda"), list(vec![sym("n")]), list(vec![sym("odd?"), sym("n")])]),
                ]),
                list(vec![
                    sym("odd?"),
                    list(vec![sym("lambda"), list(vec![sym("n")]), list(vec![sym("even?"), sym("n")])]),
                ]),
            ]),
            sym("even?"),
        ]));
        assert!(matches!(e, Expr::Letrec { .. }));
    }

    #[test]
    fn empty_list_quotes_to_empty_syntax_list() {
        let e = p(list(vec![]));
        assert!(matches!(e, Expr::Quote(Syntax::List(ref v)) if v.is_empty()));
    }

    #[test]
    fn define_function_shorthand_desugars_to_lambda() {
        let e = p(list(vec![
            sym("define"),
            list(vec![sym("f"), sym("n")]),
            sym("n"),
        ]));
        match e {
            Expr::Define(name, body) => {
                assert_eq!(name, "f");
                assert!(matches!(*body, Expr::Lambda { .. }));
            }
            other => panic!("expected Define, got {:?}", other),
        }
    }

    #[test]
    fn comparison_requires_at_least_two_args() {
        let env = Environment::new();
        let err = parse(&list(vec![sym("<"), Syntax::Number(1)]), &env);
        assert!(err.is_err());
    }
}
