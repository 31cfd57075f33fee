// ABOUTME: Fixed name -> construct tag tables consulted by the parser

use std::collections::HashMap;
use std::sync::OnceLock;

/// Tags for primitive operators. The parser dispatches arity-policy by tag;
/// the evaluator dispatches per-node semantics by the `Expr` variant built
/// from it (see `expr.rs`, `parser.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimTag {
    Plus,
    Minus,
    Mul,
    Div,
    Modulo,
    Expt,
    Lt,
    Le,
    NumEq,
    Ge,
    Gt,
    Cons,
    Car,
    Cdr,
    SetCar,
    SetCdr,
    List,
    IsList,
    IsBoolean,
    IsInteger,
    IsNull,
    IsPair,
    IsProcedure,
    IsSymbol,
    IsString,
    IsEq,
    Display,
    Not,
    MakeVoid,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedTag {
    If,
    Lambda,
    Quote,
    Define,
    Begin,
    Cond,
    Let,
    Letrec,
    Set,
    And,
    Or,
}

fn primitives_table() -> &'static HashMap<&'static str, PrimTag> {
    static TABLE: OnceLock<HashMap<&'static str, PrimTag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use PrimTag::*;
        HashMap::from([
            ("+", Plus),
            ("-", Minus),
            ("*", Mul),
            ("/", Div),
            ("modulo", Modulo),
            ("expt", Expt),
            ("<", Lt),
            ("<=", Le),
            ("=", NumEq),
            (">=", Ge),
            (">", Gt),
            ("cons", Cons),
            ("car", Car),
            ("cdr", Cdr),
            ("set-car!", SetCar),
            ("set-cdr!", SetCdr),
            ("list", List),
            ("list?", IsList),
            ("boolean?", IsBoolean),
            ("integer?", IsInteger),
            ("null?", IsNull),
            ("pair?", IsPair),
            ("procedure?", IsProcedure),
            ("symbol?", IsSymbol),
            ("string?", IsString),
            ("eq?", IsEq),
            ("display", Display),
            ("not", Not),
            ("void", MakeVoid),
            ("exit", Exit),
        ])
    })
}

fn reserved_words_table() -> &'static HashMap<&'static str, ReservedTag> {
    static TABLE: OnceLock<HashMap<&'static str, ReservedTag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use ReservedTag::*;
        HashMap::from([
            ("if", If),
            ("lambda", Lambda),
            ("quote", Quote),
            ("define", Define),
            ("begin", Begin),
            ("cond", Cond),
            ("let", Let),
            ("letrec", Letrec),
            ("set!", Set),
            ("and", And),
            ("or", Or),
        ])
    })
}

pub fn lookup_primitive(name: &str) -> Option<PrimTag> {
    primitives_table().get(name).copied()
}

pub fn lookup_reserved(name: &str) -> Option<ReservedTag> {
    reserved_words_table().get(name).copied()
}

/// Recovers a primitive's surface name from its tag, for error messages
/// when a materialized (first-class) primitive is misapplied.
pub fn primitive_name(tag: PrimTag) -> &'static str {
    static REVERSE: OnceLock<HashMap<PrimTag, &'static str>> = OnceLock::new();
    REVERSE
        .get_or_init(|| primitives_table().iter().map(|(&name, &t)| (t, name)).collect())
        .get(&tag)
        .copied()
        .unwrap_or("primitive")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_lookup() {
        assert_eq!(lookup_primitive("+"), Some(PrimTag::Plus));
        assert_eq!(lookup_primitive("set-car!"), Some(PrimTag::SetCar));
        assert_eq!(lookup_primitive("frobnicate"), None);
    }

    #[test]
    fn reserved_lookup() {
        assert_eq!(lookup_reserved("letrec"), Some(ReservedTag::Letrec));
        assert_eq!(lookup_reserved("not-a-keyword"), None);
    }

    #[test]
    fn primitives_and_reserved_words_are_disjoint() {
        for name in [
            "+", "-", "*", "/", "modulo", "expt", "<", "<=", "=", ">=", ">", "cons", "car", "cdr",
            "set-car!", "set-cdr!", "list", "list?", "boolean?", "integer?", "null?", "pair?",
            "procedure?", "symbol?", "string?", "eq?", "display", "not", "void", "exit",
        ] {
            assert!(lookup_reserved(name).is_none(), "{name} in both tables");
        }
    }
}
