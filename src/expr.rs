// ABOUTME: Typed AST nodes consumed by the evaluator

use crate::syntax::Syntax;
use crate::tables::PrimTag;
use std::rc::Rc;

/// A single tagged sum over node kinds, interpreted by one big match in
/// `eval.rs`. This replaces the source's per-node virtual `eval` dispatch
/// (and the unchecked downcasts that came with it) with ordinary pattern
/// matching, per the design notes: one interpreter function, not thirty
/// `impl Eval for X` blocks.
///
/// Primitive operators collapse into three arity-shaped carriers,
/// `Prim1`/`Prim2`/`PrimVar`, rather than one node type per operator
/// (`Plus`, `Minus`, `Lt`, ...); the `PrimTag` distinguishes which kernel in
/// `eval.rs`/`builtins/` to run. This is the "centralise numeric promotion
/// in one helper" idea taken one step further: the dispatch itself is
/// centralised too.
#[derive(Debug, Clone)]
pub enum Expr {
    Fixnum(i64),
    RationalNum(i64, i64),
    StringExpr(String),
    True,
    False,
    MakeVoid,
    Exit,
    Var(String),
    Quote(Syntax),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Each clause is the parsed sub-forms of one `cond` clause; the first
    /// is the test (or the literal `else` symbol, detected at eval time).
    Cond(Vec<Vec<Expr>>),
    AndVar(Vec<Expr>),
    OrVar(Vec<Expr>),
    Begin(Vec<Expr>),
    Lambda { params: Vec<String>, body: Rc<Expr> },
    Apply(Box<Expr>, Vec<Expr>),
    Define(String, Box<Expr>),
    Let { bindings: Vec<(String, Expr)>, body: Box<Expr> },
    Letrec { bindings: Vec<(String, Expr)>, body: Box<Expr> },
    Set(String, Box<Expr>),
    Prim1(PrimTag, Box<Expr>),
    Prim2(PrimTag, Box<Expr>, Box<Expr>),
    PrimVar(PrimTag, Vec<Expr>),
}
