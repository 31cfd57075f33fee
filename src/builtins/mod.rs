//! Primitive kernels, grouped the way the evaluator's `Prim1`/`Prim2`/
//! `PrimVar` dispatch expects to call them: arithmetic, comparison, list/pair
//! operations, the one remaining logic primitive (`not`; `and`/`or` are
//! special forms), and type predicates. Nothing here is registered into an
//! `Environment` at startup; a primitive only becomes a first-class
//! `Value::Procedure` when it is looked up as a bare variable and found
//! absent (see `Var` handling in `eval.rs`).

pub mod arithmetic;
pub mod comparison;
pub mod lists;
pub mod logic;
pub mod types;
