//! Logic operation: not
//!
//! `and`/`or` are special forms (`AndVar`/`OrVar` in `expr.rs`), not
//! primitives: they must short-circuit before evaluating every argument,
//! which a plain function over already-evaluated `Value`s cannot do.

use crate::error::RuntimeError;
use crate::value::Value;

/// Negates truthiness: a `Boolean(false)` input becomes `#t`; every other
/// (truthy) input becomes `#f`, matching the source's behaviour of never
/// erroring on a non-boolean argument.
pub fn not(v: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(!v.is_truthy()))
}
