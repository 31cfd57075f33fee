//! Comparison operations: =, <, >, <=, >=
//!
//! All accept a mix of `Integer`/`Rational`. A rational `a/b` and an
//! integer `n` (or two rationals) are compared by cross-multiplying;
//! because every stored denominator is positive, the sign of the
//! cross-product alone gives the order.

use crate::error::RuntimeError;
use crate::value::Value;
use std::cmp::Ordering;

fn num_den(v: &Value, function: &str) -> Result<(i64, i64), RuntimeError> {
    match v {
        Value::Integer(n) => Ok((*n, 1)),
        Value::Rational(n, d) => Ok((*n, *d)),
        other => Err(RuntimeError::wrong_type(
            function,
            "a number",
            other.type_name(),
        )),
    }
}

fn compare(a: &Value, b: &Value, function: &str) -> Result<Ordering, RuntimeError> {
    let (an, ad) = num_den(a, function)?;
    let (bn, bd) = num_den(b, function)?;
    let lhs = an as i128 * bd as i128;
    let rhs = bn as i128 * ad as i128;
    Ok(lhs.cmp(&rhs))
}

pub fn lt2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(compare(a, b, "<")? == Ordering::Less))
}

pub fn le2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(compare(a, b, "<=")? != Ordering::Greater))
}

pub fn num_eq2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(compare(a, b, "=")? == Ordering::Equal))
}

pub fn ge2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(compare(a, b, ">=")? != Ordering::Less))
}

pub fn gt2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(compare(a, b, ">")? == Ordering::Greater))
}

/// Folds a variadic comparison across every adjacent pair: `(< 1 2 3)` is
/// true iff `1<2` and `2<3`. Only reached with 3+ arguments; the parser
/// emits a binary node for exactly 2 and a parse-time error for fewer than 2.
fn fold_chain(
    args: &[Value],
    op: fn(&Value, &Value) -> Result<Value, RuntimeError>,
) -> Result<Value, RuntimeError> {
    for pair in args.windows(2) {
        if !matches!(op(&pair[0], &pair[1])?, Value::Boolean(true)) {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

pub fn lt_var(args: &[Value]) -> Result<Value, RuntimeError> {
    fold_chain(args, lt2)
}

pub fn le_var(args: &[Value]) -> Result<Value, RuntimeError> {
    fold_chain(args, le2)
}

pub fn num_eq_var(args: &[Value]) -> Result<Value, RuntimeError> {
    fold_chain(args, num_eq2)
}

pub fn ge_var(args: &[Value]) -> Result<Value, RuntimeError> {
    fold_chain(args, ge2)
}

pub fn gt_var(args: &[Value]) -> Result<Value, RuntimeError> {
    fold_chain(args, gt2)
}
