//! List/pair operations: cons, car, cdr, set-car!, set-cdr!, list, list?
//!
//! `cons` allocates a mutable pair; `car`/`cdr` fail on non-pairs;
//! `set-car!`/`set-cdr!` mutate in place, visible through every alias of
//! that pair.

use crate::error::RuntimeError;
use crate::value::Value;

pub fn cons(a: Value, b: Value) -> Value {
    Value::cons(a, b)
}

fn require_pair<'a>(v: &'a Value, function: &str) -> Result<&'a crate::value::PairCell, RuntimeError> {
    match v {
        Value::Pair(cell) => Ok(cell),
        other => Err(RuntimeError::wrong_type(function, "a pair", other.type_name())),
    }
}

pub fn car(v: &Value) -> Result<Value, RuntimeError> {
    Ok(require_pair(v, "car")?.borrow().0.clone())
}

pub fn cdr(v: &Value) -> Result<Value, RuntimeError> {
    Ok(require_pair(v, "cdr")?.borrow().1.clone())
}

pub fn set_car(pair: &Value, value: Value) -> Result<Value, RuntimeError> {
    require_pair(pair, "set-car!")?.borrow_mut().0 = value;
    Ok(Value::Void)
}

pub fn set_cdr(pair: &Value, value: Value) -> Result<Value, RuntimeError> {
    require_pair(pair, "set-cdr!")?.borrow_mut().1 = value;
    Ok(Value::Void)
}

/// Builds a right-associated pair chain terminated by `Null`, the same
/// shape `quote` produces for a literal list.
pub fn list(args: Vec<Value>) -> Value {
    args.into_iter().rev().fold(Value::Null, |tail, head| Value::cons(head, tail))
}

pub fn is_list(v: &Value) -> Value {
    Value::Boolean(v.is_proper_list())
}
