//! Arithmetic operations: +, -, *, /, modulo, expt
//!
//! Two numeric variants flow through here: `Integer` and `Rational`. Mixed
//! arithmetic promotes an Integer `n` to the rational `n/1` for the
//! duration of the operation; results are normalized through
//! `Value::rational`, which reduces by GCD and demotes back to `Integer`
//! whenever the denominator comes out to 1.

use crate::error::RuntimeError;
use crate::value::Value;

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

/// Builds a reduced rational from `i128` intermediates, surfacing
/// `IntegerOverflow` if the reduced numerator/denominator no longer fit in
/// `i64`. Cross-multiplying two `i64`s can exceed `i64` range, which is why
/// every binary kernel below works in `i128` before handing off to
/// `Value::rational`.
fn rational_checked(num: i128, den: i128, function: &str) -> Result<Value, RuntimeError> {
    let g = gcd128(num.unsigned_abs(), den.unsigned_abs()).max(1) as i128;
    let (mut num, mut den) = (num / g, den / g);
    if den < 0 {
        num = -num;
        den = -den;
    }
    let overflow = || RuntimeError::IntegerOverflow {
        function: function.to_string(),
    };
    if den == 1 {
        Ok(Value::Integer(i64::try_from(num).map_err(|_| overflow())?))
    } else {
        Ok(Value::rational(
            i64::try_from(num).map_err(|_| overflow())?,
            i64::try_from(den).map_err(|_| overflow())?,
        ))
    }
}

fn gcd128(a: u128, b: u128) -> u128 {
    if b == 0 {
        a
    } else {
        gcd128(b, a % b)
    }
}

pub fn add2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        return x
            .checked_add(*y)
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::IntegerOverflow {
                function: "+".to_string(),
            });
    }
    let (an, ad) = num_den(a, "+")?;
    let (bn, bd) = num_den(b, "+")?;
    let (an, ad, bn, bd) = (an as i128, ad as i128, bn as i128, bd as i128);
    rational_checked(an * bd + bn * ad, ad * bd, "+")
}

pub fn sub2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        return x
            .checked_sub(*y)
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::IntegerOverflow {
                function: "-".to_string(),
            });
    }
    let (an, ad) = num_den(a, "-")?;
    let (bn, bd) = num_den(b, "-")?;
    let (an, ad, bn, bd) = (an as i128, ad as i128, bn as i128, bd as i128);
    rational_checked(an * bd - bn * ad, ad * bd, "-")
}

pub fn mul2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        return x
            .checked_mul(*y)
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::IntegerOverflow {
                function: "*".to_string(),
            });
    }
    let (an, ad) = num_den(a, "*")?;
    let (bn, bd) = num_den(b, "*")?;
    let (an, ad, bn, bd) = (an as i128, ad as i128, bn as i128, bd as i128);
    rational_checked(an * bn, ad * bd, "*")
}

fn is_zero(v: &Value) -> bool {
    matches!(v, Value::Integer(0))
}

pub fn div2(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if is_zero(b) {
        return Err(RuntimeError::DivisionByZero);
    }
    let (an, ad) = num_den(a, "/")?;
    let (bn, bd) = num_den(b, "/")?;
    let (an, ad, bn, bd) = (an as i128, ad as i128, bn as i128, bd as i128);
    // a/b == (an/ad) / (bn/bd) == (an*bd) / (ad*bn)
    rational_checked(an * bd, ad * bn, "/")
}

pub fn negate(a: &Value) -> Result<Value, RuntimeError> {
    sub2(&Value::Integer(0), a)
}

pub fn reciprocal(a: &Value) -> Result<Value, RuntimeError> {
    div2(&Value::Integer(1), a)
}

/// Folds `+` left-to-right over any arity the parser hands the evaluator
/// (0, 1, or 3+; exactly-2 goes through `add2` directly as a binary node).
pub fn add_var(args: &[Value]) -> Result<Value, RuntimeError> {
    args.iter()
        .try_fold(Value::Integer(0), |acc, v| add2(&acc, v))
}

pub fn mul_var(args: &[Value]) -> Result<Value, RuntimeError> {
    args.iter()
        .try_fold(Value::Integer(1), |acc, v| mul2(&acc, v))
}

/// `-` with zero arguments has no sensible fold seed and is a genuine
/// arity error; one argument negates (see `DESIGN.md` for why this departs
/// from the source's literal fold-identity behaviour); more fold
/// left-to-right starting from the first argument.
pub fn sub_var(args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [] => Err(RuntimeError::wrong_arity("-", "at least 1", 0)),
        [x] => negate(x),
        [first, rest @ ..] => rest.iter().try_fold(first.clone(), |acc, v| sub2(&acc, v)),
    }
}

pub fn div_var(args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [] => Err(RuntimeError::wrong_arity("/", "at least 1", 0)),
        [x] => reciprocal(x),
        [first, rest @ ..] => rest.iter().try_fold(first.clone(), |acc, v| div2(&acc, v)),
    }
}

pub fn modulo(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let x = match a {
        Value::Integer(n) => *n,
        other => {
            return Err(RuntimeError::wrong_type(
                "modulo",
                "an integer",
                other.type_name(),
            ))
        }
    };
    let y = match b {
        Value::Integer(n) => *n,
        other => {
            return Err(RuntimeError::wrong_type(
                "modulo",
                "an integer",
                other.type_name(),
            ))
        }
    };
    if y == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(Value::Integer(x % y))
}

pub fn expt(base: &Value, exponent: &Value) -> Result<Value, RuntimeError> {
    let base = match base {
        Value::Integer(n) => *n,
        other => {
            return Err(RuntimeError::wrong_type(
                "expt",
                "an integer base",
                other.type_name(),
            ))
        }
    };
    let exp = match exponent {
        Value::Integer(n) if *n >= 0 => *n,
        Value::Integer(_) => {
            return Err(RuntimeError::Misc(
                "expt: exponent must be non-negative".to_string(),
            ))
        }
        other => {
            return Err(RuntimeError::wrong_type(
                "expt",
                "a non-negative integer exponent",
                other.type_name(),
            ))
        }
    };
    if base == 0 && exp == 0 {
        return Err(RuntimeError::Misc("expt: 0^0 is undefined".to_string()));
    }
    let mut result: i64 = 1;
    for _ in 0..exp {
        result = result.checked_mul(base).ok_or_else(|| RuntimeError::IntegerOverflow {
            function: "expt".to_string(),
        })?;
    }
    Ok(Value::Integer(result))
}
