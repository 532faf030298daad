//! Operator semantics.
//!
//! Integers stay integers under `+ - * %` and widen to floats as soon as a float is involved.
//! `/` always produces a float. Booleans take part in arithmetic as `0` and `1`.

use crate::{check_str_len, Duration, Value, ValueError};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn to_f64(self) -> f64 {
        match self {
            Num::Int(val) => val as f64,
            Num::Float(val) => val,
        }
    }
}

impl Value {
    fn as_num(&self) -> Option<Num> {
        match self {
            Value::Int(val) => Some(Num::Int(*val)),
            Value::Bool(val) => Some(Num::Int(*val as i64)),
            Value::Float(val) => Some(Num::Float(*val)),
            _ => None,
        }
    }

    pub fn try_add(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => {
                check_str_len(a.len().saturating_add(b.len()))?;
                Ok(Value::Str(format!("{}{}", a, b)))
            }
            (Value::List(a), Value::List(b)) => Ok(Value::List(a.iter().chain(b).cloned().collect())),
            (Value::Date(date), Value::Duration(dur)) | (Value::Duration(dur), Value::Date(date)) => {
                let shifted = date
                    .date
                    .checked_add_signed(*dur)
                    .ok_or(ValueError::DateOutOfRange)?;
                Ok(Value::Date(date.with_date(shifted)))
            }
            (Value::Duration(a), Value::Duration(b)) => days(a.num_days().checked_add(b.num_days())),
            _ => arith("+", self, rhs, |a, b| a.checked_add(b).ok_or(ValueError::Overflow), |a, b| {
                Ok(a + b)
            }),
        }
    }

    pub fn try_sub(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Date(date), Value::Duration(dur)) => {
                let shifted = date
                    .date
                    .checked_sub_signed(*dur)
                    .ok_or(ValueError::DateOutOfRange)?;
                Ok(Value::Date(date.with_date(shifted)))
            }
            (Value::Date(a), Value::Date(b)) => Ok(Value::Duration(a.date.signed_duration_since(b.date))),
            (Value::Duration(a), Value::Duration(b)) => days(a.num_days().checked_sub(b.num_days())),
            _ => arith("-", self, rhs, |a, b| a.checked_sub(b).ok_or(ValueError::Overflow), |a, b| {
                Ok(a - b)
            }),
        }
    }

    pub fn try_mul(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Str(text), Value::Int(n)) | (Value::Int(n), Value::Str(text)) => {
                let n = usize::try_from(*n).unwrap_or(0);
                let len = text.len().checked_mul(n).ok_or(ValueError::Overflow)?;
                check_str_len(len)?;
                Ok(Value::Str(text.repeat(n)))
            }
            (Value::Duration(dur), Value::Int(n)) | (Value::Int(n), Value::Duration(dur)) => {
                days(dur.num_days().checked_mul(*n))
            }
            _ => arith("*", self, rhs, |a, b| a.checked_mul(b).ok_or(ValueError::Overflow), |a, b| {
                Ok(a * b)
            }),
        }
    }

    /// True division: the result is a float even for two integers.
    pub fn try_div(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self.as_num(), rhs.as_num()) {
            (Some(a), Some(b)) => {
                let b = b.to_f64();
                if b == 0.0 {
                    return Err(ValueError::DivisionByZero);
                }
                Ok(Value::Float(a.to_f64() / b))
            }
            _ => Err(unsupported("/", self, rhs)),
        }
    }

    /// Floor modulo: a non-zero result has the sign of `rhs`.
    pub fn try_rem(&self, rhs: &Value) -> Result<Value, ValueError> {
        arith(
            "%",
            self,
            rhs,
            |a, b| {
                if b == 0 {
                    return Err(ValueError::DivisionByZero);
                }
                // only `i64::MIN % -1` overflows, and its remainder is 0
                let r = a.checked_rem(b).unwrap_or(0);
                Ok(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
            },
            |a, b| {
                if b == 0.0 {
                    return Err(ValueError::DivisionByZero);
                }
                let r = a % b;
                Ok(if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r })
            },
        )
    }

    pub fn try_neg(&self) -> Result<Value, ValueError> {
        match self {
            Value::Int(val) => val.checked_neg().map(Value::Int).ok_or(ValueError::Overflow),
            Value::Bool(val) => Ok(Value::Int(-(*val as i64))),
            Value::Float(val) => Ok(Value::Float(-val)),
            Value::Duration(val) => Ok(Value::Duration(-*val)),
            other => Err(ValueError::BadOperand {
                op: "-",
                operand: other.type_name(),
            }),
        }
    }

    /// Equality as seen by `==`. Numbers compare by value across `int`, `float` and `bool`;
    /// values of unrelated types are never equal.
    pub fn equals(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a.date == b.date,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            _ => match (self.as_num(), rhs.as_num()) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
                (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
                _ => false,
            },
        }
    }

    /// Orders two values for `<`, `>`, `<=` and `>=` (`op` names the operator in errors).
    /// Returns `Ok(None)` for unordered floats (NaN).
    pub fn try_cmp(&self, rhs: &Value, op: &'static str) -> Result<Option<Ordering>, ValueError> {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            (Value::Date(a), Value::Date(b)) => Ok(Some(a.date.cmp(&b.date))),
            (Value::Duration(a), Value::Duration(b)) => Ok(Some(a.cmp(b))),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    if !x.equals(y) {
                        return x.try_cmp(y, op);
                    }
                }
                Ok(Some(a.len().cmp(&b.len())))
            }
            _ => match (self.as_num(), rhs.as_num()) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => Ok(Some(a.cmp(&b))),
                (Some(a), Some(b)) => Ok(a.to_f64().partial_cmp(&b.to_f64())),
                _ => Err(unsupported(op, self, rhs)),
            },
        }
    }
}

fn unsupported(op: &'static str, lhs: &Value, rhs: &Value) -> ValueError {
    ValueError::UnsupportedOperands {
        op,
        left: lhs.type_name(),
        right: rhs.type_name(),
    }
}

fn days(days: Option<i64>) -> Result<Value, ValueError> {
    days.and_then(Duration::try_days)
        .map(Value::Duration)
        .ok_or(ValueError::Overflow)
}

fn arith(
    op: &'static str,
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Result<i64, ValueError>,
    float_op: fn(f64, f64) -> Result<f64, ValueError>,
) -> Result<Value, ValueError> {
    match (lhs.as_num(), rhs.as_num()) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => int_op(a, b).map(Value::Int),
        (Some(a), Some(b)) => float_op(a.to_f64(), b.to_f64()).map(Value::Float),
        _ => Err(unsupported(op, lhs, rhs)),
    }
}
