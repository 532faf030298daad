//! Runtime values and their operator semantics.

pub mod date;
mod ops;

pub use chrono::Duration;
pub use date::{DateComponent, DateValue};

use num_traits::ToPrimitive;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nothing present. Stringifies as the empty string.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(DateValue),
    /// A span of whole days.
    Duration(Duration),
    List(Vec<Value>),
}

/// Errors raised by operators and by native functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("unsupported operand types for {op}: '{left}' and '{right}'")]
    UnsupportedOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("bad operand type for unary {op}: '{operand}'")]
    BadOperand {
        op: &'static str,
        operand: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
    #[error("date out of range")]
    DateOutOfRange,
    #[error("expected {expected}, got '{found}'")]
    Expected {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("expected {expected} argument(s), got {found}")]
    ArgumentCount { expected: String, found: usize },
    #[error("database error: {0}")]
    Database(String),
    #[error("{0}")]
    Invalid(String),
}

impl Value {
    /// Name of the runtime type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Date(_) => "date",
            Value::Duration(_) => "duration",
            Value::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(val) => *val,
            Value::Int(val) => *val != 0,
            Value::Float(val) => *val != 0.0,
            Value::Str(val) => !val.is_empty(),
            Value::Date(_) => true,
            Value::Duration(val) => !val.is_zero(),
            Value::List(val) => !val.is_empty(),
        }
    }

    /// Converts to an integer, truncating toward zero. Numeric strings are accepted.
    pub fn to_int(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int(val) => Ok(*val),
            Value::Bool(val) => Ok(*val as i64),
            Value::Float(val) => float_to_int(*val),
            Value::Str(val) => match val.trim().parse::<i64>() {
                Ok(val) => Ok(val),
                Err(_) => float_to_int(parse_float(val)?),
            },
            other => Err(ValueError::Expected {
                expected: "number",
                found: other.type_name(),
            }),
        }
    }

    /// Converts to a float. Numeric strings are accepted.
    pub fn to_float(&self) -> Result<f64, ValueError> {
        match self {
            Value::Int(val) => Ok(*val as f64),
            Value::Bool(val) => Ok(*val as i64 as f64),
            Value::Float(val) => Ok(*val),
            Value::Str(val) => parse_float(val),
            other => Err(ValueError::Expected {
                expected: "number",
                found: other.type_name(),
            }),
        }
    }

    /// Returns the date of a [`Value::Date`].
    pub fn to_date(&self) -> Result<&DateValue, ValueError> {
        match self {
            Value::Date(date) => Ok(date),
            other => Err(ValueError::Expected {
                expected: "date",
                found: other.type_name(),
            }),
        }
    }
}

/// Longest string, in bytes, that an operator or a native function may build.
pub const MAX_STR_LEN: usize = 1 << 26;

/// Fails with [`ValueError::Overflow`] when a result of `len` bytes would exceed [`MAX_STR_LEN`].
pub fn check_str_len(len: usize) -> Result<usize, ValueError> {
    if len > MAX_STR_LEN {
        Err(ValueError::Overflow)
    } else {
        Ok(len)
    }
}

/// Truncates `val` toward zero, failing for NaN, infinities and out of range values.
pub fn float_to_int(val: f64) -> Result<i64, ValueError> {
    val.trunc().to_i64().ok_or(ValueError::Overflow)
}

fn parse_float(text: &str) -> Result<f64, ValueError> {
    text.trim()
        .parse()
        .map_err(|_| ValueError::InvalidNumber(text.to_string()))
}

/// Shortest representation that reads back as the same float. Exponents below `-4` or from
/// `16` on switch to scientific notation, written `1e+16` and `1.5e-05`.
fn fmt_float(f: &mut fmt::Formatter<'_>, val: f64) -> fmt::Result {
    if val.is_nan() {
        return f.write_str("nan");
    }
    if val.is_infinite() {
        return f.write_str(if val < 0.0 { "-inf" } else { "inf" });
    }

    let scientific = format!("{:e}", val);
    let (mantissa, exponent) = scientific.split_once('e').ok_or(fmt::Error)?;
    let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;
    if (-4..16).contains(&exponent) {
        // integral floats keep a trailing `.0` so they still read as floats
        if val.fract() == 0.0 {
            write!(f, "{:.1}", val)
        } else {
            write!(f, "{}", val)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Int(val) => write!(f, "{}", val),
            Value::Float(val) => fmt_float(f, *val),
            Value::Str(val) => f.write_str(val),
            Value::Date(val) => write!(f, "{}", val),
            Value::Duration(val) => match val.num_days() {
                1 | -1 => write!(f, "{} day", val.num_days()),
                days => write!(f, "{} days", days),
            },
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Str(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Str(val)
    }
}

impl From<DateValue> for Value {
    fn from(val: DateValue) -> Self {
        Value::Date(val)
    }
}

impl From<Duration> for Value {
    fn from(val: Duration) -> Self {
        Value::Duration(val)
    }
}

impl From<Vec<Value>> for Value {
    fn from(val: Vec<Value>) -> Self {
        Value::List(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Float(-0.0).to_string(), "-0.0");
        assert_eq!(Value::Float(123456.75).to_string(), "123456.75");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Value::Float(1e16).to_string(), "1e+16");
        assert_eq!(Value::Float(-1.5e300).to_string(), "-1.5e+300");
        assert_eq!(Value::Float(0.00001).to_string(), "1e-05");
        assert_eq!(Value::Float(1.25e-7).to_string(), "1.25e-07");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Float(f64::NAN).to_string(), "nan");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Value::Duration(Duration::days(3)).to_string(), "3 days");
        assert_eq!(Value::Duration(Duration::days(1)).to_string(), "1 day");
        assert_eq!(
            Value::List(vec![Value::Int(1), "a".into(), Value::Null]).to_string(),
            "[1, a, ]"
        );
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(Value::Date(DateValue::new(date)).to_string(), "05.03.2026");
    }

    #[test]
    fn test_truthiness() {
        for falsy in [
            Value::Null,
            Value::Bool(false),
            Value::Int(0),
            Value::Float(0.0),
            Value::from(""),
            Value::Duration(Duration::zero()),
            Value::List(vec![]),
        ] {
            assert!(!falsy.is_truthy(), "{:?} should be falsy", falsy);
        }
        for truthy in [Value::Int(-1), Value::from("0"), Value::List(vec![Value::Null])] {
            assert!(truthy.is_truthy(), "{:?} should be truthy", truthy);
        }
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::Float(3.9).to_int(), Ok(3));
        assert_eq!(Value::Float(-3.9).to_int(), Ok(-3));
        assert_eq!(Value::from(" 12 ").to_int(), Ok(12));
        assert_eq!(Value::from("3.7").to_int(), Ok(3));
        assert_eq!(Value::Bool(true).to_int(), Ok(1));
        assert_eq!(Value::Float(f64::NAN).to_int(), Err(ValueError::Overflow));
        assert_eq!(
            Value::from("abc").to_int(),
            Err(ValueError::InvalidNumber("abc".to_string()))
        );
        assert_eq!(
            Value::Null.to_float(),
            Err(ValueError::Expected {
                expected: "number",
                found: "null"
            })
        );
        assert_eq!(Value::from("2.5").to_float(), Ok(2.5));
    }
}
