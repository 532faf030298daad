use super::int_or;
use placeholder_eval::{Arity, FunctionRegistry};
use placeholder_value::{check_str_len, float_to_int, Value, ValueError};
use rand::Rng;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("ROUND", Arity::Range(1, 2), round);
    registry.register("FLOOR", Arity::Exact(1), floor);
    registry.register("CEIL", Arity::Exact(1), ceil);
    registry.register("ABS", Arity::Exact(1), abs);
    registry.register("MIN", Arity::AtLeast(1), min);
    registry.register("MAX", Arity::AtLeast(1), max);
    registry.register("SUM", Arity::AtLeast(0), sum);
    registry.register("AVG", Arity::AtLeast(0), avg);
    registry.register("POW", Arity::Exact(2), pow);
    registry.register("SQRT", Arity::Exact(1), sqrt);
    registry.register("INT", Arity::Exact(1), int);
    registry.register("FLOAT", Arity::Exact(1), float);
    registry.register("FORMAT_NUM", Arity::Range(1, 2), format_num);
    registry.register("RANDOM_INT", Arity::Exact(2), random_int);
}

fn domain_error() -> ValueError {
    ValueError::Invalid("math domain error".to_string())
}

/// Past this many decimals in either direction, rounding no longer depends on the exact count.
const MAX_ROUND_DECIMALS: i64 = 400;

/// Rounds half to even. Negative `decimals` round to tens, hundreds and so on.
pub fn round(args: &[Value]) -> Result<Value, ValueError> {
    let n = args[0].to_float()?;
    let decimals = int_or(args, 1, 0)?.clamp(-MAX_ROUND_DECIMALS, MAX_ROUND_DECIMALS) as i32;
    if !n.is_finite() {
        return Ok(Value::Float(n));
    }

    let factor = 10f64.powi(decimals.abs());
    let rounded = if decimals >= 0 {
        let scaled = n * factor;
        // more decimals than a float can hold
        if scaled.is_finite() {
            scaled.round_ties_even() / factor
        } else {
            n
        }
    } else if factor.is_finite() {
        (n / factor).round_ties_even() * factor
    } else {
        0f64.copysign(n)
    };
    Ok(Value::Float(rounded))
}

pub fn floor(args: &[Value]) -> Result<Value, ValueError> {
    Ok(Value::Int(float_to_int(args[0].to_float()?.floor())?))
}

pub fn ceil(args: &[Value]) -> Result<Value, ValueError> {
    Ok(Value::Int(float_to_int(args[0].to_float()?.ceil())?))
}

pub fn abs(args: &[Value]) -> Result<Value, ValueError> {
    match &args[0] {
        Value::Int(val) => val.checked_abs().map(Value::Int).ok_or(ValueError::Overflow),
        Value::Bool(val) => Ok(Value::Int(*val as i64)),
        Value::Float(val) => Ok(Value::Float(val.abs())),
        Value::Duration(val) => Ok(Value::Duration(val.abs())),
        other => Err(ValueError::Expected {
            expected: "number",
            found: other.type_name(),
        }),
    }
}

fn extreme(args: &[Value], op: &'static str, keep: std::cmp::Ordering) -> Result<Value, ValueError> {
    let mut best = &args[0];
    for candidate in &args[1..] {
        if candidate.try_cmp(best, op)? == Some(keep) {
            best = candidate;
        }
    }
    Ok(best.clone())
}

pub fn min(args: &[Value]) -> Result<Value, ValueError> {
    extreme(args, "<", std::cmp::Ordering::Less)
}

pub fn max(args: &[Value]) -> Result<Value, ValueError> {
    extreme(args, ">", std::cmp::Ordering::Greater)
}

pub fn sum(args: &[Value]) -> Result<Value, ValueError> {
    args.iter()
        .try_fold(Value::Int(0), |total, value| total.try_add(value))
}

pub fn avg(args: &[Value]) -> Result<Value, ValueError> {
    if args.is_empty() {
        return Ok(Value::Int(0));
    }
    sum(args)?.try_div(&Value::Int(args.len() as i64))
}

pub fn pow(args: &[Value]) -> Result<Value, ValueError> {
    let base = args[0].to_float()?;
    let exp = args[1].to_float()?;
    if base == 0.0 && exp < 0.0 {
        return Err(ValueError::DivisionByZero);
    }
    let result = base.powf(exp);
    if result.is_nan() && !base.is_nan() && !exp.is_nan() {
        return Err(domain_error());
    }
    if result.is_infinite() && base.is_finite() && exp.is_finite() {
        return Err(ValueError::Overflow);
    }
    Ok(Value::Float(result))
}

pub fn sqrt(args: &[Value]) -> Result<Value, ValueError> {
    let n = args[0].to_float()?;
    if n < 0.0 {
        return Err(domain_error());
    }
    Ok(Value::Float(n.sqrt()))
}

/// Truncates toward zero.
pub fn int(args: &[Value]) -> Result<Value, ValueError> {
    match &args[0] {
        Value::Int(val) => Ok(Value::Int(*val)),
        other => Ok(Value::Int(float_to_int(other.to_float()?)?)),
    }
}

pub fn float(args: &[Value]) -> Result<Value, ValueError> {
    Ok(Value::Float(args[0].to_float()?))
}

/// Enough fraction digits to print any `f64` exactly. Beyond this every digit is `0`.
const EXACT_FRACTION_DIGITS: usize = 1100;

/// `FORMAT_NUM(1234567.891, 2)` is `1,234,567.89`.
pub fn format_num(args: &[Value]) -> Result<Value, ValueError> {
    let n = args[0].to_float()?;
    let decimals = int_or(args, 1, 2)?;
    let decimals = usize::try_from(decimals)
        .map_err(|_| ValueError::Invalid("decimals must not be negative".to_string()))?;
    check_str_len(decimals)?;

    let formatted = format!("{:.*}", decimals.min(EXACT_FRACTION_DIGITS), n.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(whole.len() + whole.len() / 3 + decimals + 2);
    if n.is_sign_negative() && n != 0.0 {
        out.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 && n.is_finite() {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
        out.extend(std::iter::repeat('0').take(decimals - fraction.len()));
    }
    Ok(Value::Str(out))
}

/// Random integer in `low..=high`.
pub fn random_int(args: &[Value]) -> Result<Value, ValueError> {
    let low = args[0].to_int()?;
    let high = args[1].to_int()?;
    if low > high {
        return Err(ValueError::Invalid(format!(
            "empty range for RANDOM_INT({}, {})",
            low, high
        )));
    }
    Ok(Value::Int(rand::thread_rng().gen_range(low..=high)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn float(val: f64) -> Value {
        Value::Float(val)
    }

    #[test]
    fn test_round() {
        assert_eq!(round(&[float(3.14159), Value::Int(2)]), Ok(float(3.14)));
        assert_eq!(round(&[float(2.5)]), Ok(float(2.0)));
        assert_eq!(round(&[float(3.5)]), Ok(float(4.0)));
        assert_eq!(round(&[Value::Int(1234), Value::Int(-2)]), Ok(float(1200.0)));
        assert_eq!(round(&[Value::from("2.71")]), Ok(float(3.0)));
    }

    #[test]
    fn test_round_extreme_decimals() {
        assert_eq!(round(&[Value::Int(1), Value::Int(i32::MIN as i64)]), Ok(float(0.0)));
        assert_eq!(round(&[Value::Int(1), Value::Int(i64::MIN)]), Ok(float(0.0)));
        assert_eq!(round(&[float(-5.0), Value::Int(-309)]), Ok(float(-0.0)));
        assert_eq!(round(&[float(1.5), Value::Int(i64::MAX)]), Ok(float(1.5)));
        assert_eq!(round(&[float(0.1), Value::Int(330)]), Ok(float(0.1)));
        assert_eq!(round(&[float(1e300), Value::Int(10)]), Ok(float(1e300)));
        assert_eq!(round(&[float(f64::INFINITY), Value::Int(-2)]), Ok(float(f64::INFINITY)));
    }

    #[test]
    fn test_floor_ceil() {
        assert_eq!(floor(&[float(3.7)]), Ok(Value::Int(3)));
        assert_eq!(floor(&[float(-3.2)]), Ok(Value::Int(-4)));
        assert_eq!(ceil(&[float(3.2)]), Ok(Value::Int(4)));
        assert_eq!(ceil(&[Value::Int(5)]), Ok(Value::Int(5)));
    }

    #[test]
    fn test_abs() {
        assert_eq!(abs(&[Value::Int(-5)]), Ok(Value::Int(5)));
        assert_eq!(abs(&[float(-2.5)]), Ok(float(2.5)));
        assert!(abs(&[Value::from("x")]).is_err());
    }

    #[test]
    fn test_min_max() {
        let args = [Value::Int(3), float(1.5), Value::Int(7)];
        assert_eq!(min(&args), Ok(float(1.5)));
        assert_eq!(max(&args), Ok(Value::Int(7)));
        assert_eq!(max(&[Value::from("a"), Value::from("b")]), Ok(Value::from("b")));
        assert!(min(&[Value::Int(1), Value::from("a")]).is_err());
    }

    #[test]
    fn test_sum_avg() {
        assert_eq!(sum(&[]), Ok(Value::Int(0)));
        assert_eq!(sum(&[Value::Int(1), Value::Int(2), Value::Int(3)]), Ok(Value::Int(6)));
        assert_eq!(sum(&[Value::Int(1), float(0.5)]), Ok(float(1.5)));
        assert_eq!(avg(&[]), Ok(Value::Int(0)));
        assert_eq!(avg(&[Value::Int(1), Value::Int(2)]), Ok(float(1.5)));
        assert!(sum(&[Value::from("a")]).is_err());
    }

    #[test]
    fn test_pow_sqrt() {
        assert_eq!(pow(&[Value::Int(2), Value::Int(10)]), Ok(float(1024.0)));
        assert_eq!(pow(&[Value::Int(0), Value::Int(-1)]), Err(ValueError::DivisionByZero));
        assert_eq!(pow(&[Value::Int(-8), float(0.5)]), Err(domain_error()));
        assert_eq!(sqrt(&[Value::Int(16)]), Ok(float(4.0)));
        assert_eq!(sqrt(&[Value::Int(-1)]), Err(domain_error()));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(int(&[float(3.9)]), Ok(Value::Int(3)));
        assert_eq!(int(&[Value::from("-2.5")]), Ok(Value::Int(-2)));
        assert_eq!(int(&[Value::Int(i64::MAX)]), Ok(Value::Int(i64::MAX)));
        assert_eq!(super::float(&[Value::Int(2)]), Ok(float(2.0)));
        assert!(int(&[Value::from("abc")]).is_err());
    }

    #[test]
    fn test_format_num() {
        assert_eq!(
            format_num(&[float(1234567.891), Value::Int(2)]),
            Ok(Value::from("1,234,567.89"))
        );
        assert_eq!(format_num(&[Value::Int(1000)]), Ok(Value::from("1,000.00")));
        assert_eq!(format_num(&[Value::Int(999), Value::Int(0)]), Ok(Value::from("999")));
        assert_eq!(
            format_num(&[float(-1234.5), Value::Int(1)]),
            Ok(Value::from("-1,234.5"))
        );
        assert!(format_num(&[Value::Int(1), Value::Int(-1)]).is_err());
    }

    #[test]
    fn test_format_num_many_decimals() {
        let formatted = format_num(&[Value::Int(1), Value::Int(70_000)]).unwrap().to_string();
        assert_eq!(formatted.len(), 70_002);
        assert!(formatted.starts_with("1.000"));
        assert!(formatted[2..].bytes().all(|b| b == b'0'));

        // an f64 has a finite decimal expansion, printed in full
        let formatted = format_num(&[float(0.1), Value::Int(2000)]).unwrap().to_string();
        assert!(formatted.starts_with("0.1000000000000000055511151231257827"));
        assert_eq!(formatted.len(), 2002);

        assert_eq!(
            format_num(&[Value::Int(1), Value::Int(1_000_000_000_000)]),
            Err(ValueError::Overflow)
        );
    }

    #[test]
    fn test_random_int() {
        for _ in 0..100 {
            match random_int(&[Value::Int(1), Value::Int(6)]) {
                Ok(Value::Int(n)) => assert!((1..=6).contains(&n)),
                other => panic!("unexpected result {:?}", other),
            }
        }
        assert_eq!(random_int(&[Value::Int(4), Value::Int(4)]), Ok(Value::Int(4)));
        assert!(random_int(&[Value::Int(5), Value::Int(1)]).is_err());
    }
}
