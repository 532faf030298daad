//! Calendar functions. Months and years are fixed spans of 30 and 365 days.

use chrono::{Datelike, Local, NaiveDate};
use placeholder_eval::{Arity, FunctionRegistry};
use placeholder_value::{DateComponent, DateValue, Duration, Value, ValueError};
use std::fmt::Write;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("TODAY", Arity::Exact(0), |_| Ok(Value::Date(DateValue::new(today()))));
    registry.register("DATE", Arity::Exact(3), date);
    registry.register("CURRENT_DATE_NUM", Arity::AtLeast(0), current_date_num);
    registry.register("CURRENT_DATE_STR", Arity::Range(0, 1), current_date_str);
    registry.register("DAYS", Arity::Exact(1), |args| days(args, 1));
    registry.register("WEEKS", Arity::Exact(1), |args| days(args, 7));
    registry.register("MONTHS", Arity::Exact(1), |args| days(args, 30));
    registry.register("YEARS", Arity::Exact(1), |args| days(args, 365));
    registry.register("DATE_FORMAT", Arity::Exact(2), date_format);
    registry.register("DAY_OF_WEEK", Arity::Range(0, 1), day_of_week);
    registry.register("DAYS_BETWEEN", Arity::Exact(2), days_between);
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn component(value: &Value) -> Result<DateComponent, ValueError> {
    value.to_string().parse()
}

/// `DATE(year, month, day)`
pub fn date(args: &[Value]) -> Result<Value, ValueError> {
    let year = args[0].to_int()?;
    let month = args[1].to_int()?;
    let day = args[2].to_int()?;
    let invalid = || ValueError::Invalid(format!("invalid date {}-{}-{}", year, month, day));

    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).map_err(|_| invalid())?,
        u32::try_from(month).map_err(|_| invalid())?,
        u32::try_from(day).map_err(|_| invalid())?,
    )
    .ok_or_else(invalid)?;
    Ok(Value::Date(DateValue::new(date)))
}

/// A single component gives its number, several give today's date printed with those components.
pub fn current_date_num(args: &[Value]) -> Result<Value, ValueError> {
    let today = today();
    match args {
        [] => Ok(Value::Date(DateValue::new(today))),
        [single] => Ok(Value::Int(match component(single)? {
            DateComponent::Day => today.day() as i64,
            DateComponent::Month => today.month() as i64,
            DateComponent::Year => today.year() as i64,
        })),
        many => {
            let components = many.iter().map(component).collect::<Result<_, _>>()?;
            Ok(Value::Date(DateValue::with_components(today, components)))
        }
    }
}

/// English names: `CURRENT_DATE_STR(month)` is `February`, `CURRENT_DATE_STR(day)` is the weekday.
pub fn current_date_str(args: &[Value]) -> Result<Value, ValueError> {
    let today = today();
    let pattern = match args.first() {
        None => "%B %d, %Y",
        Some(value) => match component(value)? {
            DateComponent::Day => "%A",
            DateComponent::Month => "%B",
            DateComponent::Year => "%Y",
        },
    };
    Ok(Value::Str(today.format(pattern).to_string()))
}

fn days(args: &[Value], factor: i64) -> Result<Value, ValueError> {
    args[0]
        .to_int()?
        .checked_mul(factor)
        .and_then(Duration::try_days)
        .map(Value::Duration)
        .ok_or(ValueError::Overflow)
}

/// `DATE_FORMAT(date, pattern)` with `strftime` style patterns.
pub fn date_format(args: &[Value]) -> Result<Value, ValueError> {
    let date = args[0].to_date()?;
    let pattern = args[1].to_string();
    let mut out = String::new();
    write!(out, "{}", date.date.format(&pattern))
        .map_err(|_| ValueError::Invalid(format!("invalid date format '{}'", pattern)))?;
    Ok(Value::Str(out))
}

/// ISO weekday number, Monday is 1. Defaults to today.
pub fn day_of_week(args: &[Value]) -> Result<Value, ValueError> {
    let date = match args.first() {
        Some(value) => value.to_date()?.date,
        None => today(),
    };
    Ok(Value::Int(date.weekday().number_from_monday() as i64))
}

/// `DAYS_BETWEEN(a, b)` is `b - a` in days.
pub fn days_between(args: &[Value]) -> Result<Value, ValueError> {
    let a = args[0].to_date()?.date;
    let b = args[1].to_date()?.date;
    Ok(Value::Int(b.signed_duration_since(a).num_days()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use placeholder_eval::Evaluator;
    use pretty_assertions::assert_eq;

    fn eval(text: &str) -> Value {
        let mut registry = FunctionRegistry::new();
        register(&mut registry);
        Evaluator::new(registry)
            .evaluate_expression(text)
            .unwrap_or_else(|err| panic!("{}: {}", text, err))
    }

    fn ymd(year: i32, month: u32, day: u32) -> Value {
        Value::Date(DateValue::new(NaiveDate::from_ymd_opt(year, month, day).unwrap()))
    }

    #[test]
    fn test_date() {
        assert_eq!(eval("DATE(2026, 3, 15)"), ymd(2026, 3, 15));
        assert_eq!(eval("DATE(2026, 3, 15)").to_string(), "15.03.2026");
        assert!(date(&[Value::Int(2026), Value::Int(2), Value::Int(30)]).is_err());
        assert!(date(&[Value::Int(2026), Value::Int(-1), Value::Int(1)]).is_err());
    }

    #[test]
    fn test_today() {
        let today = today();
        assert_eq!(eval("TODAY()"), Value::Date(DateValue::new(today)));
        assert_eq!(eval("CURRENT_DATE_NUM(year)"), Value::Int(today.year() as i64));
        assert_eq!(eval("CURRENT_DATE_NUM('month')"), Value::Int(today.month() as i64));
        assert_eq!(
            eval("CURRENT_DATE_NUM(year, month)").to_string(),
            format!("{}.{:02}", today.year(), today.month())
        );
        assert_eq!(eval("CURRENT_DATE_STR(year)"), Value::Str(today.year().to_string()));
        assert_eq!(
            eval("CURRENT_DATE_STR(month)"),
            Value::Str(today.format("%B").to_string())
        );
        assert!(current_date_num(&["week".into()]).is_err());
    }

    #[test]
    fn test_durations() {
        assert_eq!(eval("DAYS(3)"), Value::Duration(Duration::days(3)));
        assert_eq!(eval("WEEKS(2)"), Value::Duration(Duration::days(14)));
        assert_eq!(eval("MONTHS(1)"), Value::Duration(Duration::days(30)));
        assert_eq!(eval("YEARS(1)"), Value::Duration(Duration::days(365)));
        assert!(days(&[Value::Int(i64::MAX)], 7).is_err());
    }

    #[test]
    fn test_date_arithmetic() {
        assert_eq!(eval("DATE(2026, 2, 25) + DAYS(7)"), ymd(2026, 3, 4));
        assert_eq!(eval("DATE(2026, 1, 10) - WEEKS(2)"), ymd(2025, 12, 27));
        assert_eq!(eval("DATE(2026, 3, 1) - DATE(2026, 2, 1)").to_string(), "28 days");
        assert_eq!(eval("DATE(2026, 1, 2) > DATE(2025, 12, 31)"), Value::Bool(true));
    }

    #[test]
    fn test_date_format() {
        assert_eq!(
            eval("DATE_FORMAT(DATE(2026, 2, 16), '%Y-%m-%d')"),
            Value::from("2026-02-16")
        );
        assert_eq!(
            eval("DATE_FORMAT(DATE(2026, 2, 16), '%d %B %Y')"),
            Value::from("16 February 2026")
        );
        assert!(date_format(&["2026-02-16".into(), "%Y".into()]).is_err());
        assert!(date_format(&[ymd(2026, 2, 16), "%H:%M".into()]).is_err());
    }

    #[test]
    fn test_weekdays() {
        // 2026-02-16 is a Monday
        assert_eq!(eval("DAY_OF_WEEK(DATE(2026, 2, 16))"), Value::Int(1));
        assert_eq!(eval("DAY_OF_WEEK(DATE(2026, 2, 22))"), Value::Int(7));
        assert_eq!(eval("DAYS_BETWEEN(DATE(2026, 1, 1), DATE(2026, 3, 1))"), Value::Int(59));
        assert_eq!(eval("DAYS_BETWEEN(DATE(2026, 3, 1), DATE(2026, 1, 1))"), Value::Int(-59));
    }
}
