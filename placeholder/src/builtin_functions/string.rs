//! Text functions. Every argument is stringified first and positions count characters.

use super::{text_or, wrap_index};
use placeholder_eval::{Arity, FunctionRegistry};
use placeholder_value::{check_str_len, Value, ValueError};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("UPPER", Arity::Exact(1), |args| map_text(args, |s| s.to_uppercase()));
    registry.register("LOWER", Arity::Exact(1), |args| map_text(args, |s| s.to_lowercase()));
    registry.register("CAPITALIZE", Arity::Exact(1), |args| map_text(args, capitalize));
    registry.register("TITLE", Arity::Exact(1), |args| map_text(args, title));
    registry.register("TRIM", Arity::Exact(1), |args| map_text(args, |s| s.trim().to_string()));
    registry.register("TRIM_LEFT", Arity::Exact(1), |args| {
        map_text(args, |s| s.trim_start().to_string())
    });
    registry.register("TRIM_RIGHT", Arity::Exact(1), |args| {
        map_text(args, |s| s.trim_end().to_string())
    });
    registry.register("REVERSE", Arity::Exact(1), |args| {
        map_text(args, |s| s.chars().rev().collect())
    });
    registry.register("LEN", Arity::Exact(1), len);
    registry.register("REPLACE", Arity::Exact(3), replace);
    registry.register("SUBSTR", Arity::Range(2, 3), substr);
    registry.register("LEFT", Arity::Exact(2), left);
    registry.register("RIGHT", Arity::Exact(2), right);
    registry.register("PAD_LEFT", Arity::Range(2, 3), |args| pad(args, true));
    registry.register("PAD_RIGHT", Arity::Range(2, 3), |args| pad(args, false));
    registry.register("REPEAT", Arity::Exact(2), repeat);
    registry.register("CONCAT", Arity::AtLeast(0), concat);
    registry.register("JOIN", Arity::AtLeast(1), join);
    registry.register("CONTAINS", Arity::Exact(2), |args| {
        test_text(args, |text, sub| text.contains(sub))
    });
    registry.register("STARTS_WITH", Arity::Exact(2), |args| {
        test_text(args, |text, prefix| text.starts_with(prefix))
    });
    registry.register("ENDS_WITH", Arity::Exact(2), |args| {
        test_text(args, |text, suffix| text.ends_with(suffix))
    });
    registry.register("SPLIT", Arity::Exact(3), split);
    registry.register("COUNT_SUBSTR", Arity::Exact(2), count_substr);
}

fn map_text(args: &[Value], f: impl Fn(&str) -> String) -> Result<Value, ValueError> {
    Ok(Value::Str(f(&args[0].to_string())))
}

fn test_text(args: &[Value], f: impl Fn(&str, &str) -> bool) -> Result<Value, ValueError> {
    Ok(Value::Bool(f(&args[0].to_string(), &args[1].to_string())))
}

/// Characters `start..end` of `text`. Negative bounds count from the end and both are clamped.
fn slice(text: &str, start: Option<i64>, end: Option<i64>) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len() as i64;
    let clamp = |bound: i64| {
        let bound = if bound < 0 { bound + len } else { bound };
        bound.clamp(0, len) as usize
    };
    let start = start.map_or(0, clamp);
    let end = end.map_or(chars.len(), clamp);
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
fn title(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}

pub fn len(args: &[Value]) -> Result<Value, ValueError> {
    Ok(Value::Int(args[0].to_string().chars().count() as i64))
}

pub fn replace(args: &[Value]) -> Result<Value, ValueError> {
    let text = args[0].to_string();
    Ok(Value::Str(text.replace(&args[1].to_string(), &args[2].to_string())))
}

/// `SUBSTR(text, start, len?)`
pub fn substr(args: &[Value]) -> Result<Value, ValueError> {
    let start = args[1].to_int()?;
    let end = match args.get(2) {
        Some(len) => Some(start.saturating_add(len.to_int()?)),
        None => None,
    };
    Ok(Value::Str(slice(&args[0].to_string(), Some(start), end)))
}

pub fn left(args: &[Value]) -> Result<Value, ValueError> {
    let n = args[1].to_int()?;
    Ok(Value::Str(slice(&args[0].to_string(), None, Some(n))))
}

/// The last `n` characters, i.e. everything from position `-n` on. `RIGHT(text, 0)` is the
/// whole text and a negative `n` drops that many leading characters.
pub fn right(args: &[Value]) -> Result<Value, ValueError> {
    let n = args[1].to_int()?;
    Ok(Value::Str(slice(&args[0].to_string(), Some(n.saturating_neg()), None)))
}

fn pad(args: &[Value], left: bool) -> Result<Value, ValueError> {
    let text = args[0].to_string();
    let width = args[1].to_int()?;
    let fill = text_or(args, 2, " ")
        .chars()
        .next()
        .ok_or_else(|| ValueError::Invalid("padding character must not be empty".to_string()))?;

    let missing = usize::try_from(width)
        .unwrap_or(0)
        .saturating_sub(text.chars().count());
    check_str_len(missing.saturating_mul(fill.len_utf8()).saturating_add(text.len()))?;
    let padding: String = std::iter::repeat(fill).take(missing).collect();
    Ok(Value::Str(if left {
        padding + &text
    } else {
        text + &padding
    }))
}

pub fn repeat(args: &[Value]) -> Result<Value, ValueError> {
    Value::Str(args[0].to_string()).try_mul(&Value::Int(args[1].to_int()?))
}

pub fn concat(args: &[Value]) -> Result<Value, ValueError> {
    Ok(Value::Str(args.iter().map(Value::to_string).collect()))
}

/// `JOIN(separator, parts...)`
pub fn join(args: &[Value]) -> Result<Value, ValueError> {
    let separator = args[0].to_string();
    let parts: Vec<String> = args[1..].iter().map(Value::to_string).collect();
    Ok(Value::Str(parts.join(&separator)))
}

/// `SPLIT(text, separator, index)` returns one part. Negative indices count from the end.
pub fn split(args: &[Value]) -> Result<Value, ValueError> {
    let text = args[0].to_string();
    let separator = args[1].to_string();
    if separator.is_empty() {
        return Err(ValueError::Invalid("empty separator".to_string()));
    }
    let index = args[2].to_int()?;
    let parts: Vec<&str> = text.split(separator.as_str()).collect();
    wrap_index(index, parts.len())
        .map(|i| Value::from(parts[i]))
        .ok_or_else(|| {
            ValueError::Invalid(format!(
                "index {} out of range for {} part(s)",
                index,
                parts.len()
            ))
        })
}

/// Non-overlapping occurrences of a substring.
pub fn count_substr(args: &[Value]) -> Result<Value, ValueError> {
    let text = args[0].to_string();
    let sub = args[1].to_string();
    let count = if sub.is_empty() {
        text.chars().count() + 1
    } else {
        text.matches(sub.as_str()).count()
    };
    Ok(Value::Int(count as i64))
}
