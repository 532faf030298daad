use super::text_or;
use placeholder_eval::{Arity, FunctionRegistry};
use placeholder_value::{Value, ValueError};
use std::env;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("IF", Arity::Range(2, 3), if_fn);
    registry.register("COALESCE", Arity::AtLeast(0), coalesce);
    registry.register("DEFAULT", Arity::Exact(2), coalesce);
    registry.register("DEFINED", Arity::Exact(1), |args| Ok(Value::Bool(!args[0].is_null())));
    registry.register("NOT", Arity::Exact(1), |args| Ok(Value::Bool(!args[0].is_truthy())));
    registry.register("AND", Arity::AtLeast(0), |args| {
        Ok(Value::Bool(args.iter().all(Value::is_truthy)))
    });
    registry.register("OR", Arity::AtLeast(0), |args| {
        Ok(Value::Bool(args.iter().any(Value::is_truthy)))
    });
    registry.register("CHOOSE", Arity::AtLeast(1), choose);
    registry.register("SWITCH", Arity::AtLeast(1), switch);
    registry.register("ENV", Arity::Range(1, 2), env_var);
}

/// `IF(condition, then, else?)`. A missing or null `else` yields the empty string.
pub fn if_fn(args: &[Value]) -> Result<Value, ValueError> {
    if args[0].is_truthy() {
        return Ok(args[1].clone());
    }
    match args.get(2) {
        Some(value) if !value.is_null() => Ok(value.clone()),
        _ => Ok(Value::Str(String::new())),
    }
}

/// First argument that is not null.
pub fn coalesce(args: &[Value]) -> Result<Value, ValueError> {
    Ok(args
        .iter()
        .find(|value| !value.is_null())
        .cloned()
        .unwrap_or(Value::Null))
}

/// `CHOOSE(index, options...)` with a 0-based index.
pub fn choose(args: &[Value]) -> Result<Value, ValueError> {
    let index = args[0].to_int()?;
    let options = &args[1..];
    usize::try_from(index)
        .ok()
        .and_then(|i| options.get(i))
        .cloned()
        .ok_or_else(|| {
            ValueError::Invalid(format!(
                "index {} out of range (0..{})",
                index,
                options.len() as i64 - 1
            ))
        })
}

/// `SWITCH(value, case, result, ..., default?)`. Without a match and a default, the result is null.
pub fn switch(args: &[Value]) -> Result<Value, ValueError> {
    let value = &args[0];
    for pair in args[1..].chunks(2) {
        match pair {
            [case, result] if value.equals(case) => return Ok(result.clone()),
            [default] => return Ok(default.clone()),
            _ => {}
        }
    }
    Ok(Value::Null)
}

/// `ENV(name, fallback?)`
pub fn env_var(args: &[Value]) -> Result<Value, ValueError> {
    let name = args[0].to_string();
    Ok(Value::Str(
        env::var(&name).unwrap_or_else(|_| text_or(args, 1, "")),
    ))
}
