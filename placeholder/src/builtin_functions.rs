//! Native functions available to every expression.

use placeholder_eval::FunctionRegistry;
use placeholder_value::{Value, ValueError};
use sql::Database;
use std::rc::Rc;

mod date;
mod logic;
mod math;
pub mod sql;
mod string;

/// Returns a registry holding every built-in function.
pub fn default_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    register_all(&mut registry);
    registry
}

/// Returns [`default_registry`] plus `SQL`, which runs its queries against `database`.
pub fn registry_with_database(database: Rc<Database>) -> FunctionRegistry {
    let mut registry = default_registry();
    sql::register(&mut registry, database);
    registry
}

/// Registers every built-in function into `registry`, replacing functions with the same name.
pub fn register_all(registry: &mut FunctionRegistry) {
    math::register(registry);
    string::register(registry);
    logic::register(registry);
    date::register(registry);
}

/// Stringified optional argument.
fn text_or(args: &[Value], index: usize, default: &str) -> String {
    match args.get(index) {
        Some(value) => value.to_string(),
        None => default.to_string(),
    }
}

fn int_or(args: &[Value], index: usize, default: i64) -> Result<i64, ValueError> {
    match args.get(index) {
        Some(value) => value.to_int(),
        None => Ok(default),
    }
}

/// Resolves a possibly negative `index` into a position in a sequence of length `len`.
fn wrap_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}
