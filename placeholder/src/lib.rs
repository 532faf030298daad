//! Computed placeholders for documents: built-in functions, the placeholder pipeline and
//! helpers shared by the `placeholder` binary.

pub mod builtin_functions;
pub mod placeholders;

pub use placeholders::{PlaceholderSet, RenderError, Rendered};

use builtin_functions::sql::Database;
use console::style;
use placeholder_eval::{EvalError, Evaluator};
use placeholder_source::Source;
use placeholder_value::Value;
use std::rc::Rc;

/// Returns an [`Evaluator`] with every built-in function registered.
pub fn default_evaluator() -> Evaluator {
    Evaluator::new(builtin_functions::default_registry())
}

/// Like [`default_evaluator`], with `SQL` bound to `database`.
pub fn evaluator_with_database(database: Rc<Database>) -> Evaluator {
    Evaluator::new(builtin_functions::registry_with_database(database))
}

/// Formats `error` for a terminal. Syntax errors point into `text`, the input that produced them.
pub fn render_error(text: &str, error: &EvalError) -> String {
    match error {
        EvalError::Syntax(err) => Source::new(text).render_error(err),
        other => format!("{}: {}", style("error").red().bold(), other),
    }
}

/// Parses the value of a `KEY=VALUE` pair given on the command line.
///
/// Integers, floats, `true`, `false` and `null` become scalars. Anything else stays a string
/// and is evaluated later like any other raw value.
pub fn parse_raw_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(val) = raw.parse::<i64>() {
                Value::Int(val)
            } else if let Some(val) = raw.parse::<f64>().ok().filter(|val| val.is_finite()) {
                Value::Float(val)
            } else {
                Value::from(raw)
            }
        }
    }
}

/// For testing purposes only.
pub fn evaluate(raw: &str) -> Result<Value, EvalError> {
    default_evaluator().evaluate_value(&Value::from(raw))
}
