//! A set of placeholder definitions and its rendering pipeline.
//!
//! Entries arrive as ordered `(key, raw value)` pairs, the way a settings loader hands them
//! over. A few keys are reserved:
//!
//! * `ON_START` and `ON_END`: hook expressions evaluated before and after the placeholders,
//!   for their side effects only.
//! * `OUTPUT_NAME`: pattern for the name of the generated artifact.
//! * `OUTPUT_FORMAT`: requested output formats.

use placeholder_eval::template::substitute_placeholders;
use placeholder_eval::{EvalError, Evaluator};
use placeholder_value::Value;
use thiserror::Error;
use tracing::{debug, info};

pub const ON_START: &str = "ON_START";
pub const ON_END: &str = "ON_END";
pub const OUTPUT_NAME: &str = "OUTPUT_NAME";
pub const OUTPUT_FORMAT: &str = "OUTPUT_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    OnStart,
    OnEnd,
}

impl Hook {
    pub fn key(self) -> &'static str {
        match self {
            Hook::OnStart => ON_START,
            Hook::OnEnd => ON_END,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("{} hook #{index}: {source}", .hook.key())]
    Hook {
        hook: Hook,
        index: usize,
        source: EvalError,
    },
    #[error("{key}: {source}")]
    Placeholder { key: String, source: EvalError },
    #[error("OUTPUT_NAME: {0}")]
    OutputName(#[source] EvalError),
}

impl RenderError {
    /// The underlying evaluation error.
    pub fn eval_error(&self) -> &EvalError {
        match self {
            RenderError::Hook { source, .. } | RenderError::Placeholder { source, .. } => source,
            RenderError::OutputName(source) => source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderSet {
    pub placeholders: Vec<(String, Value)>,
    pub on_start: Vec<Value>,
    pub on_end: Vec<Value>,
    pub output_name: Option<String>,
    pub output_formats: Vec<String>,
}

/// A hook or format entry may be given as a single value or as a list.
fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::List(items) => items,
        other => vec![other],
    }
}

fn normalize_format(format: &Value) -> String {
    format.to_string().to_lowercase().trim_start_matches('.').to_string()
}

impl PlaceholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits the reserved keys from the placeholder entries. Order is preserved and a
    /// repeated placeholder key keeps its first position with the last value.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut set = Self::new();
        for (key, value) in entries {
            set.insert(key, value);
        }
        set
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match key.as_str() {
            ON_START => self.on_start.extend(as_list(value)),
            ON_END => self.on_end.extend(as_list(value)),
            OUTPUT_NAME if value.is_null() => self.output_name = None,
            OUTPUT_NAME => self.output_name = Some(value.to_string()),
            OUTPUT_FORMAT => self
                .output_formats
                .extend(as_list(value).iter().map(normalize_format)),
            _ => match self.placeholders.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => self.placeholders.push((key, value)),
            },
        }
    }

    fn run_hooks(&self, evaluator: &Evaluator, hook: Hook) -> Result<(), RenderError> {
        let hooks = match hook {
            Hook::OnStart => &self.on_start,
            Hook::OnEnd => &self.on_end,
        };
        for (index, expr) in hooks.iter().enumerate() {
            debug!(hook = hook.key(), index, "running hook");
            evaluator
                .evaluate_value(expr)
                .map_err(|source| RenderError::Hook {
                    hook,
                    index,
                    source,
                })?;
        }
        Ok(())
    }

    /// Runs the whole pipeline: `ON_START` hooks, every placeholder in order, the output
    /// name, then `ON_END` hooks. The first error aborts.
    #[tracing::instrument(level = "info", skip_all, fields(placeholders = self.placeholders.len()))]
    pub fn render(&self, evaluator: &Evaluator) -> Result<Rendered, RenderError> {
        self.run_hooks(evaluator, Hook::OnStart)?;

        let mut values = Vec::with_capacity(self.placeholders.len());
        for (key, raw) in &self.placeholders {
            let value = evaluator
                .evaluate_value(raw)
                .map_err(|source| RenderError::Placeholder {
                    key: key.clone(),
                    source,
                })?;
            info!(%key, %value, "placeholder evaluated");
            values.push((key.clone(), value));
        }

        let output_name = match &self.output_name {
            Some(pattern) => Some(
                evaluator
                    .resolve_output_name(pattern, &values)
                    .map_err(RenderError::OutputName)?,
            ),
            None => None,
        };

        self.run_hooks(evaluator, Hook::OnEnd)?;

        Ok(Rendered {
            values,
            output_name,
            output_formats: self.output_formats.clone(),
        })
    }
}

/// Computed placeholder values, ready to be substituted into documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub values: Vec<(String, Value)>,
    pub output_name: Option<String>,
    pub output_formats: Vec<String>,
}

impl Rendered {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Replaces every literal `{KEY}` in `text` with the stringified value of `KEY`.
    /// Unknown keys and other braces are left alone.
    pub fn substitute(&self, text: &str) -> String {
        substitute_placeholders(text, &self.values)
    }
}
