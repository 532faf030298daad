//! Name to native function mapping used to dispatch call expressions.

use crate::EvalError;
use placeholder_value::{Value, ValueError};
use std::collections::HashMap;
use std::fmt;

/// Signature shared by every native function. Arguments arrive already evaluated, in order.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, ValueError>;

/// Number of arguments a native function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive on both ends.
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => argc == n,
            Arity::Range(min, max) => (min..=max).contains(&argc),
            Arity::AtLeast(min) => argc >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

pub struct NativeFunction {
    pub ident: String,
    pub arity: Arity,
    func: Box<NativeFn>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.ident)
    }
}

/// The only extension point of the language: every function a template can call lives here.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, NativeFunction>,
}

impl FunctionRegistry {
    /// Create an empty `FunctionRegistry`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `func` under `ident`, replacing any previous function with that name.
    pub fn register<F>(&mut self, ident: impl Into<String>, arity: Arity, func: F)
    where
        F: Fn(&[Value]) -> Result<Value, ValueError> + 'static,
    {
        let ident = ident.into();
        self.functions.insert(
            ident.clone(),
            NativeFunction {
                ident,
                arity,
                func: Box::new(func),
            },
        );
    }

    pub fn has(&self, ident: &str) -> bool {
        self.functions.contains_key(ident)
    }

    pub fn get(&self, ident: &str) -> Option<&NativeFunction> {
        self.functions.get(ident)
    }

    /// Calls the function registered as `ident`.
    /// The argument count is checked against the registered [`Arity`] before the call.
    pub fn call(&self, ident: &str, args: &[Value]) -> Result<Value, EvalError> {
        let function = self
            .functions
            .get(ident)
            .ok_or_else(|| EvalError::UnknownFunction(ident.to_string()))?;

        if !function.arity.accepts(args.len()) {
            return Err(EvalError::function(
                ident,
                ValueError::ArgumentCount {
                    expected: function.arity.to_string(),
                    found: args.len(),
                },
            ));
        }

        (function.func)(args).map_err(|err| EvalError::function(ident, err))
    }

    /// Returns the names of all registered functions, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
