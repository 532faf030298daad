use placeholder_source::{SyntaxError, SyntaxErrorKind};
use placeholder_value::ValueError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Lexical or syntax error. `evaluate_value` recovers from these, except for
    /// [`SyntaxErrorKind::TooDeep`].
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// An operator was applied to values it does not support.
    #[error(transparent)]
    Value(#[from] ValueError),
    /// A native function rejected its arguments or failed.
    #[error("{ident}: {source}")]
    Function { ident: String, source: ValueError },
}

impl EvalError {
    pub fn function(ident: impl Into<String>, source: ValueError) -> Self {
        EvalError::Function {
            ident: ident.into(),
            source,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, EvalError::Syntax(_))
    }

    /// A syntax error that means the text is not an expression, as opposed to one that
    /// nests past the parser limit.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EvalError::Syntax(err) if err.kind != SyntaxErrorKind::TooDeep)
    }

    /// Moves the position of a syntax error `offset` bytes to the right.
    pub(crate) fn offset(self, offset: usize) -> Self {
        match self {
            EvalError::Syntax(err) => EvalError::Syntax(err.offset(offset)),
            other => other,
        }
    }
}
