//! Evaluation of placeholder expressions and `{expression}` templates.

mod error;
pub mod evaluator;
pub mod registry;
pub mod template;

pub use error::EvalError;
pub use evaluator::Evaluator;
pub use registry::{Arity, FunctionRegistry, NativeFunction};
