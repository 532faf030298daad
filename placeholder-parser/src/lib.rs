//! Lexer, AST and recursive-descent parser for placeholder expressions.
//!
//! ```text
//! expression     = comparison
//! comparison     = additive ( comparator additive )?
//! additive       = multiplicative ( ('+'|'-') multiplicative )*
//! multiplicative = unary ( ('*'|'/'|'%') unary )*
//! unary          = '-' unary | primary
//! primary        = number | string | identifier_or_call | '(' expression ')'
//! identifier_or_call = IDENTIFIER ( '(' (expression (',' expression)*)? ')' )?
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod visitor;

pub use parser::{parse, Parser};
