use crate::lexer::{Number, Token};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLit(Number),
    /// A string literal with its escapes already resolved.
    StringLit(String),
    /// A bare word (e.g. `foo`). Evaluates to its own name.
    Identifier(String),
    /// A function call (e.g. `UPPER('x')`).
    FnCall { ident: String, args: Vec<Expr> },
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
    /// A prefix expression (e.g. `-x`).
    Unary { op: UnaryOp, arg: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::Plus => Self::Add,
            Token::Minus => Self::Sub,
            Token::Asterisk => Self::Mul,
            Token::Slash => Self::Div,
            Token::Percent => Self::Rem,
            Token::GreaterThan => Self::Gt,
            Token::LessThan => Self::Lt,
            Token::GreaterThanEquals => Self::Ge,
            Token::LessThanEquals => Self::Le,
            Token::EqualsEquals => Self::Eq,
            Token::NotEquals => Self::Ne,
            _ => return None,
        })
    }

    /// Returns the binary binding power `(left, right)`.
    /// Binding power `0` and `1` is reserved for accepting any expression.
    pub fn binding_power(self) -> (u8, u8) {
        match self {
            /* Comparison */
            Self::Gt | Self::Lt | Self::Ge | Self::Le | Self::Eq | Self::Ne => (2, 3),
            /* Additive */
            Self::Add | Self::Sub => (4, 5),
            /* Multiplicative */
            Self::Mul | Self::Div | Self::Rem => (6, 7),
        }
    }

    pub fn is_comparison(self) -> bool {
        self.binding_power().0 == 2
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

impl UnaryOp {
    /// Binding power of the operand. Higher than any binary operator.
    pub const BINDING_POWER: u8 = 8;
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
        }
    }
}
