use crate::ast::Expr;
use crate::lexer::{tokenize, Lexeme, Token};
use placeholder_source::{Source, SyntaxError, SyntaxErrorKind};
use std::mem;

mod expr;

/// Deepest expression tree the parser accepts. Evaluating a tree recurses once per level.
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    /// Every token of the input, terminated by [`Token::Eof`].
    lexemes: Vec<Lexeme>,
    /// Index of the current token.
    pos: usize,
    /// Number of nested [`Parser::parse_expr_bp`] calls in progress.
    depth: usize,
}

impl Parser {
    /// Tokenizes `source`. Lexical errors are reported here, before any parsing happens.
    pub fn new(source: &Source) -> Result<Self, SyntaxError> {
        Ok(Self {
            lexemes: tokenize(source)?,
            pos: 0,
            depth: 0,
        })
    }

    /// Parses the whole input as a single expression.
    /// Anything left over after the expression is an error.
    pub fn parse_program(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_expr()?;
        if self.current_token() != &Token::Eof {
            return Err(self.unexpected());
        }
        Ok(expr)
    }
}

/// Parses `source` as a single expression.
pub fn parse(source: &Source) -> Result<Expr, SyntaxError> {
    Parser::new(source)?.parse_program()
}

/// Parse utilities
impl Parser {
    fn current(&self) -> &Lexeme {
        &self.lexemes[self.pos]
    }

    fn current_token(&self) -> &Token {
        &self.current().token
    }

    /// Moves past the current token. Stays on [`Token::Eof`] once it is reached.
    fn next(&mut self) {
        if self.pos + 1 < self.lexemes.len() {
            self.pos += 1;
        }
    }

    /// Predicate that tests whether the next token has the same discriminant and eats the next token if yes as a side effect.
    fn eat(&mut self, tok: Token) -> bool {
        if mem::discriminant(self.current_token()) == mem::discriminant(&tok) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token) -> Result<(), SyntaxError> {
        if self.eat(tok.clone()) {
            Ok(())
        } else {
            Err(SyntaxError::new(
                SyntaxErrorKind::Expected {
                    expected: tok.to_string(),
                    found: self.current_token().to_string(),
                },
                self.current().span.clone(),
            ))
        }
    }

    /// Fails once a tree of `height` levels would exceed [`MAX_DEPTH`].
    fn check_height(&self, height: usize) -> Result<usize, SyntaxError> {
        if height > MAX_DEPTH {
            Err(self.too_deep())
        } else {
            Ok(height)
        }
    }

    fn too_deep(&self) -> SyntaxError {
        SyntaxError::new(SyntaxErrorKind::TooDeep, self.current().span.clone())
    }

    /// Creates an unexpected token error for the current token.
    fn unexpected(&self) -> SyntaxError {
        SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken(self.current_token().to_string()),
            self.current().span.clone(),
        )
    }
}
