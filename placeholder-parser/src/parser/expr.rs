use super::*;
use crate::ast::{BinaryOp, UnaryOp};

/// An expression and the height of its tree.
type Parsed = Result<(Expr, usize), SyntaxError>;

impl Parser {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_expr_bp(0).map(|(expr, _)| expr) // 0 to accept any expression
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> Parsed {
        // NOTE: prefix operators are handled here
        match self.current_token() {
            Token::NumberLit(_) | Token::StringLit(_) => Ok((self.parse_literal_expr()?, 1)),
            Token::Identifier(_) => self.parse_identifier_or_call_expr(),
            Token::Minus => {
                self.next();
                let (arg, height) = self.parse_expr_bp(UnaryOp::BINDING_POWER)?;
                let expr = Expr::Unary {
                    op: UnaryOp::Neg,
                    arg: Box::new(arg),
                };
                Ok((expr, self.check_height(height + 1)?))
            }
            Token::OpenParen => {
                self.next();
                let parsed = self.parse_expr_bp(0)?;
                self.expect(Token::CloseParen)?;
                Ok(parsed)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression use, [`Self::parse_expr`].
    fn parse_expr_bp(&mut self, min_bp: u8) -> Parsed {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let parsed = self.parse_binary_expr(min_bp);
        self.depth -= 1;
        parsed
    }

    fn parse_binary_expr(&mut self, min_bp: u8) -> Parsed {
        let (mut lhs, mut height) = self.parse_primary_expr()?;
        // comparisons do not chain: `a < b < c` stops before the second `<`
        let mut compared = false;

        loop {
            let op = match BinaryOp::from_token(self.current_token()) {
                Some(op) => op,
                None => break, // not a valid binop, stop parsing
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }
            if op.is_comparison() {
                if compared {
                    break;
                }
                compared = true;
            }

            // self.current_token is a valid binop
            self.next();

            let (rhs, rhs_height) = self.parse_expr_bp(r_bp)?;
            // a left-leaning chain grows one level per operator
            height = self.check_height(height.max(rhs_height) + 1)?;

            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            }
        }

        Ok((lhs, height))
    }

    /* Expressions.Literals */
    /// Parses a literal expression.
    /// A literal can be either a number literal or a string literal.
    fn parse_literal_expr(&mut self) -> Result<Expr, SyntaxError> {
        let val = match self.current_token() {
            Token::NumberLit(val) => Expr::NumberLit(*val),
            Token::StringLit(val) => Expr::StringLit(val.clone()),
            _ => return Err(self.unexpected()),
        };
        self.next();
        Ok(val)
    }

    /* Expressions.Identifier */
    /// Parses an identifier or a call expression.
    fn parse_identifier_or_call_expr(&mut self) -> Parsed {
        let ident = match self.current_token() {
            Token::Identifier(ident) => ident.clone(),
            _ => return Err(self.unexpected()),
        };
        self.next();

        if self.eat(Token::OpenParen) {
            // parse call expression
            let mut args = Vec::new();
            let mut height = 0;

            if !self.eat(Token::CloseParen) {
                loop {
                    let (arg, arg_height) = self.parse_expr_bp(0)?;
                    args.push(arg);
                    height = height.max(arg_height);

                    if !self.eat(Token::Comma) {
                        self.expect(Token::CloseParen)?;
                        break;
                    }
                }
            }

            Ok((Expr::FnCall { ident, args }, self.check_height(height + 1)?))
        } else {
            // parse identifier expression
            Ok((Expr::Identifier(ident), 1))
        }
    }
}
