use logos::{Lexer, Logos};
use placeholder_source::{Source, SyntaxError, SyntaxErrorKind};
use std::fmt;
use std::ops::Range;

/// A number literal. Integer unless a decimal point was seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(val) => write!(f, "{}", val),
            Number::Float(val) => write!(f, "{:?}", val),
        }
    }
}

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    #[regex(r"[0-9]+(\.[0-9]*)?", lex_number)]
    NumberLit(Number),
    #[regex(r#""([^"\\]|\\(.|\n))*""#, lex_string)]
    #[regex(r#"'([^'\\]|\\(.|\n))*'"#, lex_string)]
    StringLit(String),

    // identifiers
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // binary operators
    // - arithmetics
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - ordering
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,

    // misc
    #[regex(r"[ \t\n\r\x0B\x0C]+", logos::skip)]
    #[error]
    Error,

    /// Always the last token produced by [`tokenize`].
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let punct = match self {
            Token::NumberLit(val) => return write!(f, "{}", val),
            Token::StringLit(val) => return write!(f, "{:?}", val),
            Token::Identifier(ident) => return write!(f, "'{}'", ident),
            Token::Error => return f.write_str("invalid token"),
            Token::Eof => return f.write_str("end of input"),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::EqualsEquals => "==",
            Token::NotEquals => "!=",
            Token::GreaterThan => ">",
            Token::GreaterThanEquals => ">=",
            Token::LessThan => "<",
            Token::LessThanEquals => "<=",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Comma => ",",
        };
        write!(f, "'{}'", punct)
    }
}

/// A [`Token`] together with the byte range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Splits `source` into tokens. The result always ends with exactly one [`Token::Eof`].
pub fn tokenize(source: &Source) -> Result<Vec<Lexeme>, SyntaxError> {
    let content = source.content;
    let mut lexer = Token::lexer(content);
    let mut lexemes = Vec::new();

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        if token == Token::Error {
            return Err(lex_error(content, span));
        }
        lexemes.push(Lexeme { token, span });
    }

    lexemes.push(Lexeme {
        token: Token::Eof,
        span: content.len()..content.len(),
    });
    Ok(lexemes)
}

/// Classifies a failed match. A quote that could not be matched as a full string literal can only
/// mean the closing quote is missing.
fn lex_error(content: &str, span: Range<usize>) -> SyntaxError {
    match content[span.start..].chars().next() {
        Some(quote @ ('"' | '\'')) => SyntaxError::new(
            SyntaxErrorKind::UnterminatedString,
            span.start..span.start + quote.len_utf8(),
        ),
        Some(ch) => SyntaxError::new(
            SyntaxErrorKind::UnexpectedCharacter(ch),
            span.start..span.start + ch.len_utf8(),
        ),
        None => SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken(Token::Eof.to_string()),
            span,
        ),
    }
}

fn lex_number(lex: &mut Lexer<Token>) -> Option<Number> {
    let slice = lex.slice();
    if slice.contains('.') {
        return slice.parse().ok().map(Number::Float);
    }
    // integers that do not fit in an i64 degrade to floats
    slice
        .parse()
        .map(Number::Int)
        .or_else(|_| slice.parse().map(Number::Float))
        .ok()
}

fn lex_string(lex: &mut Lexer<Token>) -> String {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

/// Resolves backslash escapes. `\n`, `\t` and `\r` are control characters, any other escaped
/// character (including `\` and quotes) stands for itself.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
