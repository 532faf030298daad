//! Source code representation and error management.

use console::style;
use std::ops::Range;
use thiserror::Error;

/// Represents source code.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Returns the 1-based line and column of the byte offset `position`.
    /// Offsets past the end are clamped to the end of the content.
    pub fn line_col(&self, position: usize) -> (usize, usize) {
        let position = floor_char_boundary(self.content, position);
        let before = &self.content[..position];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = self.content[line_start..position].chars().count() + 1;
        (line, col)
    }

    /// Renders `error` together with the offending line and a caret under its start.
    pub fn render_error(&self, error: &SyntaxError) -> String {
        let position = floor_char_boundary(self.content, error.span.start);
        let (line, col) = self.line_col(position);
        let line_start = self.content[..position].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.content[position..]
            .find('\n')
            .map_or(self.content.len(), |i| position + i);

        let width = error.span.len().max(1).min(line_end.saturating_sub(position).max(1));
        format!(
            "{label}: {message}\n {line:>3} | {text}\n     | {pad}{caret}",
            label = style("error").red().bold(),
            message = error,
            line = line,
            text = &self.content[line_start..line_end],
            pad = " ".repeat(col - 1),
            caret = style("^".repeat(width)).red(),
        )
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

fn floor_char_boundary(content: &str, mut position: usize) -> usize {
    position = position.min(content.len());
    while !content.is_char_boundary(position) {
        position -= 1;
    }
    position
}

/// What went wrong while reading an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("unmatched '{{'")]
    UnmatchedBrace,
    #[error("expression nested too deeply")]
    TooDeep,
}

/// Represents a syntax error (lexical errors included).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at position {}", .span.start)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Range<usize>,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `kind` and `span`.
    pub fn new(kind: SyntaxErrorKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }

    /// Shifts the span by `offset` bytes. Used when the erroneous text was cut out of a larger
    /// string (e.g. one `{...}` site of a template).
    pub fn offset(mut self, offset: usize) -> Self {
        self.span = self.span.start + offset..self.span.end + offset;
        self
    }

    /// `true` for errors raised while splitting the input into tokens.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self.kind,
            SyntaxErrorKind::UnexpectedCharacter(_) | SyntaxErrorKind::UnterminatedString
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SyntaxError::new(SyntaxErrorKind::UnexpectedCharacter('$'), 4..5);
        assert_eq!(err.to_string(), "unexpected character '$' at position 4");

        let err = SyntaxError::new(
            SyntaxErrorKind::Expected {
                expected: "')'".to_string(),
                found: "end of input".to_string(),
            },
            6..6,
        );
        assert_eq!(
            err.to_string(),
            "expected ')', found end of input at position 6"
        );
        assert_eq!(
            SyntaxError::new(SyntaxErrorKind::UnmatchedBrace, 0..1).to_string(),
            "unmatched '{' at position 0"
        );
    }

    #[test]
    fn test_offset() {
        let err = SyntaxError::new(SyntaxErrorKind::UnterminatedString, 2..5).offset(10);
        assert_eq!(err.span, 12..15);
        assert!(err.is_lexical());
    }

    #[test]
    fn test_line_col() {
        let source = Source::new("ab\ncd\nef");
        assert_eq!(source.line_col(0), (1, 1));
        assert_eq!(source.line_col(4), (2, 2));
        assert_eq!(source.line_col(100), (3, 3));
    }

    #[test]
    fn test_render_error() {
        console::set_colors_enabled(false);
        let source = Source::new("1 + $");
        let err = SyntaxError::new(SyntaxErrorKind::UnexpectedCharacter('$'), 4..5);
        let rendered = source.render_error(&err);
        assert!(rendered.contains("unexpected character '$' at position 4"));
        assert!(rendered.ends_with("    ^"));
    }
}
