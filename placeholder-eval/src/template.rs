//! Splitting text into literal runs and `{expression}` sites.

use placeholder_source::{SyntaxError, SyntaxErrorKind};
use placeholder_value::Value;

/// State of the brace matcher. Braces only count outside of quoted strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    SingleQuoted,
    SingleQuotedEscape,
    DoubleQuoted,
    DoubleQuotedEscape,
}

impl ScanState {
    fn step(self, byte: u8) -> Self {
        use ScanState::*;
        match (self, byte) {
            (Normal, b'\'') => SingleQuoted,
            (Normal, b'"') => DoubleQuoted,
            (Normal, _) => Normal,
            (SingleQuoted, b'\\') => SingleQuotedEscape,
            (SingleQuoted, b'\'') => Normal,
            (SingleQuoted, _) | (SingleQuotedEscape, _) => SingleQuoted,
            (DoubleQuoted, b'\\') => DoubleQuotedEscape,
            (DoubleQuoted, b'"') => Normal,
            (DoubleQuoted, _) | (DoubleQuotedEscape, _) => DoubleQuoted,
        }
    }
}

/// Returns the byte index of the `}` that closes the `{` at `open`.
pub fn find_closing_brace(text: &str, open: usize) -> Result<usize, SyntaxError> {
    let mut depth = 1usize;
    let mut state = ScanState::Normal;

    for (i, byte) in text.bytes().enumerate().skip(open + 1) {
        if state == ScanState::Normal {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        state = state.step(byte);
    }

    Err(SyntaxError::new(
        SyntaxErrorKind::UnmatchedBrace,
        open..open + 1,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied to the output as is.
    Text(&'a str),
    /// The text between a pair of braces. `offset` is the byte index of that text in the template.
    Expr { source: &'a str, offset: usize },
}

/// Iterator over the [`Segment`]s of a template. Stops after the first unmatched `{`.
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
    failed: bool,
}

pub fn segments(text: &str) -> Segments<'_> {
    Segments {
        text,
        pos: 0,
        failed: false,
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.text.len() {
            return None;
        }

        let rest = &self.text[self.pos..];
        match rest.find('{') {
            Some(0) => match find_closing_brace(self.text, self.pos) {
                Ok(close) => {
                    let offset = self.pos + 1;
                    self.pos = close + 1;
                    Some(Ok(Segment::Expr {
                        source: &self.text[offset..close],
                        offset,
                    }))
                }
                Err(err) => {
                    self.failed = true;
                    Some(Err(err))
                }
            },
            Some(open) => {
                self.pos += open;
                Some(Ok(Segment::Text(&rest[..open])))
            }
            None => {
                self.pos = self.text.len();
                Some(Ok(Segment::Text(rest)))
            }
        }
    }
}

/// Replaces every literal `{KEY}` with the stringified value of `KEY`, key by key in order.
/// Nothing is evaluated.
pub fn substitute_placeholders(text: &str, values: &[(String, Value)]) -> String {
    let mut result = text.to_string();
    for (key, value) in values {
        let placeholder = format!("{{{}}}", key);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &value.to_string());
        }
    }
    result
}
