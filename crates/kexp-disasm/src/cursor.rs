//! Forward-only cursor over the lines of a dump.

use std::iter::Peekable;

/// Single-pass position over a line sequence.
///
/// The cursor never rewinds and buffers at most the one line returned by
/// [`LineCursor::peek`], so dumps can be streamed straight from a reader.
pub struct LineCursor<I: Iterator> {
    lines: Peekable<I>,
    position: usize,
}

impl<I> LineCursor<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines: lines.peekable(),
            position: 0,
        }
    }

    /// Look at the current line without consuming it.
    pub fn peek(&mut self) -> Option<&str> {
        self.lines.peek().map(|line| line.as_ref())
    }

    /// Consume and return the current line.
    pub fn advance(&mut self) -> Option<I::Item> {
        let line = self.lines.next();
        if line.is_some() {
            self.position += 1;
        }
        line
    }

    /// Consume lines up to and including the first one matching `predicate`.
    ///
    /// Returns the matching line, or `None` once the input is exhausted.
    pub fn skip_past(&mut self, mut predicate: impl FnMut(&str) -> bool) -> Option<I::Item> {
        while let Some(line) = self.advance() {
            if predicate(line.as_ref()) {
                return Some(line);
            }
        }
        None
    }

    /// Number of lines consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut cursor = LineCursor::new("a\nb".lines());
        assert_eq!(cursor.peek(), Some("a"));
        assert_eq!(cursor.peek(), Some("a"));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.advance(), Some("a"));
        assert_eq!(cursor.peek(), Some("b"));
    }

    #[test]
    fn skip_past_consumes_the_match() {
        let mut cursor = LineCursor::new("x\ny\nClass #0\nnext".lines());
        let found = cursor.skip_past(|line| line.starts_with("Class #"));
        assert_eq!(found, Some("Class #0"));
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.advance(), Some("next"));
    }

    #[test]
    fn skip_past_exhausts_input_when_absent() {
        let mut cursor = LineCursor::new(vec!["x".to_string(), "y".to_string()].into_iter());
        assert!(cursor.skip_past(|line| line == "z").is_none());
        assert!(cursor.peek().is_none());
        assert_eq!(cursor.position(), 2);
    }
}
