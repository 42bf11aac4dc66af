//! The cursor context a transaction is computed against.

use crate::Position;
use crate::text;

/// Snapshot of the cursor and its line, taken when the completion was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditContext {
    /// Cursor row.
    pub row: usize,
    /// Cursor column in UTF-8 bytes.
    pub col: usize,
    /// Full text of the cursor row.
    pub line: String,
    /// Number of rows in the buffer.
    pub line_count: usize,
    /// Line separator used to split edit text.
    pub linefeed: String,
}

impl EditContext {
    /// Create a context with `\n` as the linefeed.
    pub fn new(row: usize, col: usize, line: impl Into<String>, line_count: usize) -> Self {
        Self {
            row,
            col,
            line: line.into(),
            line_count,
            linefeed: "\n".to_string(),
        }
    }

    /// Override the linefeed.
    pub fn with_linefeed(mut self, linefeed: impl Into<String>) -> Self {
        self.linefeed = linefeed.into();
        self
    }

    /// The cursor position.
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Cursor row text before the cursor.
    pub fn line_before(&self) -> &str {
        text::before(&self.line, self.col)
    }

    /// Cursor row text from the cursor on.
    pub fn line_after(&self) -> &str {
        text::after(&self.line, self.col)
    }

    /// Split `text` into lines on this context's linefeed.
    pub fn split_lines<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text::split_lines(text, &self.linefeed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_before_and_after() {
        let ctx = EditContext::new(2, 4, "let foo = 1;", 10);
        assert_eq!(ctx.line_before(), "let ");
        assert_eq!(ctx.line_after(), "foo = 1;");
        assert_eq!(ctx.position(), Position::new(2, 4));
    }

    #[test]
    fn test_custom_linefeed() {
        let ctx = EditContext::new(0, 0, "", 1).with_linefeed("\r\n");
        assert_eq!(ctx.split_lines("a\r\nb"), vec!["a", "b"]);
    }
}
