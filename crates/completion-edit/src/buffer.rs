//! Buffer and mark-store interfaces, plus in-memory implementations.
//!
//! The engine never owns the text it edits: reads and writes go through [`Buffer`], and
//! placeholder marks go through [`MarkStore`]. All positions use UTF-8 byte columns.

use crate::error::BufferError;
use crate::{Cursors, Mark, MarkNamespace, Position};
use ropey::Rope;
use std::collections::HashMap;
use std::ops::Range;

/// Line-oriented access to the edited buffer.
pub trait Buffer {
    /// Number of rows in the buffer.
    fn line_count(&self) -> usize;

    /// Rows `rows.start..rows.end`, without line terminators.
    fn get_lines(&self, rows: Range<usize>) -> Result<Vec<String>, BufferError>;

    /// Replace the text between `begin` and `end` with `lines` (joined by line breaks).
    fn set_text(&mut self, begin: Position, end: Position, lines: &[String]) -> Result<(), BufferError>;

    /// Current cursor position.
    fn cursor(&self) -> Result<Position, BufferError>;

    /// Move the cursor.
    fn set_cursor(&mut self, position: Position) -> Result<(), BufferError>;
}

/// Namespaced storage for placeholder marks.
pub trait MarkStore {
    /// Marks currently stored under `namespace`.
    fn marks(&self, namespace: MarkNamespace) -> Vec<Mark>;

    /// Replace the marks stored under `namespace`.
    fn set_marks(&mut self, namespace: MarkNamespace, marks: Vec<Mark>) -> Result<(), BufferError>;
}

/// Read the live cursor of `buffer` in every encoding.
pub fn live_cursors(buffer: &dyn Buffer) -> Result<Cursors, BufferError> {
    let cursor = buffer.cursor()?;
    let line = buffer
        .get_lines(cursor.row..cursor.row + 1)?
        .into_iter()
        .next()
        .unwrap_or_default();
    Ok(Cursors::from_line(cursor.row, &line, cursor.col))
}

/// A [`Buffer`] backed by a [`Rope`].
///
/// Rows are separated by `\n`; a trailing `\n` produces a final empty row.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    rope: Rope,
    cursor: Position,
}

impl MemoryBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Position::default(),
        }
    }

    /// Builder-style cursor placement.
    pub fn with_cursor(mut self, cursor: Position) -> Self {
        self.cursor = cursor;
        self
    }

    /// The whole buffer as a string.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of `row`, or `None` past the end of the buffer.
    pub fn line(&self, row: usize) -> Option<String> {
        if row >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(row).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Char index of `position`, validating the row, the column and the char boundary.
    fn char_index(&self, position: Position) -> Result<usize, BufferError> {
        let invalid = || BufferError::InvalidPosition {
            row: position.row,
            col: position.col,
        };
        let line = self.line(position.row).ok_or_else(invalid)?;
        if position.col > line.len() || !line.is_char_boundary(position.col) {
            return Err(invalid());
        }
        let byte = self.rope.line_to_byte(position.row) + position.col;
        Ok(self.rope.byte_to_char(byte))
    }
}

impl Buffer for MemoryBuffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn get_lines(&self, rows: Range<usize>) -> Result<Vec<String>, BufferError> {
        let line_count = self.line_count();
        if rows.start > rows.end || rows.end > line_count {
            return Err(BufferError::NoSuchRange {
                start: rows.start,
                end: rows.end,
                line_count,
            });
        }
        Ok(rows.filter_map(|row| self.line(row)).collect())
    }

    fn set_text(&mut self, begin: Position, end: Position, lines: &[String]) -> Result<(), BufferError> {
        let start = self.char_index(begin)?;
        let stop = self.char_index(end)?;
        if start > stop {
            return Err(BufferError::InvalidPosition {
                row: end.row,
                col: end.col,
            });
        }
        self.rope.remove(start..stop);
        self.rope.insert(start, &lines.join("\n"));
        Ok(())
    }

    fn cursor(&self) -> Result<Position, BufferError> {
        Ok(self.cursor)
    }

    fn set_cursor(&mut self, position: Position) -> Result<(), BufferError> {
        self.char_index(position)?;
        self.cursor = position;
        Ok(())
    }
}

/// A [`MarkStore`] keeping marks in a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryMarks {
    namespaces: HashMap<MarkNamespace, Vec<Mark>>,
}

impl MemoryMarks {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkStore for MemoryMarks {
    fn marks(&self, namespace: MarkNamespace) -> Vec<Mark> {
        self.namespaces.get(&namespace).cloned().unwrap_or_default()
    }

    fn set_marks(&mut self, namespace: MarkNamespace, marks: Vec<Mark>) -> Result<(), BufferError> {
        if let Some(mark) = marks.iter().find(|mark| mark.begin > mark.end) {
            return Err(BufferError::InvalidPosition {
                row: mark.end.row,
                col: mark.end.col,
            });
        }
        self.namespaces.insert(namespace, marks);
        Ok(())
    }
}
