//! Completion edit data model.
//!
//! Edits arrive in several shapes. Positions inside an [`EditInstruction`](crate::EditInstruction)
//! are always canonical (UTF-8 byte columns), but a [`RangeEdit`] declares its columns in the
//! [`Encoding`] of the source that produced it.

use std::cmp::Ordering;

/// A buffer position (zero-based row, zero-based column).
///
/// Column units depend on context: edits declare their own [`Encoding`], while synthesized
/// instructions always use UTF-8 byte columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl Position {
    /// Create a new position.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Code-unit encoding that an edit source uses for its columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Columns count UTF-8 bytes (canonical).
    Utf8,
    /// Columns count UTF-16 code units (LSP default).
    #[default]
    Utf16,
    /// Columns count Unicode scalar values.
    Utf32,
}

impl Encoding {
    /// Number of bytes per code unit in this encoding.
    pub const fn unit_width(self) -> usize {
        match self {
            Self::Utf8 => 1,
            Self::Utf16 => 2,
            Self::Utf32 => 4,
        }
    }
}

/// Insert `new_text` at the cursor, letting the engine work out what it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlainEdit {
    /// Text to insert.
    pub new_text: String,
}

/// An edit expressed relative to the cursor.
///
/// `old_prefix`/`old_suffix` are the text immediately before/after the cursor that gets
/// replaced; each may span several lines. The cursor ends up after `new_prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextualEdit {
    /// Replacement text.
    pub new_text: String,
    /// Text before the cursor being replaced.
    pub old_prefix: String,
    /// Text after the cursor being replaced.
    pub old_suffix: String,
    /// The part of `new_text` that ends up before the cursor.
    pub new_prefix: String,
}

/// An edit over an absolute range, columns expressed in `encoding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEdit {
    /// Replacement text.
    pub new_text: String,
    /// Range start (inclusive).
    pub begin: Position,
    /// Range end (exclusive).
    pub end: Position,
    /// Column encoding of `begin`, `end` and `cursor_pos`.
    pub encoding: Encoding,
    /// Cursor column (in `encoding`) at the time the edit was computed.
    pub cursor_pos: usize,
    /// Plain text to insert instead if the range can no longer be trusted.
    pub fallback: Option<String>,
    /// Part of `new_text` that ends up before the cursor. Only set by snippet expansion.
    pub new_prefix: Option<String>,
}

impl RangeEdit {
    /// Create a range edit with no fallback.
    pub fn new(begin: Position, end: Position, encoding: Encoding, new_text: impl Into<String>) -> Self {
        Self {
            new_text: new_text.into(),
            begin,
            end,
            encoding,
            cursor_pos: end.col,
            fallback: None,
            new_prefix: None,
        }
    }

    /// Set the cursor column recorded when the edit was computed.
    pub fn with_cursor_pos(mut self, cursor_pos: usize) -> Self {
        self.cursor_pos = cursor_pos;
        self
    }

    /// Set the fallback text.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Whether this edit came out of snippet expansion.
    pub fn is_expanded(&self) -> bool {
        self.new_prefix.is_some()
    }
}

/// Snippet grammar tag, passed through to the snippet expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnippetGrammar {
    /// LSP / VSCode snippet syntax.
    #[default]
    Lsp,
    /// SnipMate syntax.
    Snu,
}

/// A snippet inserted at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnippetEdit {
    /// Snippet template.
    pub new_text: String,
    /// Template grammar.
    pub grammar: SnippetGrammar,
}

/// A snippet over an absolute range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetRangeEdit {
    /// Range, encoding and template. `range.new_text` holds the template.
    pub range: RangeEdit,
    /// Template grammar.
    pub grammar: SnippetGrammar,
}

/// Any edit a completion candidate can propose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// See [`PlainEdit`].
    Plain(PlainEdit),
    /// See [`ContextualEdit`].
    Contextual(ContextualEdit),
    /// See [`RangeEdit`].
    Range(RangeEdit),
    /// See [`SnippetEdit`].
    Snippet(SnippetEdit),
    /// See [`SnippetRangeEdit`].
    SnippetRange(SnippetRangeEdit),
}

impl Edit {
    /// Shorthand for a plain edit.
    pub fn plain(new_text: impl Into<String>) -> Self {
        Self::Plain(PlainEdit {
            new_text: new_text.into(),
        })
    }

    /// The replacement (or template) text.
    pub fn new_text(&self) -> &str {
        match self {
            Self::Plain(edit) => &edit.new_text,
            Self::Contextual(edit) => &edit.new_text,
            Self::Range(edit) => &edit.new_text,
            Self::Snippet(edit) => &edit.new_text,
            Self::SnippetRange(edit) => &edit.range.new_text,
        }
    }

    /// The absolute range carried by range-shaped edits.
    pub fn range(&self) -> Option<&RangeEdit> {
        match self {
            Self::Range(edit) => Some(edit),
            Self::SnippetRange(edit) => Some(&edit.range),
            Self::Plain(_) | Self::Contextual(_) | Self::Snippet(_) => None,
        }
    }
}

/// A completion candidate's edits: one primary edit plus linked secondary range edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The main substitution at the cursor.
    pub primary: Edit,
    /// Linked edits elsewhere in the buffer (e.g. auto-imports). Never primary.
    pub secondary: Vec<RangeEdit>,
    /// Re-indent multi-line replacements to the surrounding indentation.
    pub adjust_indent: bool,
}

impl Completion {
    /// A completion with only a primary edit.
    pub fn new(primary: Edit) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
            adjust_indent: true,
        }
    }

    /// Attach secondary edits.
    pub fn with_secondary(mut self, secondary: Vec<RangeEdit>) -> Self {
        self.secondary = secondary;
        self
    }

    /// Override indent adjustment.
    pub fn with_adjust_indent(mut self, adjust_indent: bool) -> Self {
        self.adjust_indent = adjust_indent;
        self
    }
}

/// A placeholder region left in the buffer by snippet expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    /// Placeholder index (`$1` → 1; `$0` sorts last).
    pub id: usize,
    /// Region start (UTF-8 byte column).
    pub begin: Position,
    /// Region end (UTF-8 byte column).
    pub end: Position,
    /// Placeholder text.
    pub text: String,
}

/// Opaque handle naming the mark store namespace a transaction writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkNamespace(pub u64);

/// The live cursor expressed in all three encodings.
///
/// `row == None` means the cursor is detached from the buffer (e.g. a repeat outside insert
/// mode); range shifting is skipped in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursors {
    /// Cursor row, or `None` when detached.
    pub row: Option<usize>,
    /// Column in UTF-8 bytes.
    pub col_utf8: usize,
    /// Column in UTF-16 code units.
    pub col_utf16: usize,
    /// Column in Unicode scalar values.
    pub col_utf32: usize,
}

impl Cursors {
    /// A detached cursor.
    pub const fn detached() -> Self {
        Self {
            row: None,
            col_utf8: 0,
            col_utf16: 0,
            col_utf32: 0,
        }
    }

    /// Build the cursor tuple for `row` at byte column `col_utf8` within `line`.
    ///
    /// `col_utf8` is floored to a char boundary.
    pub fn from_line(row: usize, line: &str, col_utf8: usize) -> Self {
        let before = crate::text::before(line, col_utf8);
        Self {
            row: Some(row),
            col_utf8: before.len(),
            col_utf16: before.encode_utf16().count(),
            col_utf32: before.chars().count(),
        }
    }

    /// The cursor column in `encoding`.
    pub fn col(&self, encoding: Encoding) -> usize {
        match encoding {
            Encoding::Utf8 => self.col_utf8,
            Encoding::Utf16 => self.col_utf16,
            Encoding::Utf32 => self.col_utf32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_row_major() {
        assert!(Position::new(1, 0) > Position::new(0, 99));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(2, 3), Position::new(2, 3));
    }

    #[test]
    fn test_cursors_from_line_counts_each_encoding() {
        // "a👋b": 👋 is 4 UTF-8 bytes, 2 UTF-16 units, 1 scalar.
        let cursors = Cursors::from_line(3, "a👋b", 5);
        assert_eq!(cursors.row, Some(3));
        assert_eq!(cursors.col(Encoding::Utf8), 5);
        assert_eq!(cursors.col(Encoding::Utf16), 3);
        assert_eq!(cursors.col(Encoding::Utf32), 2);
    }

    #[test]
    fn test_cursors_from_line_floors_to_char_boundary() {
        let cursors = Cursors::from_line(0, "a👋b", 3);
        assert_eq!(cursors.col_utf8, 1);
        assert_eq!(cursors.col_utf16, 1);
    }
}
