//! Multi-encoding line cache.
//!
//! Edit sources disagree about column units: LSP servers usually count UTF-16 code units,
//! some count UTF-8 bytes, others Unicode scalar values. Every fetched row is kept in all
//! three encodings so a column can be sliced in the declared encoding and re-expressed in
//! canonical UTF-8 bytes.

use crate::Encoding;
use crate::text;
use std::collections::BTreeMap;
use std::ops::Range;

/// One buffer row in UTF-8, UTF-16 (LE) and UTF-32 (LE) form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachedLine {
    text: String,
    utf16: Vec<u8>,
    utf32: Vec<u8>,
}

static EMPTY_LINE: CachedLine = CachedLine {
    text: String::new(),
    utf16: Vec::new(),
    utf32: Vec::new(),
};

impl CachedLine {
    /// Encode `text` into every representation.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let utf16 = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let utf32 = text
            .chars()
            .flat_map(|c| u32::from(c).to_le_bytes())
            .collect();
        Self { text, utf16, utf32 }
    }

    /// The row text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the row in UTF-8 bytes.
    pub fn len8(&self) -> usize {
        self.text.len()
    }

    /// Raw bytes of the row in `encoding`.
    pub fn bytes(&self, encoding: Encoding) -> &[u8] {
        match encoding {
            Encoding::Utf8 => self.text.as_bytes(),
            Encoding::Utf16 => &self.utf16,
            Encoding::Utf32 => &self.utf32,
        }
    }

    /// Translate a column counted in `encoding` units into UTF-8 bytes.
    ///
    /// Columns past the end of the row clamp to the row length. A column that splits a
    /// character (a UTF-8 sequence or a UTF-16 surrogate pair) floors to its start.
    pub fn to_utf8_col(&self, col: usize, encoding: Encoding) -> usize {
        let width = encoding.unit_width();
        let bytes = self.bytes(encoding);
        let slice = &bytes[..col.saturating_mul(width).min(bytes.len())];
        let utf8 = match encoding {
            Encoding::Utf8 => text::floor_char_boundary(&self.text, slice.len()),
            Encoding::Utf16 => {
                let units = slice
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .filter_map(Result::ok)
                    .map(char::len_utf8)
                    .sum()
            }
            Encoding::Utf32 => slice
                .chunks_exact(4)
                .filter_map(|quad| char::from_u32(u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]])))
                .map(char::len_utf8)
                .sum(),
        };
        utf8.min(self.len8())
    }

    /// Translate a UTF-8 byte column into `encoding` units.
    pub fn from_utf8_col(&self, col: usize, encoding: Encoding) -> usize {
        let before = text::before(&self.text, col);
        match encoding {
            Encoding::Utf8 => before.len(),
            Encoding::Utf16 => before.encode_utf16().count(),
            Encoding::Utf32 => before.chars().count(),
        }
    }
}

/// Sparse row → [`CachedLine`] map for the rows a transaction fetched.
///
/// Rows that were never fetched read as empty lines.
#[derive(Debug, Clone, Default)]
pub struct LineCache {
    rows: BTreeMap<usize, CachedLine>,
}

impl LineCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from fetched `(rows, lines)` pairs.
    pub fn from_rows<I>(fetched: I) -> Self
    where
        I: IntoIterator<Item = (Range<usize>, Vec<String>)>,
    {
        let mut cache = Self::new();
        for (rows, lines) in fetched {
            debug_assert_eq!(rows.len(), lines.len(), "buffer returned wrong line count");
            for (row, line) in rows.zip(lines) {
                cache.insert(row, line);
            }
        }
        cache
    }

    /// Cache `text` for `row`.
    pub fn insert(&mut self, row: usize, text: impl Into<String>) {
        self.rows.insert(row, CachedLine::new(text));
    }

    /// The cached row, if it was fetched.
    pub fn get(&self, row: usize) -> Option<&CachedLine> {
        self.rows.get(&row)
    }

    /// The cached row, or an empty line.
    pub fn line(&self, row: usize) -> &CachedLine {
        self.rows.get(&row).unwrap_or(&EMPTY_LINE)
    }

    /// Length of `row` in UTF-8 bytes (0 for unfetched rows).
    pub fn len8(&self, row: usize) -> usize {
        self.line(row).len8()
    }

    /// Number of cached rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodings_are_populated() {
        let line = CachedLine::new("a👋");
        assert_eq!(line.len8(), 5);
        assert_eq!(line.bytes(Encoding::Utf8).len(), 5);
        assert_eq!(line.bytes(Encoding::Utf16).len(), 6);
        assert_eq!(line.bytes(Encoding::Utf32).len(), 8);
    }

    #[test]
    fn test_utf16_column_translation() {
        // "a👋b": utf-16 offsets a=0, 👋=1..3, b=3
        let line = CachedLine::new("a👋b");
        assert_eq!(line.to_utf8_col(0, Encoding::Utf16), 0);
        assert_eq!(line.to_utf8_col(1, Encoding::Utf16), 1);
        assert_eq!(line.to_utf8_col(3, Encoding::Utf16), 5);
        assert_eq!(line.to_utf8_col(4, Encoding::Utf16), 6);
    }

    #[test]
    fn test_utf16_split_surrogate_floors() {
        let line = CachedLine::new("a👋b");
        assert_eq!(line.to_utf8_col(2, Encoding::Utf16), 1);
    }

    #[test]
    fn test_utf8_split_sequence_floors() {
        let line = CachedLine::new("你好");
        assert_eq!(line.to_utf8_col(2, Encoding::Utf8), 0);
        assert_eq!(line.to_utf8_col(4, Encoding::Utf8), 3);
        assert_eq!(line.to_utf8_col(6, Encoding::Utf8), 6);
    }

    #[test]
    fn test_utf32_column_translation() {
        let line = CachedLine::new("你好x");
        assert_eq!(line.to_utf8_col(1, Encoding::Utf32), 3);
        assert_eq!(line.to_utf8_col(2, Encoding::Utf32), 6);
        assert_eq!(line.to_utf8_col(3, Encoding::Utf32), 7);
    }

    #[test]
    fn test_columns_clamp_to_line_length() {
        let line = CachedLine::new("abc");
        assert_eq!(line.to_utf8_col(10, Encoding::Utf8), 3);
        assert_eq!(line.to_utf8_col(10, Encoding::Utf16), 3);
        assert_eq!(line.to_utf8_col(10, Encoding::Utf32), 3);
    }

    #[test]
    fn test_round_trip_reproduces_slice() {
        let line = CachedLine::new("x = \"ü👋你\";");
        for encoding in [Encoding::Utf16, Encoding::Utf32] {
            let units = line.from_utf8_col(line.len8(), encoding);
            for col in 0..=units {
                let col8 = line.to_utf8_col(col, encoding);
                let back = line.from_utf8_col(col8, encoding);
                // Only columns on char boundaries round-trip; the split surrogate of 👋 floors.
                assert!(back <= col);
                if back == col {
                    assert_eq!(line.to_utf8_col(back, encoding), col8);
                }
            }
        }
    }

    #[test]
    fn test_missing_rows_read_as_empty() {
        let cache = LineCache::from_rows([(2..4, vec!["two".to_string(), "three".to_string()])]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.line(3).text(), "three");
        assert_eq!(cache.line(7).text(), "");
        assert_eq!(cache.len8(7), 0);
        // Reading a missing row does not insert it.
        assert_eq!(cache.len(), 2);
    }
}
