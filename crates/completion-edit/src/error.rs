//! Error types.
//!
//! Only *aborting* conditions surface as errors. Degraded conditions (a failed write, a
//! substituted fallback) are logged and reported on the result, and contract violations
//! panic.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failures reported by a [`Buffer`](crate::Buffer) or [`MarkStore`](crate::MarkStore).
pub enum BufferError {
    #[error("no such range {start}..{end} (buffer has {line_count} lines)")]
    /// The requested rows are outside the buffer.
    NoSuchRange {
        /// First requested row.
        start: usize,
        /// End row (exclusive).
        end: usize,
        /// Rows in the buffer.
        line_count: usize,
    },

    #[error("invalid position {row}:{col}")]
    /// A position does not exist in the buffer (or splits a character).
    InvalidPosition {
        /// Row.
        row: usize,
        /// UTF-8 byte column.
        col: usize,
    },

    #[error("invalid buffer: {0}")]
    /// The buffer is gone or otherwise unusable.
    InvalidBuffer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failures reported by a [`SnippetExpander`](crate::SnippetExpander).
pub enum SnippetError {
    #[error("unterminated placeholder at byte {offset}")]
    /// A `${` was never closed.
    Unterminated {
        /// Byte offset of the opening `$`.
        offset: usize,
    },

    #[error("invalid placeholder at byte {offset}")]
    /// A `${...}` body could not be parsed.
    InvalidPlaceholder {
        /// Byte offset of the opening `$`.
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Why a transaction was abandoned before touching the buffer.
///
/// The `Display` output is a one-line message suitable for showing to the user.
pub enum Abort {
    #[error("completion edit skipped: bad row window {start}..{end} (buffer has {line_count} lines)")]
    /// A row window fell outside the buffer.
    InvalidRowWindow {
        /// Window start (may be negative).
        start: i64,
        /// Window end (exclusive).
        end: i64,
        /// Rows in the buffer.
        line_count: usize,
    },

    #[error("completion edit skipped: {0}")]
    /// Reading the rows the edit needs failed.
    BufferRead(#[from] BufferError),

    #[error("failed to parse snippet: {0}")]
    /// The snippet template could not be expanded.
    SnippetParse(#[from] SnippetError),
}
