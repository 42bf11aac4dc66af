#![warn(missing_docs)]
//! Completion Edit - Headless Edit-Transaction Engine
//!
//! # Overview
//!
//! `completion-edit` turns an accepted completion candidate into concrete buffer writes. Given
//! the candidate's primary edit, its linked secondary edits and a snapshot of the rows around
//! them, it computes an ordered, conflict-free set of line/column replacements, the final cursor
//! position and the placement of snippet placeholder marks, all before the buffer is touched.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Snippet Expansion (SnippetExpander)        │  ← templates → edits + marks
//! ├─────────────────────────────────────────────┤
//! │  Row-Window Resolver + Line Cache           │  ← rows to fetch, UTF-8/16/32
//! ├─────────────────────────────────────────────┤
//! │  Instruction Synthesizer                    │  ← one instruction per edit
//! ├─────────────────────────────────────────────┤
//! │  Conflict Resolver                          │  ← primary always wins
//! ├─────────────────────────────────────────────┤
//! │  Shift Calculator                           │  ← sequential coordinates
//! ├─────────────────────────────────────────────┤
//! │  Buffer Writes, Cursor, Mark Shifter        │  ← best-effort mutation
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use completion_edit::{
//!     Buffer, Completion, Edit, EditContext, EditSettings, EditTransaction, MarkNamespace,
//!     MemoryBuffer, MemoryMarks, Position,
//! };
//!
//! let mut buffer = MemoryBuffer::from_text("let x = fo;");
//! let mut marks = MemoryMarks::new();
//! let settings = EditSettings::default();
//!
//! let ctx = EditContext::new(0, 10, "let x = fo;", buffer.line_count());
//! let completion = Completion::new(Edit::plain("foobar"));
//!
//! let applied = EditTransaction::new(&mut buffer, &mut marks, MarkNamespace(1), &settings)
//!     .apply(&ctx, &completion)
//!     .unwrap();
//!
//! assert_eq!(buffer.text(), "let x = foobar;");
//! assert_eq!(applied.cursor, Position::new(0, 14));
//! ```
//!
//! # Module Description
//!
//! - [`edit`] - edit variants, positions and encodings
//! - [`rows`] - row windows to fetch before synthesis
//! - [`lines`] - multi-encoding line cache
//! - [`instruction`] - instruction synthesis
//! - [`consolidate`] - conflict resolution
//! - [`shift`] - coordinate shifting, cursor and mark placement
//! - [`sanitize`] - staleness checks and repeat
//! - [`snippet`] - snippet expansion
//! - [`transaction`] - the end-to-end transaction
//! - [`buffer`] - buffer and mark-store interfaces
//!
//! # Unicode Support
//!
//! - Instructions always use UTF-8 byte columns
//! - Range edits declare their columns in UTF-8, UTF-16 or UTF-32 units
//! - Columns are floored to char boundaries and clamped to the row

pub mod buffer;
pub mod consolidate;
pub mod context;
pub mod edit;
pub mod error;
pub mod instruction;
pub mod lines;
pub mod rows;
pub mod sanitize;
pub mod settings;
pub mod shift;
pub mod snippet;
mod text;
pub mod tokenize;
pub mod trans;
pub mod transaction;

pub use buffer::{Buffer, MarkStore, MemoryBuffer, MemoryMarks, live_cursors};
pub use consolidate::consolidate;
pub use context::EditContext;
pub use edit::{
    Completion, ContextualEdit, Cursors, Edit, Encoding, Mark, MarkNamespace, PlainEdit, Position,
    RangeEdit, SnippetEdit, SnippetGrammar, SnippetRangeEdit,
};
pub use error::{Abort, BufferError, SnippetError};
pub use instruction::{EditInstruction, Synthesizer};
pub use lines::{CachedLine, LineCache};
pub use rows::{RowWindow, edit_window, merge_row_windows, resolve_row_windows};
pub use sanitize::{repeat_edit, sanitize, shift_or_reject};
pub use settings::{CompleteOptions, EditSettings, IndentOptions, MatchOptions, SettingsError};
pub use shift::{MarkShift, resolve_cursor, shift_instructions, shift_marks};
pub use snippet::{Expansion, PlaceholderExpander, SnippetExpander, TextTransforms, requires_snippet};
pub use tokenize::{Tokenizer, WordTokenizer};
pub use trans::{contextual_from_plain, indent_adjusted};
pub use transaction::{AppliedCompletion, EditPlan, EditTransaction, marks_message};
