#![warn(missing_docs)]
//! `completion-edit-lsp` - LSP completion parsing for `completion-edit`.
//!
//! Turns LSP `CompletionItem` / `CompletionList` JSON values into [`completion_edit::Completion`]s,
//! keeping the server's negotiated position encoding on every range so the transaction can
//! translate columns itself.

pub mod lsp_completion;
pub mod lsp_text_edits;

pub use lsp_completion::{
    LspCompletion, completion_from_item, completion_list_from_value, position_encoding_from_value,
};
pub use lsp_text_edits::{CompletionTextEditMode, range_edit_from_value, range_edits_from_value};
