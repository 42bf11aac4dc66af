//! LSP `TextEdit` / `InsertReplaceEdit` parsing into [`RangeEdit`]s.
//!
//! Only the small subset of the protocol needed for completion items is parsed, straight from
//! `serde_json::Value`.

use completion_edit::{Encoding, Position, RangeEdit};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which range to use when a completion item carries an LSP `InsertReplaceEdit`.
pub enum CompletionTextEditMode {
    /// Use the `insert` range (usually less destructive).
    Insert,
    /// Use the `replace` range.
    Replace,
}

fn parse_lsp_position(value: &Value) -> Option<Position> {
    Some(Position::new(
        value.get("line")?.as_u64()? as usize,
        value.get("character")?.as_u64()? as usize,
    ))
}

fn parse_lsp_range(value: &Value) -> Option<(Position, Position)> {
    let start = parse_lsp_position(value.get("start")?)?;
    let end = parse_lsp_position(value.get("end")?)?;
    Some((start, end))
}

/// Parse a `TextEdit` or `InsertReplaceEdit` value.
///
/// Columns are kept in the server's `encoding`; `cursor_pos` is the cursor column (same
/// encoding) at the time the completion was requested.
pub fn range_edit_from_value(
    value: &Value,
    encoding: Encoding,
    cursor_pos: usize,
    mode: CompletionTextEditMode,
) -> Option<RangeEdit> {
    let new_text = value.get("newText").and_then(Value::as_str)?;

    let (begin, end) = match value.get("range") {
        Some(range) => parse_lsp_range(range)?,
        None => {
            let key = match mode {
                CompletionTextEditMode::Insert => "insert",
                CompletionTextEditMode::Replace => "replace",
            };
            parse_lsp_range(value.get(key)?)?
        }
    };

    Some(RangeEdit::new(begin, end, encoding, new_text).with_cursor_pos(cursor_pos))
}

/// Parse a JSON array of `TextEdit` values, skipping malformed entries.
pub fn range_edits_from_value(value: &Value, encoding: Encoding, cursor_pos: usize) -> Vec<RangeEdit> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|edit| {
                    let parsed =
                        range_edit_from_value(edit, encoding, cursor_pos, CompletionTextEditMode::Replace);
                    if parsed.is_none() {
                        tracing::debug!(target: "edit.lsp", edit = %edit, "malformed_text_edit");
                    }
                    parsed
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}
