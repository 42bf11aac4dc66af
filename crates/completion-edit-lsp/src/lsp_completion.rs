//! Completion item parsing (LSP → [`Completion`]).
//!
//! Supported shapes:
//! - `CompletionItem.textEdit` as `TextEdit` or `InsertReplaceEdit`
//! - `CompletionItem.additionalTextEdits` (become secondary edits)
//! - `insertTextFormat == 2` snippets, ranged when a `textEdit` is present
//! - `CompletionList` objects and bare `CompletionItem[]` arrays

use crate::lsp_text_edits::{CompletionTextEditMode, range_edit_from_value, range_edits_from_value};
use completion_edit::{Completion, Edit, Encoding, SnippetEdit, SnippetGrammar, SnippetRangeEdit};
use serde_json::Value;

/// A parsed completion item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LspCompletion {
    /// Display label.
    pub label: String,
    /// Lowercased `filterText`, or the primary edit's text.
    pub sort_text: String,
    /// The edits to apply when the item is accepted.
    pub completion: Completion,
}

/// Map a negotiated `positionEncoding` to an [`Encoding`].
///
/// Accepts the encoding string itself, or an `InitializeResult` / `ServerCapabilities`
/// object carrying it. Anything else falls back to UTF-16, the protocol default.
pub fn position_encoding_from_value(value: &Value) -> Encoding {
    let raw = value
        .as_str()
        .or_else(|| value.get("positionEncoding").and_then(Value::as_str))
        .or_else(|| {
            value
                .get("capabilities")
                .and_then(|caps| caps.get("positionEncoding"))
                .and_then(Value::as_str)
        });
    match raw {
        Some("utf-8") => Encoding::Utf8,
        Some("utf-32") => Encoding::Utf32,
        _ => Encoding::Utf16,
    }
}

fn item_is_snippet(item: &Value) -> bool {
    item.get("insertTextFormat")
        .and_then(Value::as_u64)
        .map(|v| v == 2)
        .unwrap_or(false)
}

fn item_insert_text(item: &Value) -> Option<&str> {
    item.get("insertText")
        .and_then(Value::as_str)
        .or_else(|| item.get("label").and_then(Value::as_str))
}

fn primary_edit(
    item: &Value,
    encoding: Encoding,
    cursor_pos: usize,
    mode: CompletionTextEditMode,
) -> Option<Edit> {
    let snippet = item_is_snippet(item);

    if let Some(range) = item
        .get("textEdit")
        .and_then(|edit| range_edit_from_value(edit, encoding, cursor_pos, mode))
    {
        return Some(if snippet {
            Edit::SnippetRange(SnippetRangeEdit {
                range,
                grammar: SnippetGrammar::Lsp,
            })
        } else {
            Edit::Range(range)
        });
    }

    let text = item_insert_text(item)?.to_string();
    Some(if snippet {
        Edit::Snippet(SnippetEdit {
            new_text: text,
            grammar: SnippetGrammar::Lsp,
        })
    } else {
        Edit::plain(text)
    })
}

/// Parse one `CompletionItem`.
///
/// `cursor_pos` is the cursor column, in `encoding` units, when the request was sent.
/// Returns `None` for items without a label.
pub fn completion_from_item(
    item: &Value,
    encoding: Encoding,
    cursor_pos: usize,
    mode: CompletionTextEditMode,
) -> Option<LspCompletion> {
    let Some(label) = item.get("label").and_then(Value::as_str) else {
        tracing::debug!(target: "edit.lsp", item = %item, "completion_item_without_label");
        return None;
    };
    let primary = primary_edit(item, encoding, cursor_pos, mode)?;

    let secondary = item
        .get("additionalTextEdits")
        .map(|edits| range_edits_from_value(edits, encoding, cursor_pos))
        .unwrap_or_default();

    let sort_text = item
        .get("filterText")
        .and_then(Value::as_str)
        .unwrap_or(primary.new_text())
        .to_lowercase();

    Some(LspCompletion {
        label: label.to_string(),
        sort_text,
        completion: Completion::new(primary).with_secondary(secondary),
    })
}

/// Parse a completion response.
///
/// Returns `(is_incomplete, items)`. Bare arrays are treated as incomplete, as is anything
/// that is neither a `CompletionList` nor an array.
pub fn completion_list_from_value(
    value: &Value,
    encoding: Encoding,
    cursor_pos: usize,
    mode: CompletionTextEditMode,
) -> (bool, Vec<LspCompletion>) {
    let parse_all = |items: &Vec<Value>| {
        items
            .iter()
            .filter_map(|item| completion_from_item(item, encoding, cursor_pos, mode))
            .collect::<Vec<_>>()
    };

    if let Some(items) = value.get("items").and_then(Value::as_array) {
        let incomplete = value
            .get("isIncomplete")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        return (incomplete, parse_all(items));
    }
    match value.as_array() {
        Some(items) => (true, parse_all(items)),
        None => (true, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use completion_edit::Position;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_position_encoding_negotiation() {
        assert_eq!(position_encoding_from_value(&json!("utf-8")), Encoding::Utf8);
        assert_eq!(position_encoding_from_value(&json!("utf-32")), Encoding::Utf32);
        assert_eq!(
            position_encoding_from_value(&json!({ "capabilities": { "positionEncoding": "utf-8" } })),
            Encoding::Utf8
        );
        assert_eq!(position_encoding_from_value(&json!({})), Encoding::Utf16);
        assert_eq!(position_encoding_from_value(&json!("latin-1")), Encoding::Utf16);
    }

    #[test]
    fn test_plain_item_uses_insert_text_then_label() {
        let item = json!({ "label": "foo", "insertText": "foo()" });
        let parsed = completion_from_item(&item, Encoding::Utf16, 0, CompletionTextEditMode::Insert).unwrap();
        assert_eq!(parsed.completion.primary, Edit::plain("foo()"));
        assert_eq!(parsed.sort_text, "foo()");

        let item = json!({ "label": "Bar", "filterText": "BAR" });
        let parsed = completion_from_item(&item, Encoding::Utf16, 0, CompletionTextEditMode::Insert).unwrap();
        assert_eq!(parsed.completion.primary, Edit::plain("Bar"));
        assert_eq!(parsed.sort_text, "bar");
    }

    #[test]
    fn test_snippet_without_text_edit() {
        let item = json!({ "label": "fn", "insertText": "fn ${1:name}() {}", "insertTextFormat": 2 });
        let parsed = completion_from_item(&item, Encoding::Utf16, 0, CompletionTextEditMode::Insert).unwrap();
        assert_eq!(
            parsed.completion.primary,
            Edit::Snippet(SnippetEdit {
                new_text: "fn ${1:name}() {}".into(),
                grammar: SnippetGrammar::Lsp,
            })
        );
    }

    #[test]
    fn test_additional_edits_keep_start_column() {
        let item = json!({
            "label": "HashMap",
            "textEdit": {
                "range": { "start": { "line": 3, "character": 8 }, "end": { "line": 3, "character": 10 } },
                "newText": "HashMap"
            },
            "additionalTextEdits": [{
                "range": { "start": { "line": 0, "character": 2 }, "end": { "line": 0, "character": 5 } },
                "newText": "use std::collections::HashMap;\n"
            }]
        });
        let parsed = completion_from_item(&item, Encoding::Utf32, 10, CompletionTextEditMode::Insert).unwrap();
        let secondary = &parsed.completion.secondary[0];
        assert_eq!(secondary.begin, Position::new(0, 2));
        assert_eq!(secondary.end, Position::new(0, 5));
        assert_eq!(secondary.encoding, Encoding::Utf32);
        assert!(matches!(parsed.completion.primary, Edit::Range(_)));
    }

    #[test]
    fn test_item_without_label_is_skipped() {
        let item = json!({ "insertText": "x" });
        assert_eq!(completion_from_item(&item, Encoding::Utf16, 0, CompletionTextEditMode::Insert), None);
    }

    #[test]
    fn test_response_shapes() {
        let list = json!({ "isIncomplete": false, "items": [{ "label": "a" }, { "label": "b" }] });
        let (incomplete, items) = completion_list_from_value(&list, Encoding::Utf16, 0, CompletionTextEditMode::Insert);
        assert!(!incomplete);
        assert_eq!(items.len(), 2);

        let array = json!([{ "label": "a" }, { "nolabel": true }]);
        let (incomplete, items) = completion_list_from_value(&array, Encoding::Utf16, 0, CompletionTextEditMode::Insert);
        assert!(incomplete);
        assert_eq!(items.len(), 1);

        let (incomplete, items) = completion_list_from_value(&json!(null), Encoding::Utf16, 0, CompletionTextEditMode::Insert);
        assert!(incomplete);
        assert!(items.is_empty());
    }
}
