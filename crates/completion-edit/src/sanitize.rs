//! Staleness sanitizing.
//!
//! Range edits are computed against the cursor at request time. By the time they are applied
//! the user may have typed or deleted more text, so the range is shifted to follow the live
//! cursor, replaced by the edit's fallback, or dropped.

use crate::snippet::requires_snippet;
use crate::{ContextualEdit, Cursors, Edit, Position, RangeEdit, SnippetEdit, SnippetRangeEdit};

fn shift_col(col: usize, diff: isize) -> usize {
    col.checked_add_signed(diff).unwrap_or(0)
}

/// Move `edit`'s range to follow the live cursor, or `None` if the range ends before it.
///
/// With a detached cursor the range is returned unchanged.
pub fn shift_or_reject(cursors: Cursors, edit: &RangeEdit) -> Option<(Position, Position)> {
    let Some(row) = cursors.row else {
        return Some((edit.begin, edit.end));
    };
    let col = cursors.col(edit.encoding);
    let (begin, end) = (edit.begin, edit.end);

    if end.col < col {
        return None;
    }

    let diff = col as isize - edit.cursor_pos as isize;

    // Deleting before the edit pulls a begin that sat past the cursor back with it.
    let begin_col = if begin.row == row && begin.col > edit.cursor_pos && diff < 0 {
        shift_col(begin.col, diff)
    } else {
        begin.col
    };
    // Typing extends the replaced range over the new text.
    let end_col = if end.row == row && end.col >= edit.cursor_pos && diff > 0 {
        shift_col(end.col, diff)
    } else {
        end.col
    };

    Some((
        Position::new(begin.row, begin_col),
        Position::new(end.row, end_col),
    ))
}

fn shifted(cursors: Cursors, edit: &RangeEdit) -> Option<RangeEdit> {
    let Some((begin, end)) = shift_or_reject(cursors, edit) else {
        tracing::debug!(
            target: "edit.sanitize",
            begin = ?edit.begin,
            end = ?edit.end,
            cursor_pos = edit.cursor_pos,
            live = ?cursors,
            "stale_edit_rejected"
        );
        return None;
    };
    Some(RangeEdit {
        begin,
        end,
        ..edit.clone()
    })
}

/// Re-validate a previously computed `edit` against the live `cursors`.
///
/// - Range edits with a fallback use the fallback as a plain edit; otherwise the range is
///   shifted, or rejected when stale.
/// - Ranged snippets with a detached cursor keep their template only when it is also the
///   fallback, and become plain edits when the template has no snippet syntax.
/// - Ranged snippets with a live cursor prefer their fallback, then plain text, then a
///   shifted range.
/// - Plain snippets pass through. Plain and contextual edits become plain edits.
pub fn sanitize(cursors: Cursors, edit: &Edit) -> Option<Edit> {
    match edit {
        Edit::SnippetRange(snippet) => {
            let range = &snippet.range;
            match (cursors.row, &range.fallback) {
                (None, fallback) => {
                    if fallback.as_deref() == Some(range.new_text.as_str()) {
                        Some(Edit::Snippet(SnippetEdit {
                            new_text: range.new_text.clone(),
                            grammar: snippet.grammar,
                        }))
                    } else if !requires_snippet(&range.new_text) {
                        Some(Edit::plain(range.new_text.clone()))
                    } else {
                        tracing::debug!(
                            target: "edit.sanitize",
                            "detached_snippet_range_rejected"
                        );
                        None
                    }
                }
                (Some(_), Some(fallback)) => Some(Edit::Snippet(SnippetEdit {
                    new_text: fallback.clone(),
                    grammar: snippet.grammar,
                })),
                (Some(_), None) if !requires_snippet(&range.new_text) => {
                    Some(Edit::plain(range.new_text.clone()))
                }
                (Some(_), None) => shifted(cursors, range).map(|range| {
                    Edit::SnippetRange(SnippetRangeEdit {
                        range,
                        grammar: snippet.grammar,
                    })
                }),
            }
        }
        Edit::Range(range) => match &range.fallback {
            Some(fallback) => Some(Edit::plain(fallback.clone())),
            None => shifted(cursors, range).map(Edit::Range),
        },
        Edit::Snippet(_) => Some(edit.clone()),
        Edit::Plain(_) | Edit::Contextual(_) => Some(Edit::plain(edit.new_text())),
    }
}

/// Prepare the last completion's primary edit for re-application.
///
/// The edit is sanitized against a detached cursor; a plain result becomes a pure insertion
/// at the cursor.
pub fn repeat_edit(previous: &Edit) -> Option<Edit> {
    match sanitize(Cursors::detached(), previous)? {
        Edit::Plain(edit) => Some(Edit::Contextual(ContextualEdit {
            new_prefix: edit.new_text.clone(),
            new_text: edit.new_text,
            old_prefix: String::new(),
            old_suffix: String::new(),
        })),
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Encoding, SnippetGrammar};
    use pretty_assertions::assert_eq;

    fn live(row: usize, col: usize) -> Cursors {
        Cursors {
            row: Some(row),
            col_utf8: col,
            col_utf16: col,
            col_utf32: col,
        }
    }

    fn range(begin: (usize, usize), end: (usize, usize), cursor_pos: usize) -> RangeEdit {
        RangeEdit::new(
            Position::new(begin.0, begin.1),
            Position::new(end.0, end.1),
            Encoding::Utf16,
            "replacement",
        )
        .with_cursor_pos(cursor_pos)
    }

    #[test]
    fn test_typing_extends_end_only() {
        let c = 10;
        let edit = range((4, c - 2), (4, c + 3), c);
        let (begin, end) = shift_or_reject(live(4, c + 1), &edit).unwrap();
        assert_eq!(begin, Position::new(4, c - 2));
        assert_eq!(end, Position::new(4, c + 4));
    }

    #[test]
    fn test_deleting_pulls_begin_back() {
        let edit = range((0, 6), (0, 9), 5);
        let (begin, end) = shift_or_reject(live(0, 3), &edit).unwrap();
        assert_eq!(begin, Position::new(0, 4));
        assert_eq!(end, Position::new(0, 9));
    }

    #[test]
    fn test_cursor_past_end_is_stale() {
        let edit = range((0, 2), (0, 5), 5);
        assert_eq!(shift_or_reject(live(0, 6), &edit), None);
        assert_eq!(sanitize(live(0, 6), &Edit::Range(edit)), None);
    }

    #[test]
    fn test_other_rows_are_not_shifted() {
        let edit = range((1, 2), (3, 8), 4);
        let (begin, end) = shift_or_reject(live(2, 6), &edit).unwrap();
        assert_eq!((begin, end), (edit.begin, edit.end));
    }

    #[test]
    fn test_detached_cursor_keeps_range() {
        let edit = range((1, 2), (1, 8), 4);
        assert_eq!(
            sanitize(Cursors::detached(), &Edit::Range(edit.clone())),
            Some(Edit::Range(edit))
        );
    }

    #[test]
    fn test_encoding_selects_cursor_column() {
        // Cursor after "👋": 4 bytes, 2 UTF-16 units.
        let cursors = Cursors::from_line(0, "👋", 4);
        let edit = range((0, 0), (0, 2), 2);
        assert!(shift_or_reject(cursors, &edit).is_some());
        let utf8 = RangeEdit {
            encoding: Encoding::Utf8,
            ..edit
        };
        assert_eq!(shift_or_reject(cursors, &utf8), None);
    }

    #[test]
    fn test_range_fallback_wins() {
        let edit = range((0, 0), (0, 1), 0).with_fallback("text");
        assert_eq!(sanitize(live(0, 99), &Edit::Range(edit)), Some(Edit::plain("text")));
    }

    #[test]
    fn test_snippet_range_policies() {
        let snippet = |text: &str, fallback: Option<&str>| {
            let mut range = range((0, 0), (0, 5), 3);
            range.new_text = text.into();
            range.fallback = fallback.map(str::to_string);
            Edit::SnippetRange(SnippetRangeEdit {
                range,
                grammar: SnippetGrammar::Lsp,
            })
        };

        // Detached: template reused only when it doubles as the fallback.
        assert_eq!(
            sanitize(Cursors::detached(), &snippet("f($1)", Some("f($1)"))),
            Some(Edit::Snippet(SnippetEdit {
                new_text: "f($1)".into(),
                grammar: SnippetGrammar::Lsp,
            }))
        );
        assert_eq!(sanitize(Cursors::detached(), &snippet("f($1)", None)), None);
        assert_eq!(
            sanitize(Cursors::detached(), &snippet("f()", None)),
            Some(Edit::plain("f()"))
        );

        // Live: fallback, then plain text, then shift.
        assert_eq!(
            sanitize(live(0, 3), &snippet("f($1)", Some("g"))),
            Some(Edit::Snippet(SnippetEdit {
                new_text: "g".into(),
                grammar: SnippetGrammar::Lsp,
            }))
        );
        assert_eq!(sanitize(live(0, 3), &snippet("f()", None)), Some(Edit::plain("f()")));
        let Some(Edit::SnippetRange(shifted)) = sanitize(live(0, 4), &snippet("f($1)", None)) else {
            panic!("expected shifted snippet range");
        };
        assert_eq!(shifted.range.end, Position::new(0, 6));
        assert_eq!(sanitize(live(0, 9), &snippet("f($1)", None)), None);
    }

    #[test]
    fn test_plain_and_contextual_become_plain() {
        let contextual = Edit::Contextual(ContextualEdit {
            new_text: "abc".into(),
            old_prefix: "a".into(),
            old_suffix: String::new(),
            new_prefix: "abc".into(),
        });
        assert_eq!(sanitize(live(0, 0), &contextual), Some(Edit::plain("abc")));
        let snippet = Edit::Snippet(SnippetEdit {
            new_text: "$1".into(),
            grammar: SnippetGrammar::Snu,
        });
        assert_eq!(sanitize(live(0, 0), &snippet), Some(snippet.clone()));
    }

    #[test]
    fn test_repeat_turns_plain_into_pure_insertion() {
        let repeated = repeat_edit(&Edit::plain("hello")).unwrap();
        assert_eq!(
            repeated,
            Edit::Contextual(ContextualEdit {
                new_text: "hello".into(),
                old_prefix: String::new(),
                old_suffix: String::new(),
                new_prefix: "hello".into(),
            })
        );
        let edit = range((0, 0), (0, 2), 2).with_fallback("fb");
        assert!(matches!(repeat_edit(&Edit::Range(edit)), Some(Edit::Contextual(c)) if c.new_text == "fb"));
    }
}
