//! Row-window resolution.
//!
//! Works out which buffer rows a transaction has to read before it can synthesize
//! instructions, and merges the per-edit windows into disjoint ranges.

use crate::error::Abort;
use crate::{Edit, RangeEdit};
use std::ops::Range;

/// Half-open row window `[start, end)` before validation (`start` may be negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    /// First row.
    pub start: i64,
    /// End row (exclusive).
    pub end: i64,
}

impl RowWindow {
    /// Create a window.
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

fn range_window(edit: &RangeEdit) -> RowWindow {
    let lo = edit.begin.row.min(edit.end.row);
    let hi = edit.begin.row.max(edit.end.row);
    RowWindow::new(lo as i64, hi as i64)
}

/// The rows `edit` needs, relative to cursor row `row`.
pub fn edit_window(row: usize, linefeed: &str, edit: &Edit) -> RowWindow {
    let row = row as i64;
    match edit {
        Edit::Contextual(edit) => {
            let prefix_lines = edit.old_prefix.split(linefeed).count() as i64;
            let suffix_lines = edit.old_suffix.split(linefeed).count() as i64;
            RowWindow::new(row - (prefix_lines - 1), row + (suffix_lines - 1))
        }
        Edit::Range(edit) => range_window(edit),
        Edit::SnippetRange(edit) => range_window(&edit.range),
        Edit::Plain(_) | Edit::Snippet(_) => RowWindow::new(row, row + 1),
    }
}

/// Pad, validate and merge `windows`.
///
/// Each window's end is padded by `padding` rows and clamped to `line_count`. Any window
/// starting before row 0 or past its (clamped) end aborts the whole transaction.
pub fn merge_row_windows(
    windows: &[RowWindow],
    padding: usize,
    line_count: usize,
) -> Result<Vec<Range<usize>>, Abort> {
    let mut padded = Vec::with_capacity(windows.len());
    for window in windows {
        let end = (window.end + padding as i64).min(line_count as i64);
        if window.start < 0 || window.start > end {
            tracing::warn!(
                target: "edit.rows",
                start = window.start,
                end,
                line_count,
                "bad_row_window"
            );
            return Err(Abort::InvalidRowWindow {
                start: window.start,
                end,
                line_count,
            });
        }
        padded.push(window.start as usize..end as usize);
    }

    padded.sort_by_key(|range| (range.start, range.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(padded.len());
    for range in padded {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    Ok(merged)
}

/// Rows to fetch for a primary edit plus its secondary edits.
///
/// Windows are padded by `1 + secondary.len()` rows of look-ahead.
pub fn resolve_row_windows(
    row: usize,
    line_count: usize,
    linefeed: &str,
    primary: &Edit,
    secondary: &[RangeEdit],
) -> Result<Vec<Range<usize>>, Abort> {
    let windows = std::iter::once(edit_window(row, linefeed, primary))
        .chain(secondary.iter().map(range_window))
        .collect::<Vec<_>>();
    merge_row_windows(&windows, secondary.len() + 1, line_count)
}
