//! Text adjustments applied while synthesizing instructions.
//!
//! - [`contextual_from_plain`] decides how much of the text around the cursor a plain
//!   insertion replaces.
//! - [`indent_adjusted`] re-indents multi-line replacement text to the line it lands on.

use crate::settings::{CompleteOptions, IndentOptions, MatchOptions};
use crate::text;
use crate::{ContextualEdit, EditContext};

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Trailing run of word characters in `line_before`.
fn word_before<'a>(match_options: &MatchOptions, line_before: &'a str) -> &'a str {
    let start = line_before
        .char_indices()
        .rev()
        .take_while(|(_, c)| match_options.is_word_char(*c))
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(line_before.len());
    &line_before[start..]
}

/// Longest suffix of `line_before` (not crossing whitespace) that starts `new_text`.
fn prefix_overlap<'a>(line_before: &'a str, new_text: &str) -> &'a str {
    let floor = line_before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);
    line_before[floor..]
        .char_indices()
        .map(|(idx, _)| &line_before[floor + idx..])
        .find(|candidate| new_text.starts_with(candidate))
        .unwrap_or("")
}

/// Longest prefix of `line_after` (not crossing whitespace) that ends `new_text`.
fn suffix_overlap<'a>(line_after: &'a str, new_text: &str) -> &'a str {
    let ceil = line_after
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, _)| idx)
        .unwrap_or(line_after.len());
    let head = &line_after[..ceil];
    head.char_indices()
        .map(|(idx, c)| &head[..idx + c.len_utf8()])
        .rev()
        .find(|candidate| new_text.ends_with(candidate))
        .unwrap_or("")
}

/// Turn a plain insertion of `new_text` into a contextual edit around the cursor.
///
/// The word being typed is always replaced. A longer literal overlap between the text before
/// the cursor and the start of `new_text` replaces more once it reaches
/// `replace_prefix_threshold` chars. The text after the cursor is only replaced when it
/// overlaps the end of `new_text` by at least `replace_suffix_threshold` chars.
pub fn contextual_from_plain(
    match_options: &MatchOptions,
    complete: &CompleteOptions,
    ctx: &EditContext,
    new_text: &str,
) -> ContextualEdit {
    let line_before = ctx.line_before();
    let line_after = ctx.line_after();

    let word = word_before(match_options, line_before);
    let overlap = prefix_overlap(line_before, new_text);
    let old_prefix = if overlap.len() > word.len()
        && char_len(overlap) >= complete.replace_prefix_threshold
    {
        overlap
    } else {
        word
    };

    let overlap = suffix_overlap(line_after, new_text);
    let old_suffix = if !overlap.is_empty() && char_len(overlap) >= complete.replace_suffix_threshold
    {
        overlap
    } else {
        ""
    };

    ContextualEdit {
        new_text: new_text.to_string(),
        old_prefix: old_prefix.to_string(),
        old_suffix: old_suffix.to_string(),
        new_prefix: new_text.to_string(),
    }
}

fn normalize_indent(indent: &IndentOptions, line: &str) -> String {
    let leading = text::leading_whitespace(line);
    let rest = &line[leading.len()..];
    let tab_size = indent.tab_size.max(1);

    let mut width = 0;
    for c in leading.chars() {
        width += if c == '\t' { tab_size - width % tab_size } else { 1 };
    }

    let normalized = if indent.expand_tab {
        " ".repeat(width)
    } else {
        format!("{}{}", "\t".repeat(width / tab_size), " ".repeat(width % tab_size))
    };
    normalized + rest
}

/// Re-indent `lines` for insertion after `line_before`.
///
/// The first line is kept as-is. Every later non-empty line has its leading whitespace
/// normalized to the tab policy and is prefixed with the indentation of `line_before`.
pub fn indent_adjusted(indent: &IndentOptions, line_before: &str, lines: &[&str]) -> Vec<String> {
    let base = text::leading_whitespace(line_before);
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{base}{}", normalize_indent(indent, line))
            }
        })
        .collect()
}
