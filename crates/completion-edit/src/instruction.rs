//! Instruction synthesis.
//!
//! Every [`Edit`] variant is lowered into an [`EditInstruction`]: a begin/end range in
//! canonical UTF-8 byte columns, the replacement lines, and where the cursor ends up.
//!
//! Coordinates are relative to the buffer *before* any instruction of the batch is applied;
//! [`shift_instructions`](crate::shift_instructions) rewrites them for sequential application.

use crate::lines::LineCache;
use crate::settings::{CompleteOptions, EditSettings};
use crate::text;
use crate::tokenize::Tokenizer;
use crate::trans::{contextual_from_plain, indent_adjusted};
use crate::{ContextualEdit, Edit, EditContext, Position, RangeEdit};

/// A concrete replacement, ready to be applied to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditInstruction {
    /// Whether this is the completion's primary edit.
    pub primary: bool,
    /// Range start (UTF-8 byte column).
    pub begin: Position,
    /// Range end (UTF-8 byte column, exclusive).
    pub end: Position,
    /// Rows the cursor moves. For the primary instruction this is relative to the
    /// transaction's cursor row; for secondary instructions it is the number of rows the
    /// instruction adds to the buffer.
    pub cursor_row_delta: isize,
    /// Cursor column (UTF-8 bytes) after applying the primary instruction. `None` for
    /// secondary instructions.
    pub cursor_col: Option<usize>,
    /// The cursor lands on `begin.row`, so column shifts on that row also move the cursor.
    pub cursor_on_begin_row: bool,
    /// Replacement lines (at least one).
    pub new_lines: Vec<String>,
}

impl EditInstruction {
    /// Net number of rows applying this instruction adds (negative if it removes rows).
    pub fn row_displacement(&self) -> isize {
        let inserted = self.new_lines.len().max(1) as isize - 1;
        let removed = self.end.row as isize - self.begin.row as isize;
        inserted - removed
    }

    /// UTF-8 length of the last replacement line.
    pub fn last_line_len(&self) -> usize {
        self.new_lines.last().map(String::len).unwrap_or(0)
    }
}

/// Lowers edits into [`EditInstruction`]s against a fetched [`LineCache`].
pub struct Synthesizer<'a> {
    ctx: &'a EditContext,
    settings: &'a EditSettings,
    tokenizer: &'a dyn Tokenizer,
    lines: &'a LineCache,
    adjust_indent: bool,
}

impl<'a> Synthesizer<'a> {
    /// Create a synthesizer.
    pub fn new(
        ctx: &'a EditContext,
        settings: &'a EditSettings,
        tokenizer: &'a dyn Tokenizer,
        lines: &'a LineCache,
        adjust_indent: bool,
    ) -> Self {
        Self {
            ctx,
            settings,
            tokenizer,
            lines,
            adjust_indent,
        }
    }

    /// Synthesize the primary edit followed by every secondary edit.
    ///
    /// The result holds exactly one primary instruction.
    pub fn instructions(&self, primary: &Edit, secondary: &[RangeEdit]) -> Vec<EditInstruction> {
        std::iter::once(self.primary(primary))
            .chain(secondary.iter().map(|edit| self.range(edit, false)))
            .collect()
    }

    /// Synthesize the primary edit.
    pub fn primary(&self, edit: &Edit) -> EditInstruction {
        match edit {
            Edit::Plain(edit) => self.plain(&edit.new_text, &self.settings.completion),
            Edit::Snippet(edit) => self.plain(&edit.new_text, &self.settings.completion),
            Edit::Contextual(edit) => self.contextual(edit),
            Edit::Range(edit) => self.range(edit, true),
            Edit::SnippetRange(edit) => self.range(&edit.range, true),
        }
    }

    fn row_text(&self, row: usize) -> &str {
        match self.lines.get(row) {
            Some(line) => line.text(),
            None if row == self.ctx.row => &self.ctx.line,
            None => "",
        }
    }

    fn split_indented(&self, text: &str, line_before: &str, adjust: bool) -> Vec<String> {
        let lines = self.ctx.split_lines(text);
        if adjust {
            indent_adjusted(&self.settings.indent, line_before, &lines)
        } else {
            lines.into_iter().map(str::to_string).collect()
        }
    }

    fn plain(&self, new_text: &str, complete: &CompleteOptions) -> EditInstruction {
        let edit = contextual_from_plain(&self.settings.match_options, complete, self.ctx, new_text);
        self.contextual(&edit)
    }

    fn contextual(&self, edit: &ContextualEdit) -> EditInstruction {
        let (row, col) = (self.ctx.row, self.ctx.col);
        let old_prefix = self.ctx.split_lines(&edit.old_prefix);
        let old_suffix = self.ctx.split_lines(&edit.old_suffix);

        let r1 = row.saturating_sub(old_prefix.len() - 1);
        let r2 = row + (old_suffix.len() - 1);

        let first_prefix = old_prefix.first().map_or(0, |line| line.len());
        let c1 = if old_prefix.len() > 1 {
            self.row_text(r1).len().saturating_sub(first_prefix)
        } else {
            col.saturating_sub(first_prefix)
        };
        let c2 = match old_suffix.as_slice() {
            [only] => col + only.len(),
            [.., last] => last.len(),
            [] => col,
        };

        let line_before = text::before(self.row_text(r1), c1);
        let new_lines = self.split_indented(&edit.new_text, line_before, self.adjust_indent);
        let new_prefix = self.split_indented(&edit.new_prefix, line_before, self.adjust_indent);

        let cursor_col = match new_prefix.as_slice() {
            [only] => c1 + only.len(),
            [.., last] => last.len(),
            [] => c1,
        };

        EditInstruction {
            primary: true,
            begin: Position::new(r1, c1),
            end: Position::new(r2, c2),
            cursor_row_delta: new_prefix.len() as isize - old_prefix.len() as isize,
            cursor_col: Some(cursor_col),
            cursor_on_begin_row: new_prefix.len() <= 1,
            new_lines,
        }
    }

    /// A zero-width primary range edit at the cursor whose text spans several tokens is
    /// re-planned as a plain insertion that may only swallow a single overlapping character
    /// after the cursor, so it does not clobber adjacent text.
    fn promotes_to_plain(&self, edit: &RangeEdit, primary: bool) -> bool {
        primary
            && !edit.is_expanded()
            && edit.begin == edit.end
            && edit.begin.row == self.ctx.row
            && self.lines.line(edit.begin.row).to_utf8_col(edit.begin.col, edit.encoding) == self.ctx.col
            && self.tokenizer.tokens(&edit.new_text).len() > 1
    }

    fn range(&self, edit: &RangeEdit, primary: bool) -> EditInstruction {
        if self.promotes_to_plain(edit, primary) {
            let complete = CompleteOptions {
                replace_suffix_threshold: 1,
                ..self.settings.completion
            };
            return self.plain(&edit.new_text, &complete);
        }

        let (begin, end) = if edit.begin <= edit.end {
            (edit.begin, edit.end)
        } else {
            (edit.end, edit.begin)
        };
        let (r1, r2) = (begin.row, end.row);

        // Declared ranges come from external sources; clamp them to the rows we fetched.
        let c1 = self.lines.line(r1).to_utf8_col(begin.col, edit.encoding);
        let c2 = self.lines.line(r2).to_utf8_col(end.col, edit.encoding);

        let adjust = primary && self.adjust_indent;
        let line_before = text::before(self.row_text(r1), c1);
        let new_lines = self.split_indented(&edit.new_text, line_before, adjust);

        if !primary {
            let removed = r2 as isize - r1 as isize;
            return EditInstruction {
                primary,
                begin: Position::new(r1, c1),
                end: Position::new(r2, c2),
                cursor_row_delta: new_lines.len() as isize - 1 - removed,
                cursor_col: None,
                cursor_on_begin_row: false,
                new_lines,
            };
        }

        let lines_before = match &edit.new_prefix {
            Some(prefix) => self.split_indented(prefix, line_before, adjust),
            None => new_lines.clone(),
        };
        let cursor_col = match lines_before.as_slice() {
            [only] => c1 + only.len(),
            [.., last] => last.len(),
            [] => c1,
        };

        EditInstruction {
            primary,
            begin: Position::new(r1, c1),
            end: Position::new(r2, c2),
            cursor_row_delta: (r1 as isize - self.ctx.row as isize)
                + (lines_before.len() as isize - 1),
            cursor_col: Some(cursor_col),
            cursor_on_begin_row: lines_before.len() <= 1,
            new_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::WordTokenizer;
    use crate::{Encoding, PlainEdit};
    use pretty_assertions::assert_eq;

    struct Fixture {
        ctx: EditContext,
        settings: EditSettings,
        tokenizer: WordTokenizer,
        lines: LineCache,
    }

    impl Fixture {
        fn new(rows: &[&str], row: usize, col: usize) -> Self {
            let mut lines = LineCache::new();
            for (idx, text) in rows.iter().enumerate() {
                lines.insert(idx, *text);
            }
            Self {
                ctx: EditContext::new(row, col, rows[row], rows.len()),
                settings: EditSettings::default(),
                tokenizer: WordTokenizer::default(),
                lines,
            }
        }

        fn synth(&self, adjust_indent: bool) -> Synthesizer<'_> {
            Synthesizer::new(
                &self.ctx,
                &self.settings,
                &self.tokenizer,
                &self.lines,
                adjust_indent,
            )
        }
    }

    #[test]
    fn test_plain_edit_inserts_at_cursor() {
        let rows = ["", "", "", "", "", "          ", ""];
        let fx = Fixture::new(&rows, 5, 10);
        let inst = fx.synth(true).primary(&Edit::plain("foo"));
        assert_eq!(inst.begin, Position::new(5, 10));
        assert_eq!(inst.end, Position::new(5, 10));
        assert_eq!(inst.new_lines, vec!["foo"]);
        assert_eq!(inst.cursor_row_delta, 0);
        assert_eq!(inst.cursor_col, Some(13));
        assert!(inst.primary);
    }

    #[test]
    fn test_plain_edit_replaces_typed_word() {
        let fx = Fixture::new(&["let x = fo;"], 0, 10);
        let inst = fx.synth(true).primary(&Edit::plain("foobar"));
        assert_eq!(inst.begin, Position::new(0, 8));
        assert_eq!(inst.end, Position::new(0, 10));
        assert_eq!(inst.cursor_col, Some(14));
    }

    #[test]
    fn test_contextual_multiline_prefix() {
        let fx = Fixture::new(&["fn a() {", "    b"], 1, 5);
        let edit = Edit::Contextual(ContextualEdit {
            new_text: "{}".into(),
            old_prefix: "{\n    b".into(),
            old_suffix: String::new(),
            new_prefix: "{".into(),
        });
        let inst = fx.synth(false).primary(&edit);
        assert_eq!(inst.begin, Position::new(0, 7));
        assert_eq!(inst.end, Position::new(1, 5));
        assert_eq!(inst.cursor_row_delta, -1);
        assert_eq!(inst.cursor_col, Some(8));
        assert!(inst.cursor_on_begin_row);
    }

    #[test]
    fn test_multiline_plain_edit_is_indented() {
        let fx = Fixture::new(&["    "], 0, 4);
        let inst = fx.synth(true).primary(&Edit::plain("if x {\n\ty\n}"));
        assert_eq!(inst.new_lines, vec!["if x {", "        y", "    }"]);
        assert_eq!(inst.cursor_row_delta, 2);
        assert_eq!(inst.cursor_col, Some(5));
        assert!(!inst.cursor_on_begin_row);
    }

    #[test]
    fn test_utf16_range_edit_is_translated() {
        // "a👋b": replace 👋 (utf-16 1..3) with "x"
        let fx = Fixture::new(&["a👋b"], 0, 5);
        let edit = RangeEdit::new(
            Position::new(0, 1),
            Position::new(0, 3),
            Encoding::Utf16,
            "x",
        );
        let inst = fx.synth(true).primary(&Edit::Range(edit));
        assert_eq!(inst.begin, Position::new(0, 1));
        assert_eq!(inst.end, Position::new(0, 5));
        assert_eq!(inst.cursor_col, Some(2));
    }

    #[test]
    fn test_range_columns_are_clamped() {
        let fx = Fixture::new(&["abc"], 0, 3);
        let edit = RangeEdit::new(Position::new(0, 1), Position::new(0, 40), Encoding::Utf8, "Z");
        let inst = fx.synth(true).primary(&Edit::Range(edit));
        assert_eq!(inst.end, Position::new(0, 3));
    }

    #[test]
    fn test_secondary_range_has_no_cursor() {
        let fx = Fixture::new(&["use a;", "", "fn main() {}"], 2, 0);
        let secondary = RangeEdit::new(
            Position::new(0, 0),
            Position::new(0, 0),
            Encoding::Utf16,
            "use b;\n",
        );
        let insts = fx.synth(true).instructions(&Edit::plain("x"), &[secondary]);
        assert_eq!(insts.len(), 2);
        assert_eq!(insts.iter().filter(|inst| inst.primary).count(), 1);
        let secondary = &insts[1];
        assert!(!secondary.primary);
        assert_eq!(secondary.cursor_col, None);
        assert_eq!(secondary.new_lines, vec!["use b;", ""]);
        assert_eq!(secondary.cursor_row_delta, 1);
    }

    #[test]
    fn test_empty_multi_token_range_is_promoted() {
        // Zero-width LSP edit inserting `foo()` right before an existing `)`.
        let fx = Fixture::new(&["bar()"], 0, 4);
        let edit = RangeEdit::new(Position::new(0, 4), Position::new(0, 4), Encoding::Utf8, "foo()");
        let inst = fx.synth(true).primary(&Edit::Range(edit));
        // The single overlapping `)` is replaced instead of duplicated.
        assert_eq!(inst.begin, Position::new(0, 4));
        assert_eq!(inst.end, Position::new(0, 5));
        assert_eq!(inst.new_lines, vec!["foo()"]);
    }

    #[test]
    fn test_empty_range_away_from_cursor_is_not_promoted() {
        let fx = Fixture::new(&["xyz", "bar"], 1, 3);
        let edit = RangeEdit::new(Position::new(0, 0), Position::new(0, 0), Encoding::Utf8, "foo()");
        let inst = fx.synth(true).primary(&Edit::Range(edit));
        assert_eq!(inst.begin, Position::new(0, 0));
        assert_eq!(inst.end, Position::new(0, 0));
        assert_eq!(inst.new_lines, vec!["foo()"]);
        assert_eq!(inst.cursor_row_delta, -1);
        assert_eq!(inst.cursor_col, Some(5));
    }

    #[test]
    fn test_single_token_range_is_not_promoted() {
        let fx = Fixture::new(&["bar()"], 0, 4);
        let edit = RangeEdit::new(Position::new(0, 4), Position::new(0, 4), Encoding::Utf8, "foo");
        let inst = fx.synth(true).primary(&Edit::Range(edit));
        assert_eq!(inst.begin, Position::new(0, 4));
        assert_eq!(inst.end, Position::new(0, 4));
    }

    #[test]
    fn test_expanded_range_uses_new_prefix_for_cursor() {
        let fx = Fixture::new(&["pri"], 0, 3);
        let mut edit = RangeEdit::new(Position::new(0, 0), Position::new(0, 3), Encoding::Utf8, "println!()");
        edit.new_prefix = Some("println!(".into());
        let inst = fx.synth(false).primary(&Edit::Range(edit));
        assert_eq!(inst.cursor_col, Some(9));
        assert_eq!(inst.cursor_row_delta, 0);
    }

    #[test]
    fn test_snippet_without_expansion_is_literal() {
        let fx = Fixture::new(&[""], 0, 0);
        let inst = fx.synth(true).primary(&Edit::Plain(PlainEdit {
            new_text: "a".into(),
        }));
        assert_eq!(inst.new_lines, vec!["a"]);
    }
}
