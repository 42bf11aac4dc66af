//! Edit transactions.
//!
//! An [`EditTransaction`] turns one accepted [`Completion`] into buffer writes:
//!
//! 1. expand snippets into a concrete edit plus placeholder marks
//! 2. resolve the row windows the edits need and fetch them into a [`LineCache`]
//! 3. synthesize one instruction per edit and drop conflicting secondary ones
//! 4. shift the instructions for sequential application and write them
//! 5. place the cursor and persist the (shifted) marks
//!
//! Everything up to step 4 is pure; any failure there aborts the transaction before the
//! buffer is touched.

use crate::buffer::{Buffer, MarkStore};
use crate::consolidate::consolidate;
use crate::error::Abort;
use crate::instruction::{EditInstruction, Synthesizer};
use crate::lines::{CachedLine, LineCache};
use crate::rows::resolve_row_windows;
use crate::settings::EditSettings;
use crate::shift::{resolve_cursor, shift_instructions, shift_marks};
use crate::snippet::{Expansion, PlaceholderExpander, SnippetExpander, TextTransforms};
use crate::text;
use crate::tokenize::{Tokenizer, WordTokenizer};
use crate::{Completion, ContextualEdit, Edit, EditContext, Mark, MarkNamespace, Position, RangeEdit};

/// Consolidated instructions for a completion, before any buffer write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    /// Non-overlapping instructions ordered by position, in original coordinates.
    pub instructions: Vec<EditInstruction>,
    /// Snippet placeholder marks, in original coordinates.
    pub marks: Vec<Mark>,
    /// Snippet placeholder defaults.
    pub text_transforms: TextTransforms,
}

/// Outcome of [`EditTransaction::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCompletion {
    /// Where the cursor was placed.
    pub cursor: Position,
    /// Marks written to the mark store.
    pub marks: Vec<Mark>,
    /// Snippet placeholder defaults.
    pub text_transforms: TextTransforms,
    /// Shifted instructions whose write failed.
    pub failed: Vec<EditInstruction>,
    /// One-line summary of the persisted marks, e.g. `[a] [b\n]`.
    pub marks_message: Option<String>,
}

/// Applies completions to a buffer.
pub struct EditTransaction<'a> {
    buffer: &'a mut dyn Buffer,
    marks: &'a mut dyn MarkStore,
    namespace: MarkNamespace,
    settings: &'a EditSettings,
    tokenizer: Box<dyn Tokenizer + 'a>,
    expander: Box<dyn SnippetExpander + 'a>,
}

impl<'a> EditTransaction<'a> {
    /// Create a transaction writing to `buffer` and storing marks under `namespace`.
    pub fn new(
        buffer: &'a mut dyn Buffer,
        marks: &'a mut dyn MarkStore,
        namespace: MarkNamespace,
        settings: &'a EditSettings,
    ) -> Self {
        Self {
            buffer,
            marks,
            namespace,
            settings,
            tokenizer: Box::new(WordTokenizer::new(settings.match_options.clone())),
            expander: Box::new(PlaceholderExpander),
        }
    }

    /// Use a different tokenizer for range-edit promotion.
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'a) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Use a different snippet expander.
    pub fn with_expander(mut self, expander: impl SnippetExpander + 'a) -> Self {
        self.expander = Box::new(expander);
        self
    }

    /// Plan `completion` without touching the buffer.
    ///
    /// In `preview` mode secondary edits are ignored.
    pub fn plan(&self, ctx: &EditContext, completion: &Completion, preview: bool) -> Result<EditPlan, Abort> {
        let secondary: &[RangeEdit] = if preview { &[] } else { &completion.secondary };
        self.prepare(ctx, completion, secondary).inspect_err(|err| log_abort(ctx, err))
    }

    /// Instructions for `secondary` edits alone, consolidated against an empty insertion at
    /// the cursor.
    pub fn secondary_instructions(
        &self,
        ctx: &EditContext,
        secondary: &[RangeEdit],
    ) -> Result<Vec<EditInstruction>, Abort> {
        let completion = Completion::new(Edit::Contextual(ContextualEdit::default()))
            .with_adjust_indent(false);
        let plan = self
            .prepare(ctx, &completion, secondary)
            .inspect_err(|err| log_abort(ctx, err))?;
        Ok(plan
            .instructions
            .into_iter()
            .filter(|inst| !inst.primary)
            .collect())
    }

    /// Apply `completion` to the buffer.
    ///
    /// Returns `Err` only when the transaction was abandoned before any write. Individual
    /// write failures are logged and reported in [`AppliedCompletion::failed`].
    pub fn apply(&mut self, ctx: &EditContext, completion: &Completion) -> Result<AppliedCompletion, Abort> {
        let plan = self
            .prepare(ctx, completion, &completion.secondary)
            .inspect_err(|err| log_abort(ctx, err))?;

        let (instructions, mark_shift) = shift_instructions(plan.instructions);

        let mut failed = Vec::new();
        for inst in &instructions {
            if let Err(err) = self.buffer.set_text(inst.begin, inst.end, &inst.new_lines) {
                let rows = self
                    .buffer
                    .get_lines(inst.begin.row..inst.end.row + 1)
                    .unwrap_or_default();
                tracing::warn!(
                    target: "edit.transaction",
                    error = %err,
                    instruction = ?inst,
                    rows = ?rows,
                    "set_text_failed"
                );
                failed.push(inst.clone());
            }
        }

        let cursor = resolve_cursor(ctx.row, &instructions);
        if let Err(err) = self.buffer.set_cursor(cursor) {
            tracing::warn!(
                target: "edit.transaction",
                error = %err,
                row = cursor.row,
                col = cursor.col,
                "set_cursor_failed"
            );
        }

        let marks = shift_marks(mark_shift, &plan.marks);
        let marks_message = if marks.is_empty() {
            None
        } else {
            match self.marks.set_marks(self.namespace, marks.clone()) {
                Ok(()) => Some(marks_message(&marks)),
                Err(err) => {
                    tracing::warn!(
                        target: "edit.transaction",
                        error = %err,
                        marks = ?marks,
                        "bad mark locations"
                    );
                    None
                }
            }
        };

        tracing::debug!(
            target: "edit.transaction",
            instructions = ?instructions,
            failed = failed.len(),
            "completion_applied"
        );

        Ok(AppliedCompletion {
            cursor,
            marks,
            text_transforms: plan.text_transforms,
            failed,
            marks_message,
        })
    }

    fn prepare(
        &self,
        ctx: &EditContext,
        completion: &Completion,
        secondary: &[RangeEdit],
    ) -> Result<EditPlan, Abort> {
        let (primary, adjust_indent, expansion) = self.expand(ctx, completion)?;

        let windows = resolve_row_windows(ctx.row, ctx.line_count, &ctx.linefeed, &primary, secondary)?;
        let mut fetched = Vec::with_capacity(windows.len());
        for rows in windows {
            let lines = self.buffer.get_lines(rows.clone())?;
            fetched.push((rows, lines));
        }
        let cache = LineCache::from_rows(fetched);

        let synthesizer = Synthesizer::new(ctx, self.settings, self.tokenizer.as_ref(), &cache, adjust_indent);
        let instructions = synthesizer.instructions(&primary, secondary);
        assert_eq!(
            instructions.iter().filter(|inst| inst.primary).count(),
            1,
            "a completion synthesizes exactly one primary instruction"
        );

        let (marks, text_transforms) = match expansion {
            Some(expansion) => (expansion.marks, expansion.text_transforms),
            None => (Vec::new(), TextTransforms::new()),
        };
        Ok(EditPlan {
            instructions: consolidate(instructions),
            marks,
            text_transforms,
        })
    }

    /// Resolve snippet edits through the expander. Expanded edits are already indented.
    fn expand(&self, ctx: &EditContext, completion: &Completion) -> Result<(Edit, bool, Option<Expansion>), Abort> {
        let expansion = match &completion.primary {
            Edit::Snippet(snippet) => {
                self.expander
                    .expand(ctx, self.settings, snippet, completion.adjust_indent)?
            }
            Edit::SnippetRange(snippet) => {
                let line_before = self.range_line_before(ctx, &snippet.range)?;
                self.expander.expand_ranged(
                    ctx,
                    self.settings,
                    snippet,
                    &line_before,
                    completion.adjust_indent,
                )?
            }
            edit => return Ok((edit.clone(), completion.adjust_indent, None)),
        };
        Ok((expansion.edit.clone(), false, Some(expansion)))
    }

    /// Text of the range's first row before its start column.
    fn range_line_before(&self, ctx: &EditContext, range: &RangeEdit) -> Result<String, Abort> {
        let begin = range.begin.min(range.end);
        let line = if begin.row == ctx.row {
            ctx.line.clone()
        } else {
            self.buffer
                .get_lines(begin.row..begin.row + 1)?
                .into_iter()
                .next()
                .unwrap_or_default()
        };
        let col = CachedLine::new(line.as_str()).to_utf8_col(begin.col, range.encoding);
        Ok(text::before(&line, col).to_string())
    }
}

fn log_abort(ctx: &EditContext, err: &Abort) {
    tracing::warn!(
        target: "edit.transaction",
        error = %err,
        row = ctx.row,
        col = ctx.col,
        line = %ctx.line,
        "transaction_aborted"
    );
}

/// `[text]` per mark with whitespace escaped, space separated.
pub fn marks_message(marks: &[Mark]) -> String {
    marks
        .iter()
        .map(|mark| {
            let escaped: String = mark
                .text
                .chars()
                .map(|c| match c {
                    '\n' => "\\n".to_string(),
                    '\r' => "\\r".to_string(),
                    '\t' => "\\t".to_string(),
                    c => c.to_string(),
                })
                .collect();
            format!("[{escaped}]")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
