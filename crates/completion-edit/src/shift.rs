//! Coordinate shifting for sequential application.
//!
//! Instructions are synthesized against one snapshot of the buffer, but they are written one
//! at a time, top to bottom. Each write moves the text after it, so every later instruction
//! has to be offset by the rows and columns the earlier ones added or removed.

use crate::{EditInstruction, Mark, Position};
use std::collections::HashMap;

/// Rows inserted above the primary instruction, used to move snippet marks.
///
/// Column displacement on the primary's own row is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkShift {
    /// Rows to add to every mark.
    pub row_delta: isize,
}

fn offset(value: usize, by: isize) -> usize {
    value.checked_add_signed(by).unwrap_or(0)
}

/// Rewrite consolidated, position-ordered `instructions` for sequential application.
///
/// Returns the shifted instructions plus the [`MarkShift`] in effect when the primary
/// instruction was reached.
pub fn shift_instructions(instructions: Vec<EditInstruction>) -> (Vec<EditInstruction>, MarkShift) {
    let mut row_shift: isize = 0;
    // Column displacement of text on an original row, keyed by that row.
    let mut col_shift: HashMap<usize, isize> = HashMap::new();
    let mut mark_shift = MarkShift::default();
    let mut shifted = Vec::with_capacity(instructions.len());

    for inst in instructions {
        let (r1, c1) = (inst.begin.row, inst.begin.col);
        let (r2, c2) = (inst.end.row, inst.end.col);
        let s1 = col_shift.get(&r1).copied().unwrap_or(0);
        let s2 = col_shift.get(&r2).copied().unwrap_or(0);

        if inst.primary {
            mark_shift = MarkShift {
                row_delta: row_shift,
            };
        }

        // Text after `c2` on row `r2` ends up after the last inserted line; when only one
        // line is inserted it also keeps whatever preceded `c1`.
        let anchor = if inst.new_lines.len() <= 1 {
            c1 as isize + s1
        } else {
            0
        };
        col_shift.insert(r2, anchor + inst.last_line_len() as isize - c2 as isize);

        let cursor_col = match inst.cursor_col {
            Some(col) if inst.cursor_on_begin_row => Some(offset(col, s1)),
            other => other,
        };
        let next_row_shift = row_shift + inst.row_displacement();

        shifted.push(EditInstruction {
            begin: Position::new(offset(r1, row_shift), offset(c1, s1)),
            end: Position::new(offset(r2, row_shift), offset(c2, s2)),
            cursor_col,
            ..inst
        });
        row_shift = next_row_shift;
    }

    (shifted, mark_shift)
}

/// Final cursor position after applying `instructions`, starting from cursor row `row`.
///
/// # Panics
///
/// Panics if no instruction is primary; every transaction carries exactly one primary edit.
pub fn resolve_cursor(row: usize, instructions: &[EditInstruction]) -> Position {
    let mut row = row as isize;
    for inst in instructions {
        row += inst.cursor_row_delta;
        if inst.primary {
            let col = inst.cursor_col.unwrap_or_else(|| {
                panic!("primary instruction without a cursor column: {inst:?}")
            });
            return Position::new(row.max(0) as usize, col);
        }
    }
    panic!("instruction batch has no primary instruction")
}

/// Move `marks` down by `shift.row_delta` rows. Columns are left untouched.
pub fn shift_marks(shift: MarkShift, marks: &[Mark]) -> Vec<Mark> {
    marks
        .iter()
        .map(|mark| Mark {
            begin: Position::new(offset(mark.begin.row, shift.row_delta), mark.begin.col),
            end: Position::new(offset(mark.end.row, shift.row_delta), mark.end.col),
            ..mark.clone()
        })
        .collect()
}
