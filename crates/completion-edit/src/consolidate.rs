//! Conflict resolution between overlapping instructions.

use crate::EditInstruction;
use crate::Position;
use std::collections::VecDeque;

/// Reduce `instructions` to a non-overlapping sequence ordered by `(begin, end)`.
///
/// Sweeps the sorted instructions with a stack. An instruction starting at or after the end of
/// the last kept one is kept. An overlapping primary instruction evicts every kept secondary
/// instruction that ends after its begin; an overlapping secondary instruction is dropped.
/// The primary instruction therefore always survives.
pub fn consolidate(mut instructions: Vec<EditInstruction>) -> Vec<EditInstruction> {
    instructions.sort_by(|a, b| (a.begin, a.end).cmp(&(b.begin, b.end)));

    let mut pivot = Position::new(0, 0);
    let mut stack: Vec<EditInstruction> = Vec::with_capacity(instructions.len());

    for inst in instructions {
        if inst.begin >= pivot {
            pivot = inst.end;
            stack.push(inst);
        } else if inst.primary {
            let mut restored = VecDeque::new();
            while let Some(conflicting) = stack.pop() {
                if conflicting.end <= inst.begin {
                    restored.push_front(conflicting);
                    break;
                }
                tracing::trace!(
                    target: "edit.consolidate",
                    begin = ?conflicting.begin,
                    end = ?conflicting.end,
                    "secondary_evicted_by_primary"
                );
            }
            stack.extend(restored);
            pivot = inst.end;
            stack.push(inst);
        } else {
            tracing::trace!(
                target: "edit.consolidate",
                begin = ?inst.begin,
                end = ?inst.end,
                "secondary_dropped"
            );
        }
    }

    stack
}
