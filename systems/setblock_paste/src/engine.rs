//! Cell-by-cell diff of a single box against the destination.

use remote_paste_core::{BlockBox, CellPos, DestinationWorld, Session, SourceWorld};

use crate::CommandEmitter;

/// Per-step allowance of transmitted commands.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StepBudget {
    limit: u32,
    spent: u32,
}

impl StepBudget {
    pub(crate) fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            spent: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.spent = 0;
    }

    fn record(&mut self) {
        self.spent += 1;
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.spent >= self.limit
    }

    pub(crate) fn spent(&self) -> u32 {
        self.spent
    }
}

/// Everything a box scan reads from or writes to.
pub(crate) struct ScanContext<'a, S: ?Sized, D: ?Sized, R: ?Sized> {
    pub(crate) source: &'a S,
    pub(crate) destination: &'a D,
    pub(crate) session: &'a mut R,
    pub(crate) emitter: &'a mut CommandEmitter,
    pub(crate) budget: &'a mut StepBudget,
}

/// Scans the box from its first cell, returning whether it was fully covered.
///
/// Cells are visited z outermost, then x, then y. Every mismatch that can be
/// named is sent. When the budget runs out the scan stops and the box counts
/// as covered only if the cell that spent the last command was its final cell.
pub(crate) fn scan_box<S, D, R>(block_box: BlockBox, ctx: ScanContext<'_, S, D, R>) -> bool
where
    S: SourceWorld + ?Sized,
    D: DestinationWorld + ?Sized,
    R: Session + ?Sized,
{
    let (min, max) = (block_box.min(), block_box.max());

    for z in min.z()..=max.z() {
        for x in min.x()..=max.x() {
            for y in min.y()..=max.y() {
                let pos = CellPos::new(x, y, z);
                let expected = ctx.source.stored_state(pos);

                if ctx.destination.effective_state(pos) == expected {
                    continue;
                }

                if !ctx.emitter.emit(ctx.source, &mut *ctx.session, pos, expected) {
                    continue;
                }

                ctx.budget.record();
                if ctx.budget.exhausted() {
                    return pos == max;
                }
            }
        }
    }

    true
}
