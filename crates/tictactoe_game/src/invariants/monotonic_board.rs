//! Write-once board: exactly one new mark per move, nothing overwritten.

use super::{Invariant, Transition};
use crate::types::Square;
use tracing::{instrument, warn};

/// Every occupied square stays as it was, and exactly one empty square
/// becomes occupied.
pub struct MonotonicBoardInvariant;

impl<'a> Invariant<Transition<'a>> for MonotonicBoardInvariant {
    #[instrument(skip(state))]
    fn holds(state: &Transition<'a>) -> bool {
        let before = state.before.board().squares();
        let after = state.after.board().squares();

        let mut placed = 0;
        for (old, new) in before.iter().zip(after.iter()) {
            match (old, new) {
                (Square::Empty, Square::Occupied(_)) => placed += 1,
                (old, new) if old != new => {
                    warn!(?old, ?new, "Occupied square was rewritten");
                    return false;
                }
                _ => {}
            }
        }

        if placed != 1 {
            warn!(placed, "Move did not place exactly one mark");
        }
        placed == 1
    }

    fn description() -> &'static str {
        "Board is write-once with exactly one mark per move"
    }
}
