//! Status, winner, and board agree with each other.

use super::{Invariant, Transition};
use crate::game::GameStatus;
use crate::rules::{self, Outcome};
use tracing::{instrument, warn};

/// `winner` is set iff the status is `HasWinner`, names the owner of the
/// winning line, and the status matches what the board says.
pub struct WinnerConsistentInvariant;

impl<'a> Invariant<Transition<'a>> for WinnerConsistentInvariant {
    #[instrument(skip(state))]
    fn holds(state: &Transition<'a>) -> bool {
        let after = state.after;
        let outcome = rules::check_outcome(after.board());
        let consistent = match (outcome, after.status(), after.winner()) {
            (Outcome::Winner(mark), GameStatus::HasWinner, Some(winner)) => {
                after.identity_of(mark) == winner
            }
            (Outcome::Draw, GameStatus::Draw, None) => true,
            (Outcome::Ongoing, GameStatus::InProgress, None) => true,
            _ => false,
        };

        if !consistent {
            warn!(
                status = ?after.status(),
                winner = ?after.winner(),
                "Status disagrees with board"
            );
        }
        consistent
    }

    fn description() -> &'static str {
        "Winner is recorded iff the board holds a winning line"
    }
}
