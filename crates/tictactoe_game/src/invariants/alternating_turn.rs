//! Strict alternation, starting with player one.

use super::{Invariant, Transition};
use crate::types::Player;
use tracing::{instrument, warn};

/// Player one has placed the same number of marks as player two, or one
/// more. While the game runs, the turn belongs to whoever is behind.
pub struct AlternatingTurnInvariant;

impl<'a> Invariant<Transition<'a>> for AlternatingTurnInvariant {
    #[instrument(skip(state))]
    fn holds(state: &Transition<'a>) -> bool {
        let after = state.after;
        let ones = after.board().count(Player::One);
        let twos = after.board().count(Player::Two);

        if ones != twos && ones != twos + 1 {
            warn!(ones, twos, "Mark counts out of balance");
            return false;
        }

        if after.is_finished() {
            return true;
        }

        let expected = if ones == twos { Player::One } else { Player::Two };
        if *after.turn() != expected {
            warn!(turn = ?after.turn(), ?expected, "Turn did not alternate");
            return false;
        }
        true
    }

    fn description() -> &'static str {
        "Players alternate, starting with player one"
    }
}
