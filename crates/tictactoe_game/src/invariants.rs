//! Invariants that every accepted move must preserve.
//!
//! Each invariant is checked against a [`Transition`] (state before and
//! after one move). They are asserted in debug builds and testable on their
//! own.

pub mod alternating_turn;
pub mod monotonic_board;
pub mod winner_consistent;

pub use alternating_turn::AlternatingTurnInvariant;
pub use monotonic_board::MonotonicBoardInvariant;
pub use winner_consistent::WinnerConsistentInvariant;

use crate::game::GameState;
use derive_new::new;

/// One accepted move: the state before and after it.
#[derive(Debug, Clone, Copy, new)]
pub struct Transition<'a> {
    /// State before the move.
    pub before: &'a GameState,
    /// State after the move.
    pub after: &'a GameState,
}

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn collect(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        collect(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        collect(violations)
    }
}

/// All game invariants as a composable set.
pub type TicTacToeInvariants = (
    MonotonicBoardInvariant,
    AlternatingTurnInvariant,
    WinnerConsistentInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameInit, GameStatus};
    use crate::position::Position;
    use crate::types::{Identity, Player, PublicKey, Square};

    fn fresh() -> GameState {
        let key = PublicKey::from_bytes([0; 32]);
        GameState::new(GameInit::new(
            Identity::new("alice"),
            Identity::new("bob"),
            key,
            key,
            1,
        ))
    }

    #[test]
    fn test_invariant_set_holds_for_legal_move() {
        let before = fresh();
        let mut after = before.clone();
        after.board.set(Position::Center, Square::Occupied(Player::One));
        after.turn = Player::Two;

        assert!(TicTacToeInvariants::check_all(&Transition::new(&before, &after)).is_ok());
    }

    #[test]
    fn test_invariant_set_reports_every_violation() {
        let before = fresh();
        let mut after = before.clone();
        // Two marks at once, turn not flipped, winner without a win
        after.board.set(Position::Center, Square::Occupied(Player::One));
        after.board.set(Position::TopLeft, Square::Occupied(Player::One));
        after.winner = Some(Identity::new("alice"));

        let violations = TicTacToeInvariants::check_all(&Transition::new(&before, &after))
            .unwrap_err();
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_two_invariants_as_set() {
        let before = fresh();
        let mut after = before.clone();
        after.board.set(Position::Center, Square::Occupied(Player::One));
        after.turn = Player::Two;
        after.status = GameStatus::InProgress;

        type TwoInvariants = (MonotonicBoardInvariant, AlternatingTurnInvariant);
        assert!(TwoInvariants::check_all(&Transition::new(&before, &after)).is_ok());
    }
}
