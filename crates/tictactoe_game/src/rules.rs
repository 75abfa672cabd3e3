//! Board engine: pure functions over the 3x3 grid.
//!
//! Rules are separated from game storage so the state machine can run them
//! against a scratch copy and commit only on success.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use crate::error::{GameError, GameErrorKind};
use crate::position::Position;
use crate::types::{Board, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Empty squares remain and nobody has three in a row.
    Ongoing,
    /// The mark holds a complete line.
    Winner(Mark),
    /// Board is full with no complete line.
    Draw,
}

/// Places `mark` at the wire-level `position`, returning the new board.
///
/// # Errors
///
/// Returns an illegal-move error if `position` is outside 0-8 or the square
/// is already occupied. The input board is never modified.
#[instrument(skip(board))]
pub fn apply_move(board: &Board, position: u64, mark: Mark) -> Result<Board, GameError> {
    let pos = Position::from_index(position)
        .ok_or_else(|| GameError::new(GameErrorKind::OutOfBounds(position)))?;

    if !board.is_empty(pos) {
        return Err(GameError::new(GameErrorKind::SquareOccupied(pos)));
    }

    let mut next = board.clone();
    next.set(pos, Square::Occupied(mark));
    debug!(board = %next.encode(), "Mark placed");
    Ok(next)
}

/// Evaluates the board. A winning line takes priority over a full board.
#[instrument(skip(board), fields(board = %board.encode()))]
pub fn check_outcome(board: &Board) -> Outcome {
    if let Some(winner) = check_winner(board) {
        Outcome::Winner(winner)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}
