//! Error types for move admission and game deployment.

use crate::position::Position;
use crate::types::{GameHandle, Identity};
use derive_more::{Display, Error};
use tracing::instrument;

/// Why a call against a game or the registry was rejected.
///
/// Every kind is a normal, recoverable-by-resubmission outcome. The caller
/// decides whether to retry with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GameErrorKind {
    /// Position outside 0-8.
    #[display("Position {} is outside the board (0-8)", _0)]
    OutOfBounds(u64),

    /// Target square already holds a mark.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(Position),

    /// Caller is a participant, but not the one whose turn it is.
    #[display("It is not {}'s turn", _0)]
    NotYourTurn(Identity),

    /// Caller is not allowed to perform the operation at all.
    #[display("{} is not authorized", _0)]
    Unauthorized(Identity),

    /// Relayed move signature did not verify against the recorded key.
    #[display("Invalid signature for {}", _0)]
    InvalidSignature(Identity),

    /// Game already has a winner or ended in a draw.
    #[display("Game is already finished")]
    GameFinished,

    /// No game is hosted under the handle.
    #[display("Unknown game {}", _0)]
    UnknownGame(GameHandle),
}

impl GameErrorKind {
    /// Stable numeric code for the failure.
    pub fn code(&self) -> u32 {
        match self {
            GameErrorKind::OutOfBounds(_) | GameErrorKind::SquareOccupied(_) => 1001,
            GameErrorKind::NotYourTurn(_) => 1002,
            GameErrorKind::Unauthorized(_) => 1003,
            GameErrorKind::GameFinished => 1004,
            GameErrorKind::UnknownGame(_) => 1005,
            GameErrorKind::InvalidSignature(_) => 8231,
        }
    }

    /// True for the illegal-move family (bad position or occupied square).
    pub fn is_illegal_move(&self) -> bool {
        matches!(
            self,
            GameErrorKind::OutOfBounds(_) | GameErrorKind::SquareOccupied(_)
        )
    }
}

/// Game error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Game error [{}]: {} at {}:{}", kind.code(), kind, file, line)]
pub struct GameError {
    /// What went wrong.
    pub kind: GameErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GameError {
    /// Creates a new game error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: GameErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &GameErrorKind {
        &self.kind
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

impl From<GameErrorKind> for GameError {
    #[track_caller]
    fn from(kind: GameErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_signature_code_is_pinned() {
        let err = GameError::new(GameErrorKind::InvalidSignature(Identity::new("alice")));
        assert_eq!(err.code(), 8231);
    }

    #[test]
    fn test_illegal_move_family() {
        assert!(GameErrorKind::OutOfBounds(9).is_illegal_move());
        assert!(GameErrorKind::SquareOccupied(Position::Center).is_illegal_move());
        assert!(!GameErrorKind::GameFinished.is_illegal_move());
    }

    #[test]
    fn test_display_carries_location() {
        let err = GameError::new(GameErrorKind::GameFinished);
        let rendered = err.to_string();
        assert!(rendered.contains("already finished"));
        assert!(rendered.contains("error.rs"));
    }
}
