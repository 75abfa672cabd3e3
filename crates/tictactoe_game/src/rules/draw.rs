//! Draw detection.

use crate::position::Position;
use crate::types::Board;
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
///
/// A full board with no winner indicates a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    Position::valid_moves(board).is_empty()
}

#[cfg(test)]
mod tests {
    use super::super::win::check_winner;
    use super::*;
    use crate::types::{Player, Square};

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_one_open_square_not_full() {
        let mut board = Board::new();
        for pos in <Position as strum::IntoEnumIterator>::iter() {
            if pos != Position::BottomRight {
                board.set(pos, Square::Occupied(Player::One));
            }
        }
        assert!(!is_full(&board));
        assert_eq!(Position::valid_moves(&board), vec![Position::BottomRight]);
    }

    #[test]
    fn test_draw_detection() {
        // 1 2 1 / 2 2 1 / 1 1 2
        let mut board = Board::new();
        let marks = [1, 2, 1, 2, 2, 1, 1, 1, 2];
        for (pos, code) in <Position as strum::IntoEnumIterator>::iter().zip(marks) {
            let player = if code == 1 { Player::One } else { Player::Two };
            board.set(pos, Square::Occupied(player));
        }

        assert!(is_full(&board));
        assert_eq!(check_winner(&board), None);
        assert_eq!(board.encode(), "121221112");
    }
}
