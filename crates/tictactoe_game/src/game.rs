//! Game state machine: one independently addressable game.
//!
//! Every accepted move runs authentication, then the board engine, then
//! outcome evaluation, against a scratch copy of the state. The copy is
//! committed only when all steps succeed, so a rejected move leaves no trace.

use crate::auth::{self, MoveRequest};
use crate::error::{GameError, GameErrorKind};
use crate::invariants::{InvariantSet, TicTacToeInvariants, Transition};
use crate::rules::{self, Outcome};
use crate::types::{Board, GameHandle, Identity, Player, PublicKey};
use derive_getters::Getters;
use derive_new::new;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Immutable creation parameters of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Getters, new)]
pub struct GameInit {
    player_one: Identity,
    player_two: Identity,
    player_one_public_key: PublicKey,
    player_two_public_key: PublicKey,
    /// Sequence number assigned by the registry, unique per creator.
    game_id: u64,
}

/// Lifecycle status. Terminal once it leaves `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum GameStatus {
    /// Moves are accepted (code 0).
    InProgress,
    /// Someone completed a line (code 1).
    HasWinner,
    /// Board filled with no line (code 2).
    Draw,
}

impl GameStatus {
    /// Numeric code (0, 1, 2).
    pub fn code(self) -> u8 {
        match self {
            GameStatus::InProgress => 0,
            GameStatus::HasWinner => 1,
            GameStatus::Draw => 2,
        }
    }
}

/// Complete persisted state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Getters)]
pub struct GameState {
    pub(crate) game_id: u64,
    pub(crate) player_one: Identity,
    pub(crate) player_two: Identity,
    pub(crate) player_one_public_key: PublicKey,
    pub(crate) player_two_public_key: PublicKey,
    pub(crate) board: Board,
    /// Whose move is next; frozen once the game ends.
    pub(crate) turn: Player,
    pub(crate) status: GameStatus,
    /// Set only when `status` is `HasWinner`.
    pub(crate) winner: Option<Identity>,
}

impl GameState {
    /// Fresh state: empty board, player one to move.
    pub fn new(init: GameInit) -> Self {
        Self {
            game_id: init.game_id,
            player_one: init.player_one,
            player_two: init.player_two,
            player_one_public_key: init.player_one_public_key,
            player_two_public_key: init.player_two_public_key,
            board: Board::new(),
            turn: Player::One,
            status: GameStatus::InProgress,
            winner: None,
        }
    }

    /// Identity sitting in the given seat.
    pub fn identity_of(&self, seat: Player) -> &Identity {
        match seat {
            Player::One => &self.player_one,
            Player::Two => &self.player_two,
        }
    }

    /// Seat held by `identity`, preferring player one when both seats match.
    pub fn seat_of(&self, identity: &Identity) -> Option<Player> {
        if *identity == self.player_one {
            Some(Player::One)
        } else if *identity == self.player_two {
            Some(Player::Two)
        } else {
            None
        }
    }

    /// Recorded key for relayed moves claimed by `identity`: player one's key
    /// if it is player one, otherwise player two's.
    pub fn public_key_for(&self, identity: &Identity) -> &PublicKey {
        if *identity == self.player_one {
            &self.player_one_public_key
        } else {
            &self.player_two_public_key
        }
    }

    /// True once the game has a winner or ended in a draw.
    pub fn is_finished(&self) -> bool {
        self.status != GameStatus::InProgress
    }
}

/// A single game: its handle plus its mutable state.
#[derive(Debug, Clone)]
pub struct Game {
    handle: GameHandle,
    state: GameState,
}

impl Game {
    /// Creates a game in its initial state.
    #[instrument(skip(init), fields(game_id = *init.game_id()))]
    pub fn new(handle: GameHandle, init: GameInit) -> Self {
        Self {
            handle,
            state: GameState::new(init),
        }
    }

    /// Returns the handle this game is addressed by.
    pub fn handle(&self) -> GameHandle {
        self.handle
    }

    /// Returns the current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Submits a move on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// `GameFinished` once the game is over, any authentication failure from
    /// [`auth::authenticate`], or an illegal-move error from the board engine.
    /// State is unchanged on every error.
    #[instrument(skip(self, request), fields(game = %self.handle, position = request.position()))]
    pub fn submit_move(
        &mut self,
        caller: &Identity,
        request: &MoveRequest,
    ) -> Result<GameState, GameError> {
        if self.state.is_finished() {
            warn!(status = ?self.state.status, "Move submitted to a finished game");
            return Err(GameError::new(GameErrorKind::GameFinished));
        }

        let acting = auth::authenticate(self.handle, &self.state, caller, request)?;
        let board = rules::apply_move(&self.state.board, request.position(), acting)?;

        let mut next = self.state.clone();
        next.board = board;
        match rules::check_outcome(&next.board) {
            Outcome::Winner(mark) => {
                next.status = GameStatus::HasWinner;
                next.winner = Some(next.identity_of(mark).clone());
            }
            Outcome::Draw => next.status = GameStatus::Draw,
            Outcome::Ongoing => next.turn = acting.opponent(),
        }

        debug_assert!(
            TicTacToeInvariants::check_all(&Transition::new(&self.state, &next)).is_ok(),
            "move broke a game invariant"
        );

        self.state = next;
        info!(
            board = %self.state.board.encode(),
            status = ?self.state.status,
            turn = ?self.state.turn,
            "Move accepted"
        );
        if let Some(winner) = &self.state.winner {
            info!(winner = %winner, "Game won");
        } else if self.state.status == GameStatus::Draw {
            info!("Game drawn");
        }

        Ok(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        let key = PublicKey::from_bytes([0; 32]);
        Game::new(
            GameHandle::from_bytes([1; 32]),
            GameInit::new(Identity::new("alice"), Identity::new("bob"), key, key, 1),
        )
    }

    fn play(game: &mut Game, moves: &[u64]) {
        for &pos in moves {
            let caller = game.state().identity_of(*game.state().turn()).clone();
            game.submit_move(&caller, &MoveRequest::direct(pos)).unwrap();
        }
    }

    #[test]
    fn test_initial_state() {
        let game = game();
        let state = game.state();
        assert_eq!(state.board().encode(), "000000000");
        assert_eq!(*state.turn(), Player::One);
        assert_eq!(*state.status(), GameStatus::InProgress);
        assert!(state.winner().is_none());
    }

    #[test]
    fn test_winner_keeps_turn_of_winning_player() {
        let mut game = game();
        play(&mut game, &[0, 1, 3, 2, 6]);
        let state = game.state();
        assert_eq!(state.board().encode(), "122100100");
        assert_eq!(*state.status(), GameStatus::HasWinner);
        assert_eq!(*state.turn(), Player::One);
        assert_eq!(state.winner().as_ref(), Some(&Identity::new("alice")));
    }

    #[test]
    fn test_rejected_move_leaves_state_untouched() {
        let mut game = game();
        play(&mut game, &[4]);
        let before = game.state().clone();

        let err = game
            .submit_move(&Identity::new("bob"), &MoveRequest::direct(4))
            .unwrap_err();
        assert!(err.kind().is_illegal_move());
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn test_seat_of_prefers_player_one_for_shared_identity() {
        let key = PublicKey::from_bytes([0; 32]);
        let me = Identity::new("me");
        let state = GameState::new(GameInit::new(me.clone(), me.clone(), key, key, 1));
        assert_eq!(state.seat_of(&me), Some(Player::One));
    }
}
