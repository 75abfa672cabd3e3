//! Tic-tac-toe game state machine with two ways to admit a move.
//!
//! # Architecture
//!
//! - **Board engine** ([`apply_move`], [`check_outcome`]): pure functions over
//!   the 3x3 grid.
//! - **Move authenticator** ([`authenticate`]): direct moves are checked
//!   against the caller identity, relayed moves against an ed25519 signature
//!   over a canonical [`MoveMessage`].
//! - **Game** ([`Game::submit_move`]): runs both against one game's state and
//!   commits atomically.
//! - **Registry** ([`Registry`]): deploys games and pages through each
//!   owner's games in creation order.
//! - **Ledger** ([`Ledger`]): hosts the registry and every game, serializing
//!   moves per game.
//!
//! # Example
//!
//! ```
//! use tictactoe_game::{DeployGame, GameStatus, Identity, Ledger, PublicKey};
//!
//! # fn main() -> Result<(), tictactoe_game::GameError> {
//! let ledger = Ledger::new();
//! let alice = Identity::new("alice");
//! let bob = Identity::new("bob");
//! let key = PublicKey::from_bytes([0; 32]);
//!
//! let game = ledger.create_game(&alice, DeployGame::new(alice.clone(), bob.clone(), key, key))?;
//! let state = ledger.submit_direct_move(*game.handle(), &alice, 4)?;
//! assert_eq!(state.board().encode(), "000010000");
//! assert_eq!(*state.status(), GameStatus::InProgress);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod config;
mod error;
mod game;
mod invariants;
mod ledger;
mod position;
mod registry;
mod rules;
mod types;

// Crate-level exports - Domain types
pub use position::Position;
pub use types::{Board, GameHandle, Identity, Mark, Player, PublicKey, Square};

// Crate-level exports - Board engine
pub use rules::{Outcome, apply_move, check_outcome, check_winner, is_full};

// Crate-level exports - Move authentication
pub use auth::{
    MAX_PLAYER_LEN, MOVE_TAG, MoveMessage, MoveRequest, authenticate, sign_move,
    verify_move_signature,
};

// Crate-level exports - Game state machine
pub use game::{Game, GameInit, GameState, GameStatus};

// Crate-level exports - Invariants
pub use invariants::{
    AlternatingTurnInvariant, Invariant, InvariantSet, InvariantViolation,
    MonotonicBoardInvariant, TicTacToeInvariants, Transition, WinnerConsistentInvariant,
};

// Crate-level exports - Registry and hosting
pub use ledger::Ledger;
pub use registry::{DEFAULT_PAGE_SIZE, DeployGame, DeployPolicy, Deployment, GamePage, Registry};

// Crate-level exports - Configuration and errors
pub use config::{ConfigError, LedgerConfig};
pub use error::{GameError, GameErrorKind};
