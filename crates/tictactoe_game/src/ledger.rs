//! In-process execution environment hosting the registry and every game.
//!
//! Each game sits behind its own lock, so moves against one game are
//! totally ordered while different games never contend. The registry has a
//! separate lock and only ever hands out handles.

use crate::auth::MoveRequest;
use crate::config::LedgerConfig;
use crate::error::{GameError, GameErrorKind};
use crate::game::{Game, GameState};
use crate::registry::{DeployGame, Deployment, GamePage, Registry};
use crate::types::{GameHandle, Identity};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Hosts games and the registry that created them.
///
/// A panic mid-move never leaves a game half-updated (state is committed in
/// one assignment), so poisoned locks are recovered rather than propagated.
#[derive(Debug, Clone)]
pub struct Ledger {
    registry: Arc<Mutex<Registry>>,
    games: Arc<RwLock<HashMap<GameHandle, Arc<Mutex<Game>>>>>,
}

impl Ledger {
    /// Creates a ledger with default configuration.
    #[instrument]
    pub fn new() -> Self {
        Self::with_config(&LedgerConfig::default())
    }

    /// Creates a ledger from configuration.
    #[instrument(skip(config))]
    pub fn with_config(config: &LedgerConfig) -> Self {
        info!(page_size = *config.page_size(), "Creating ledger");
        Self {
            registry: Arc::new(Mutex::new(Registry::new(
                config.deploy_policy(),
                *config.page_size(),
            ))),
            games: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Deploys a game owned by `caller` and starts hosting it.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` may not deploy for the named players.
    #[instrument(skip(self, request), fields(owner = %caller))]
    pub fn create_game(
        &self,
        caller: &Identity,
        request: DeployGame,
    ) -> Result<Deployment, GameError> {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let (deployment, game) = registry.deploy_game(caller, request)?;

        // Registry lock is still held, so the handle is never listed before
        // the game is reachable.
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(*deployment.handle(), Arc::new(Mutex::new(game)));

        debug!(handle = %deployment.handle(), "Game hosted");
        Ok(deployment)
    }

    /// Submits a move the caller plays for themselves.
    #[instrument(skip(self), fields(game = %handle, caller = %caller))]
    pub fn submit_direct_move(
        &self,
        handle: GameHandle,
        caller: &Identity,
        position: u64,
    ) -> Result<GameState, GameError> {
        self.submit_move(handle, caller, &MoveRequest::direct(position))
    }

    /// Submits a move signed by `player` and relayed by `caller`.
    #[instrument(
        skip(self, signature),
        fields(game = %handle, relayer = %caller, player = %player)
    )]
    pub fn submit_relayed_move(
        &self,
        handle: GameHandle,
        caller: &Identity,
        position: u64,
        player: Identity,
        signature: Vec<u8>,
    ) -> Result<GameState, GameError> {
        self.submit_move(handle, caller, &MoveRequest::relayed(position, player, signature))
    }

    /// Submits any move request.
    ///
    /// # Errors
    ///
    /// `UnknownGame` if nothing is hosted under `handle`, otherwise whatever
    /// [`Game::submit_move`] rejects.
    #[instrument(skip(self, request), fields(game = %handle))]
    pub fn submit_move(
        &self,
        handle: GameHandle,
        caller: &Identity,
        request: &MoveRequest,
    ) -> Result<GameState, GameError> {
        let game = self.game(handle)?;
        let mut game = game.lock().unwrap_or_else(PoisonError::into_inner);
        game.submit_move(caller, request)
    }

    /// Current state of a game. Always available, even after it ends.
    #[instrument(skip(self), fields(game = %handle))]
    pub fn get_state(&self, handle: GameHandle) -> Result<GameState, GameError> {
        let game = self.game(handle)?;
        let game = game.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(game.state().clone())
    }

    /// One page of `owner`'s games starting at `cursor`.
    #[instrument(skip(self))]
    pub fn get_games(&self, owner: &Identity, cursor: u64) -> GamePage {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_games(owner, cursor)
    }

    /// Number of games deployed by `owner`.
    #[instrument(skip(self))]
    pub fn get_total_games(&self, owner: &Identity) -> u64 {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_total_games(owner)
    }

    /// Number of games deployed by anyone.
    pub fn total_games(&self) -> u64 {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total_games()
    }

    fn game(&self, handle: GameHandle) -> Result<Arc<Mutex<Game>>, GameError> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        games.get(&handle).cloned().ok_or_else(|| {
            warn!(game = %handle, "No game hosted under handle");
            GameError::new(GameErrorKind::UnknownGame(handle))
        })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
