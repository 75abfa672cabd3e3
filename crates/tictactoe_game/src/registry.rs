//! Game registry: creates games and keeps a per-owner, append-only index.

use crate::error::{GameError, GameErrorKind};
use crate::game::{Game, GameInit};
use crate::types::{GameHandle, Identity, PublicKey};
use derive_getters::Getters;
use derive_new::new;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

/// Domain tag for game handle derivation.
const HANDLE_TAG: &[u8] = b"tictactoe/game";

/// Default number of handles returned per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Request to deploy a game; the registry assigns the game id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Getters, new)]
pub struct DeployGame {
    player_one: Identity,
    player_two: Identity,
    player_one_public_key: PublicKey,
    player_two_public_key: PublicKey,
}

/// Record of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Deployment {
    /// Identity that deployed the game.
    owner: Identity,
    /// Per-owner sequence number, starting at 1.
    game_id: u64,
    /// Address of the new game.
    handle: GameHandle,
}

/// One page of an owner's games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GamePage {
    /// Handles in creation order.
    items: Vec<GameHandle>,
    /// Cursor for the following page; never less than the requested cursor.
    next_cursor: u64,
}

impl GamePage {
    /// True when there is nothing left to read after this page.
    pub fn is_last(&self, total: u64) -> bool {
        self.next_cursor >= total
    }
}

/// Who may deploy a game naming a given pair of players.
///
/// A participant may always deploy. Other identities need to be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployPolicy {
    allowed_deployers: BTreeSet<Identity>,
}

impl DeployPolicy {
    /// Only the named players may deploy.
    pub fn participants_only() -> Self {
        Self::default()
    }

    /// Participants plus the listed deployers.
    pub fn with_allowed(deployers: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            allowed_deployers: deployers.into_iter().collect(),
        }
    }

    /// Checks whether `caller` may deploy `request`.
    pub fn permits(&self, caller: &Identity, request: &DeployGame) -> bool {
        *caller == request.player_one
            || *caller == request.player_two
            || self.allowed_deployers.contains(caller)
    }
}

/// Registry of deployed games.
///
/// Mutated only by [`Registry::deploy_game`]; entries are never removed or
/// reordered, so cursors stay valid forever.
#[derive(Debug, Clone)]
pub struct Registry {
    policy: DeployPolicy,
    page_size: usize,
    games: HashMap<Identity, Vec<GameHandle>>,
    total: u64,
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// A `page_size` of zero is raised to one.
    #[instrument]
    pub fn new(policy: DeployPolicy, page_size: usize) -> Self {
        info!(page_size, "Creating game registry");
        Self {
            policy,
            page_size: page_size.max(1),
            games: HashMap::new(),
            total: 0,
        }
    }

    /// Maximum handles per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Deploys a game owned by `caller`.
    ///
    /// Assigns the next sequential game id for `caller`, derives the game
    /// handle, and appends it to the caller's index.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the policy does not let `caller` deploy for the
    /// named players.
    #[instrument(skip(self, request), fields(owner = %caller))]
    pub fn deploy_game(
        &mut self,
        caller: &Identity,
        request: DeployGame,
    ) -> Result<(Deployment, Game), GameError> {
        if !self.policy.permits(caller, &request) {
            warn!(
                player_one = %request.player_one,
                player_two = %request.player_two,
                "Deployer is not a participant or an allowed deployer"
            );
            return Err(GameError::new(GameErrorKind::Unauthorized(caller.clone())));
        }

        let owned = self.games.entry(caller.clone()).or_default();
        let game_id = owned.len() as u64 + 1;
        let init = GameInit::new(
            request.player_one,
            request.player_two,
            request.player_one_public_key,
            request.player_two_public_key,
            game_id,
        );
        let handle = derive_handle(caller, &init);
        owned.push(handle);
        self.total += 1;

        info!(game_id, handle = %handle, total = self.total, "Game deployed");
        let deployment = Deployment {
            owner: caller.clone(),
            game_id,
            handle,
        };
        Ok((deployment, Game::new(handle, init)))
    }

    /// Number of games deployed by `owner`.
    #[instrument(skip(self))]
    pub fn get_total_games(&self, owner: &Identity) -> u64 {
        self.games.get(owner).map_or(0, |g| g.len() as u64)
    }

    /// Number of games deployed by anyone.
    pub fn total_games(&self) -> u64 {
        self.total
    }

    /// Games deployed by `owner`, starting at index `cursor`, in creation
    /// order, at most one page.
    ///
    /// A cursor at or past the end yields an empty page whose `next_cursor`
    /// equals the requested cursor.
    #[instrument(skip(self))]
    pub fn get_games(&self, owner: &Identity, cursor: u64) -> GamePage {
        let owned = self.games.get(owner).map(Vec::as_slice).unwrap_or_default();
        let start = usize::try_from(cursor).unwrap_or(usize::MAX).min(owned.len());
        let end = start.saturating_add(self.page_size).min(owned.len());
        let items = owned[start..end].to_vec();

        debug!(start, end, owned = owned.len(), "Paging owner games");
        GamePage {
            next_cursor: cursor.saturating_add(items.len() as u64),
            items,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DeployPolicy::participants_only(), DEFAULT_PAGE_SIZE)
    }
}

/// SHA-256 over the tag, the owner, and every creation parameter.
///
/// `(owner, game_id)` is unique, so handles never collide in practice.
fn derive_handle(owner: &Identity, init: &GameInit) -> GameHandle {
    fn push_str(hasher: &mut Sha256, s: &str) {
        hasher.update((s.len() as u64).to_be_bytes());
        hasher.update(s.as_bytes());
    }

    let mut hasher = Sha256::new();
    hasher.update(HANDLE_TAG);
    push_str(&mut hasher, owner.as_str());
    push_str(&mut hasher, init.player_one().as_str());
    push_str(&mut hasher, init.player_two().as_str());
    hasher.update(init.player_one_public_key().as_bytes());
    hasher.update(init.player_two_public_key().as_bytes());
    hasher.update(init.game_id().to_be_bytes());
    GameHandle::from_bytes(hasher.finalize().into())
}
