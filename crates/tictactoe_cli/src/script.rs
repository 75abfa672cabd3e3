//! Scripted games: deploy one game and replay a list of moves against it.

use anyhow::{Context, Result, bail};
use derive_getters::Getters;
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tictactoe_game::{
    DeployGame, GameHandle, GameState, Identity, Ledger, LedgerConfig, MoveMessage, MoveRequest,
    PublicKey, sign_move,
};
use tracing::{debug, info, instrument, warn};

/// A participant in a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptPlayer {
    /// Participant identity.
    id: Identity,
    /// Secret key hex; used to sign relayed moves and to derive the public key.
    #[serde(default)]
    secret: Option<String>,
    /// Public key hex, when the secret is not part of the script.
    #[serde(default)]
    public_key: Option<PublicKey>,
}

impl ScriptPlayer {
    fn public_key(&self) -> Result<PublicKey> {
        match (&self.public_key, &self.secret) {
            (Some(key), _) => Ok(*key),
            (None, Some(secret)) => Ok(PublicKey::from_bytes(
                parse_secret(secret)?.verifying_key().to_bytes(),
            )),
            (None, None) => bail!("Player '{}' needs a secret or a public_key", self.id),
        }
    }
}

/// One scripted move.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScriptMove {
    /// `caller` plays for themselves.
    Direct {
        /// Submitting identity.
        caller: Identity,
        /// Board position.
        position: u64,
    },
    /// `relayer` submits a move signed for `player`.
    Relayed {
        /// Submitting identity.
        relayer: Identity,
        /// Identity the move is played for.
        player: Identity,
        /// Board position.
        position: u64,
        /// Signature hex; signed with the player's scripted secret when omitted.
        #[serde(default)]
        signature: Option<String>,
    },
}

/// A whole script: who deploys, who plays, and what they play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayScript {
    /// Identity deploying the game.
    deployer: Identity,
    /// Seat one.
    player_one: ScriptPlayer,
    /// Seat two.
    player_two: ScriptPlayer,
    /// Moves in submission order.
    #[serde(default)]
    moves: Vec<ScriptMove>,
}

/// What happened when a script ran.
#[derive(Debug, Clone, Getters)]
pub struct PlayReport {
    /// Handle of the deployed game.
    handle: GameHandle,
    /// One line per move.
    log: Vec<String>,
    /// Final game state.
    state: GameState,
}

impl PlayScript {
    /// Loads a script from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read script {}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
    }

    /// Parses a script from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let script: Self = toml::from_str(content).context("Failed to parse script")?;
        debug!(moves = script.moves.len(), "Script parsed");
        Ok(script)
    }

    /// Deploys the game on a fresh ledger and submits every move.
    ///
    /// Rejected moves are recorded in the report; only a failed deployment
    /// or unusable key material aborts the run.
    #[instrument(skip(self, config), fields(deployer = %self.deployer))]
    pub fn run(&self, config: &LedgerConfig) -> Result<PlayReport> {
        let ledger = Ledger::with_config(config);
        let deployment = ledger.create_game(
            &self.deployer,
            DeployGame::new(
                self.player_one.id.clone(),
                self.player_two.id.clone(),
                self.player_one.public_key()?,
                self.player_two.public_key()?,
            ),
        )?;
        let handle = *deployment.handle();
        info!(handle = %handle, game_id = *deployment.game_id(), "Script game deployed");

        let mut log = vec![format!("deployed game {} (id {})", handle, deployment.game_id())];
        for (idx, step) in self.moves.iter().enumerate() {
            let (caller, request) = self.request_for(handle, step)?;
            match ledger.submit_move(handle, caller, &request) {
                Ok(state) => log.push(format!(
                    "move {}: {} at {} accepted -> {}",
                    idx + 1,
                    caller,
                    request.position(),
                    state.board().encode()
                )),
                Err(e) => {
                    warn!(step = idx + 1, code = e.code(), "Scripted move rejected");
                    log.push(format!(
                        "move {}: {} at {} rejected [{}] {}",
                        idx + 1,
                        caller,
                        request.position(),
                        e.code(),
                        e.kind()
                    ));
                }
            }
        }

        Ok(PlayReport {
            handle,
            log,
            state: ledger.get_state(handle)?,
        })
    }

    /// Builds the submitting identity and request for one step.
    ///
    /// Signature hex that does not decode, and moves that cannot be signed,
    /// are submitted with an empty signature so the ledger rejects them
    /// like any other bad signature.
    fn request_for<'a>(
        &'a self,
        handle: GameHandle,
        step: &'a ScriptMove,
    ) -> Result<(&'a Identity, MoveRequest)> {
        match step {
            ScriptMove::Direct { caller, position } => Ok((caller, MoveRequest::direct(*position))),
            ScriptMove::Relayed {
                relayer,
                player,
                position,
                signature,
            } => {
                let signature = match signature {
                    Some(hex_sig) => hex::decode(hex_sig.trim()).unwrap_or_else(|e| {
                        warn!(player = %player, error = %e, "Scripted signature is not hex");
                        Vec::new()
                    }),
                    None => self.sign_for(handle, player, *position)?,
                };
                Ok((
                    relayer,
                    MoveRequest::relayed(*position, player.clone(), signature),
                ))
            }
        }
    }

    /// Signs with the scripted secret of whichever seat `player` holds.
    ///
    /// # Errors
    ///
    /// Fails when the script has no secret for `player`; that is a broken
    /// script, not a rejected move.
    fn sign_for(&self, handle: GameHandle, player: &Identity, position: u64) -> Result<Vec<u8>> {
        let seat = if *player == self.player_one.id {
            &self.player_one
        } else if *player == self.player_two.id {
            &self.player_two
        } else {
            bail!("No secret for '{}': not a scripted player", player);
        };
        let Some(secret) = &seat.secret else {
            bail!("No secret for '{}': provide a signature instead", player);
        };
        let key = parse_secret(secret)?;

        let message = u8::try_from(position)
            .ok()
            .and_then(|position| MoveMessage::new(handle, player.clone(), position).ok());
        match message {
            Some(message) => Ok(sign_move(&key, &message)),
            None => {
                warn!(player = %player, position, "Move cannot be signed");
                Ok(Vec::new())
            }
        }
    }
}

/// Parses a 32-byte ed25519 secret key from hex.
pub fn parse_secret(secret: &str) -> Result<SigningKey> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(secret.trim(), &mut bytes).context("Secret must be 64 hex characters")?;
    Ok(SigningKey::from_bytes(&bytes))
}
