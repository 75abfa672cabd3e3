//! Move admission: who may place the next mark.
//!
//! A move arrives either directly from a participant (authenticated by the
//! invocation's caller identity) or relayed by anyone on behalf of a
//! participant (authenticated by an ed25519 signature over a canonical
//! message). Both paths end with the same turn check.

use crate::error::{GameError, GameErrorKind};
use crate::game::GameState;
use crate::types::{GameHandle, Identity, Player, PublicKey};
use derive_getters::Getters;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

/// Action tag distinguishing move messages from any other signed payload.
pub const MOVE_TAG: &[u8; 4] = b"MOVE";

/// Longest player identity, in bytes, the message length prefix can carry.
pub const MAX_PLAYER_LEN: usize = u16::MAX as usize;

/// A request to place a mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MoveRequest {
    /// The caller plays for themselves.
    Direct {
        /// Board position (0-8, row-major).
        position: u64,
    },
    /// The caller relays a move signed by `player`.
    Relayed {
        /// Board position (0-8, row-major).
        position: u64,
        /// Participant the move is played for.
        player: Identity,
        /// Detached ed25519 signature over the move message digest.
        #[serde(with = "hex::serde")]
        #[schemars(with = "String")]
        signature: Vec<u8>,
    },
}

impl MoveRequest {
    /// Creates a direct move.
    pub fn direct(position: u64) -> Self {
        MoveRequest::Direct { position }
    }

    /// Creates a relayed move.
    pub fn relayed(position: u64, player: Identity, signature: Vec<u8>) -> Self {
        MoveRequest::Relayed {
            position,
            player,
            signature,
        }
    }

    /// Returns the requested position.
    pub fn position(&self) -> u64 {
        match self {
            MoveRequest::Direct { position } | MoveRequest::Relayed { position, .. } => *position,
        }
    }
}

/// The message a participant signs to authorize a relayed move.
///
/// Binds a signature to one game, one action kind, one player, one position.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveMessage {
    /// Game the move targets.
    game: GameHandle,
    /// Participant playing the move.
    player: Identity,
    /// Board position (0-8).
    position: u8,
}

impl MoveMessage {
    /// Creates the message for one relayed move.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSignature` if `player` is longer than
    /// [`MAX_PLAYER_LEN`] bytes: no signature can bind such an identity.
    #[instrument(skip(player), fields(player_len = player.as_str().len()))]
    pub fn new(game: GameHandle, player: Identity, position: u8) -> Result<Self, GameError> {
        if player.as_str().len() > MAX_PLAYER_LEN {
            warn!(max = MAX_PLAYER_LEN, "Player identity does not fit the move message");
            return Err(GameError::new(GameErrorKind::InvalidSignature(player)));
        }

        Ok(Self {
            game,
            player,
            position,
        })
    }

    /// Canonical bytes:
    /// `handle (32) || "MOVE" || u16-BE len(player) || player || position (1)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let player = self.player.as_str().as_bytes();
        // Bounded by MAX_PLAYER_LEN in `new`.
        let len = player.len() as u16;

        let mut bytes = Vec::with_capacity(32 + MOVE_TAG.len() + 2 + player.len() + 1);
        bytes.extend_from_slice(self.game.as_bytes());
        bytes.extend_from_slice(MOVE_TAG);
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.extend_from_slice(player);
        bytes.push(self.position);
        bytes
    }

    /// SHA-256 of the canonical bytes; this is what gets signed.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.to_bytes()).into()
    }
}

/// Signs a move message the way an honest participant would.
#[instrument(
    skip(key),
    fields(game = %message.game, player = %message.player, position = message.position)
)]
pub fn sign_move(key: &SigningKey, message: &MoveMessage) -> Vec<u8> {
    key.sign(&message.digest()).to_bytes().to_vec()
}

/// Checks `signature` over `message` against the raw public key.
///
/// # Errors
///
/// Returns `InvalidSignature` for a wrong signer, a tampered message, a
/// signature of the wrong length, or key bytes that are not a valid point.
#[instrument(skip(signature, key), fields(game = %message.game, player = %message.player))]
pub fn verify_move_signature(
    message: &MoveMessage,
    signature: &[u8],
    key: &PublicKey,
) -> Result<(), GameError> {
    let invalid = |reason: &str| {
        warn!(reason, "Relayed move signature rejected");
        GameError::new(GameErrorKind::InvalidSignature(message.player.clone()))
    };

    let verifying_key =
        VerifyingKey::from_bytes(key.as_bytes()).map_err(|_| invalid("malformed public key"))?;
    let signature =
        Signature::from_slice(signature).map_err(|_| invalid("malformed signature"))?;

    let digest = message.digest();
    debug!(digest = %hex::encode(digest), "Verifying move digest");
    verifying_key
        .verify_strict(&digest, &signature)
        .map_err(|_| invalid("verification failed"))
}

/// Decides which seat is acting for `request`.
///
/// Direct moves act as `caller`. Relayed moves first verify the signature
/// against the claimed player's recorded key, then act as the claimed
/// player. Either way the acting identity must hold the current turn.
///
/// # Errors
///
/// `InvalidSignature` for a bad relayed signature, `NotYourTurn` when a
/// participant moves out of turn, `Unauthorized` when the actor is not a
/// participant at all.
#[instrument(skip(game, request), fields(game_id = *game.game_id(), caller = %caller))]
pub fn authenticate(
    handle: GameHandle,
    game: &GameState,
    caller: &Identity,
    request: &MoveRequest,
) -> Result<Player, GameError> {
    let actor = match request {
        MoveRequest::Direct { .. } => caller,
        MoveRequest::Relayed {
            position,
            player,
            signature,
        } => {
            let key = game.public_key_for(player);
            // No honest signer can produce a message for a position that does
            // not fit the one-byte field.
            let position = u8::try_from(*position).map_err(|_| {
                warn!(position, "Relayed position does not fit the move message");
                GameError::new(GameErrorKind::InvalidSignature(player.clone()))
            })?;
            let message = MoveMessage::new(handle, player.clone(), position)?;
            verify_move_signature(&message, signature, key)?;
            player
        }
    };

    check_turn(game, actor)
}

/// Requires `actor` to be the participant whose turn it is.
fn check_turn(game: &GameState, actor: &Identity) -> Result<Player, GameError> {
    let turn = *game.turn();
    if game.identity_of(turn) == actor {
        return Ok(turn);
    }

    if game.seat_of(actor).is_some() {
        warn!(actor = %actor, turn = ?turn, "Participant moved out of turn");
        Err(GameError::new(GameErrorKind::NotYourTurn(actor.clone())))
    } else {
        warn!(actor = %actor, "Non-participant attempted a move");
        Err(GameError::new(GameErrorKind::Unauthorized(actor.clone())))
    }
}
