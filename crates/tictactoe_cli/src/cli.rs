//! Command-line interface for tictactoe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe with direct and signature-relayed moves
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Keys, relayed-move signatures, and scripted games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an ed25519 key pair for signing relayed moves
    Keygen {
        /// 32-byte secret seed as hex (random when omitted)
        #[arg(long)]
        seed: Option<String>,
    },

    /// Sign a relayed move
    Sign {
        /// Signer's 32-byte secret key as hex
        #[arg(long)]
        secret: String,

        /// Handle of the target game (64 hex chars)
        #[arg(long)]
        game: String,

        /// Identity the move is played for
        #[arg(long)]
        player: String,

        /// Board position (0-8)
        #[arg(long)]
        position: u8,
    },

    /// Deploy a game and play a scripted sequence of moves
    Play {
        /// Path to the game script
        #[arg(short, long)]
        script: PathBuf,

        /// Path to ledger configuration (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print JSON schemas of the move request and game state
    Schema,
}
