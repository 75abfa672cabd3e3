//! tictactoe - command-line tooling for signed tic-tac-toe games.

#![warn(missing_docs)]

mod cli;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use ed25519_dalek::SigningKey;
use script::{PlayScript, parse_secret};
use tictactoe_game::{
    GameHandle, GameState, Identity, LedgerConfig, MoveMessage, MoveRequest, sign_move,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Keygen { seed } => run_keygen(seed),
        Command::Sign {
            secret,
            game,
            player,
            position,
        } => run_sign(&secret, &game, player, position),
        Command::Play { script, config } => run_play(script, config),
        Command::Schema => run_schema(),
    }
}

/// Print a key pair, from a seed or fresh randomness.
#[instrument(skip(seed))]
fn run_keygen(seed: Option<String>) -> Result<()> {
    let key = match seed {
        Some(seed) => parse_secret(&seed)?,
        None => SigningKey::generate(&mut rand::rngs::OsRng),
    };

    println!("secret: {}", hex::encode(key.to_bytes()));
    println!("public: {}", hex::encode(key.verifying_key().to_bytes()));
    Ok(())
}

/// Print the signature authorizing a relayed move.
#[instrument(skip(secret))]
fn run_sign(secret: &str, game: &str, player: String, position: u8) -> Result<()> {
    let key = parse_secret(secret)?;
    let game: GameHandle = game
        .parse()
        .with_context(|| format!("Invalid game handle '{}'", game))?;

    let message = MoveMessage::new(game, Identity::new(player), position)?;
    let signature = sign_move(&key, &message);
    info!(digest = %hex::encode(message.digest()), "Signed move");

    println!("{}", hex::encode(signature));
    Ok(())
}

/// Run a scripted game on an in-process ledger.
#[instrument]
fn run_play(script: std::path::PathBuf, config: Option<std::path::PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => LedgerConfig::from_file(path)?,
        None => LedgerConfig::default(),
    };
    let script = PlayScript::from_file(&script)?;

    let report = script.run(&config)?;
    for line in report.log() {
        println!("{}", line);
    }
    println!("{}", report.state().board().display());
    println!("{}", serde_json::to_string_pretty(report.state())?);
    Ok(())
}

/// Print the JSON schemas callers build requests against.
fn run_schema() -> Result<()> {
    let request = schemars::schema_for!(MoveRequest);
    let state = schemars::schema_for!(GameState);
    println!("{}", serde_json::to_string_pretty(&request)?);
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
