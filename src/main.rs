//! Tictac Escrow - server binary

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tictac_escrow::{GameHub, ServerConfig};
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?.with_env_overrides();

    match cli.command {
        Command::Serve { host, port } => run_server(config.with_bind(host, port)).await,
        Command::Escrow => show_escrow(config).await,
    }
}

/// Run the WebSocket game server
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let settlement = config.build_settlement().inspect_err(|e| {
        error!(error = %e, "Escrow misconfigured, refusing to start");
    })?;
    info!(escrow = %settlement.escrow(), "Escrow account loaded");

    let hub = GameHub::new(config.room_id().clone(), config.reset_delay(), settlement);
    tictac_escrow::serve(config.host(), *config.port(), hub).await?;
    Ok(())
}

/// Print escrow address and balance
#[instrument(skip(config))]
async fn show_escrow(config: ServerConfig) -> Result<()> {
    let settlement = config.build_settlement()?;
    let balance = settlement.ledger().balance(settlement.escrow()).await?;
    println!("Escrow address: {}", settlement.escrow());
    println!("Escrow balance: {} lamports", balance);
    Ok(())
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictac_escrow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
