//! Command-line interface for tictac_escrow.

use clap::{Parser, Subcommand};

/// Tictac Escrow - wagered tic-tac-toe server with escrow payouts
#[derive(Parser, Debug)]
#[command(name = "tictac_escrow")]
#[command(about = "Wagered two-player tic-tac-toe over WebSockets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults apply when missing)
    #[arg(short, long, global = true, default_value = "tictac_escrow.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket game server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the escrow address and its balance, then exit
    Escrow,
}
