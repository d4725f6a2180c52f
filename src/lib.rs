//! Wagered two-player tic-tac-toe over WebSockets.
//!
//! # Architecture
//!
//! - **Rules**: board, turn order, validation and outcome (`tictac_rules`)
//! - **Session**: seats, wagers and the win tally of the single room
//! - **Registry**: open connections and the room each is bound to
//! - **Hub**: serializes every mutation and sequences broadcasts
//! - **Settlement**: pays the pot out of escrow on a detached task
//! - **Server**: axum WebSocket transport
//!
//! # Example
//!
//! ```no_run
//! use tictac_escrow::{GameHub, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default().with_escrow_address("11111111111111111111111111111111");
//! let hub = GameHub::new(
//!     config.room_id().clone(),
//!     config.reset_delay(),
//!     config.build_settlement()?,
//! );
//! tictac_escrow::serve(config.host(), *config.port(), hub).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod broadcast;
mod config;
mod error;
mod hub;
mod ledger;
mod protocol;
mod registry;
mod server;
mod session;
mod settlement;

// Crate-level exports - Configuration
pub use config::{ConfigError, ESCROW_ADDRESS_ENV, LedgerConfig, ServerConfig};

// Crate-level exports - Errors
pub use error::{RoomError, SettlementError};

// Crate-level exports - Hub and transport
pub use hub::{DEFAULT_RESET_DELAY, GameHub, MoveReport};
pub use server::{router, serve};

// Crate-level exports - Wire protocol
pub use protocol::{
    BetAmount, ClientMessage, ErrorCode, LAMPORTS_PER_SOL, Lamports, ServerMessage, Verdict,
    WinTally,
};

// Crate-level exports - Sessions and connections
pub use broadcast::{broadcast, broadcast_outcome, broadcast_state};
pub use registry::{ConnectionId, ConnectionRegistry, Outbox};
pub use session::{DEFAULT_ROOM_ID, GameSession, PayoutPlan, Seat, SessionId, SessionManager};

// Crate-level exports - Settlement
pub use ledger::{
    HttpLedger, LedgerError, MemoryLedger, SettlementLedger, Signature, TransferRecord,
    WalletAddress,
};
pub use settlement::{
    DEFAULT_FEE_LAMPORTS, SettlementCoordinator, SettlementReceipt, SettlementTask,
};

// Crate-level exports - Game rules
pub use tictac_rules::{Board, Mark, MoveRejection, Outcome, Square};
