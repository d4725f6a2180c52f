//! Error types for joining rooms and settling wagers.

use crate::ledger::LedgerError;
use crate::protocol::{ErrorCode, Lamports};
use crate::registry::ConnectionId;
use crate::session::SessionId;
use derive_more::{Display, Error};
use tictac_rules::Mark;

/// A join request was refused. Surfaced to the joining connection.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RoomError {
    /// Both seats are taken.
    #[display("room {room_id} already has two players")]
    RoomFull {
        /// Room that refused the join.
        room_id: SessionId,
    },
    /// The stake was negative, non-numeric or too large.
    #[display("invalid wager {_0:?}")]
    InvalidWager(#[error(not(source))] String),
    /// The connection closed before the join was processed.
    #[display("connection {_0} is not open")]
    NotConnected(#[error(not(source))] ConnectionId),
}

impl RoomError {
    /// Wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RoomError::RoomFull { .. } => ErrorCode::RoomFull,
            RoomError::InvalidWager(_) => ErrorCode::InvalidWager,
            RoomError::NotConnected(_) => ErrorCode::BadRequest,
        }
    }
}

/// Why a payout was abandoned.
///
/// Every variant is logged and dropped. None of them stop the round from
/// resetting, and none are retried.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SettlementError {
    /// The winner's opponent left before the round ended.
    #[display("no opponent seated against {winner}")]
    MissingParticipant {
        /// Mark that won.
        winner: Mark,
    },
    /// The winner's wallet string is not a ledger address.
    #[display("invalid payout address: {source}")]
    InvalidPayoutAddress {
        /// Parser complaint.
        source: LedgerError,
    },
    /// The escrow balance could not be read.
    #[display("escrow balance unavailable: {source}")]
    BalanceUnavailable {
        /// Ledger failure.
        source: LedgerError,
    },
    /// Escrow cannot cover pot plus fee.
    #[display("escrow holds {balance} lamports, needs {required}")]
    InsufficientEscrowFunds {
        /// Escrow balance at check time.
        balance: Lamports,
        /// Pot plus fee.
        required: Lamports,
    },
    /// The transfer was refused or never confirmed.
    #[display("transfer of {lamports} lamports failed: {source}")]
    LedgerTransferFailure {
        /// Amount attempted.
        lamports: Lamports,
        /// Ledger failure.
        source: LedgerError,
    },
}
