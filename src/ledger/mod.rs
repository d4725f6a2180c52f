//! The external ledger that holds escrow and pays winners.
//!
//! The room never signs anything itself. It asks a [`SettlementLedger`] for
//! the escrow balance and for a transfer, and treats every answer as fallible.

mod address;
mod http;
mod memory;

pub use address::WalletAddress;
pub use http::HttpLedger;
pub use memory::{MemoryLedger, TransferRecord};

use crate::protocol::Lamports;
use async_trait::async_trait;
use derive_more::{Display, Error};

/// Confirmation identifier returned by a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Wraps a ledger-issued identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Failure reported by a ledger backend.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LedgerError {
    /// The string is not a well-formed address.
    #[display("invalid address {address:?}: {reason}")]
    InvalidAddress {
        /// Offending input.
        address: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The ledger could not be reached or answered with garbage.
    #[display("ledger request failed: {_0}")]
    Request(#[error(not(source))] String),
    /// The ledger answered with a non-success status.
    #[display("ledger rejected request with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },
    /// The paying account cannot cover the transfer.
    #[display("account holds {available} lamports, transfer needs {requested}")]
    InsufficientBalance {
        /// Current balance.
        available: Lamports,
        /// Amount asked for.
        requested: Lamports,
    },
}

/// Capability consumed by the settlement coordinator.
#[async_trait]
pub trait SettlementLedger: Send + Sync + std::fmt::Debug {
    /// Validates a textual address.
    fn parse_address(&self, raw: &str) -> Result<WalletAddress, LedgerError> {
        raw.parse()
    }

    /// Current balance of `address`.
    async fn balance(&self, address: &WalletAddress) -> Result<Lamports, LedgerError>;

    /// Moves `lamports` from `from` to `to` and waits for confirmation.
    async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        lamports: Lamports,
    ) -> Result<Signature, LedgerError>;
}
