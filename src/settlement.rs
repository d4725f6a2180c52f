//! Paying the pot to the winner out of escrow.
//!
//! Settlement runs as its own task. The hub hands over a [`PayoutPlan`]
//! captured under the session lock and moves on; whatever happens on the
//! ledger afterwards is only logged. There is no retry and no rollback, so a
//! failed payout is lost. Payouts for back-to-back rounds run concurrently,
//! so one payout's balance check may interleave with another's transfer; the
//! ledger's own balance check is the last guard. Serialising payouts would
//! need an escrow reservation or a single settlement queue.

use crate::error::SettlementError;
use crate::ledger::{SettlementLedger, Signature, WalletAddress};
use crate::protocol::Lamports;
use crate::session::PayoutPlan;
use derive_getters::Getters;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Fee reserve used when none is configured.
pub const DEFAULT_FEE_LAMPORTS: Lamports = 5_000;

/// A confirmed payout.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SettlementReceipt {
    /// Address paid.
    payee: WalletAddress,
    /// Amount paid.
    lamports: Lamports,
    /// Ledger confirmation.
    signature: Signature,
}

/// Result of one detached settlement.
pub type SettlementTask = JoinHandle<Result<SettlementReceipt, SettlementError>>;

/// Checks escrow and pays winners.
#[derive(Debug, Clone)]
pub struct SettlementCoordinator {
    ledger: Arc<dyn SettlementLedger>,
    escrow: WalletAddress,
    fee: Lamports,
}

impl SettlementCoordinator {
    /// Creates a coordinator paying out of `escrow`.
    pub fn new(ledger: Arc<dyn SettlementLedger>, escrow: WalletAddress, fee: Lamports) -> Self {
        Self { ledger, escrow, fee }
    }

    /// Escrow account.
    pub fn escrow(&self) -> &WalletAddress {
        &self.escrow
    }

    /// Fee reserve required on top of the pot.
    pub fn fee(&self) -> Lamports {
        self.fee
    }

    /// Ledger in use.
    pub fn ledger(&self) -> &Arc<dyn SettlementLedger> {
        &self.ledger
    }

    /// Runs `plan` to completion on the current task.
    ///
    /// Steps: validate the payee, read the escrow balance, require
    /// `balance >= pot + fee`, submit one transfer of `pot`.
    #[instrument(
        skip(self, plan),
        fields(session_id = %plan.session_id(), winner = %plan.winner(), pot = plan.pot())
    )]
    pub async fn settle(&self, plan: PayoutPlan) -> Result<SettlementReceipt, SettlementError> {
        let payee = self
            .ledger
            .parse_address(plan.wallet())
            .map_err(|source| SettlementError::InvalidPayoutAddress { source })?;

        let balance = self
            .ledger
            .balance(&self.escrow)
            .await
            .map_err(|source| SettlementError::BalanceUnavailable { source })?;

        let lamports = *plan.pot();
        let required = lamports.saturating_add(self.fee);
        if balance < required {
            return Err(SettlementError::InsufficientEscrowFunds { balance, required });
        }

        let signature = self
            .ledger
            .transfer(&self.escrow, &payee, lamports)
            .await
            .map_err(|source| SettlementError::LedgerTransferFailure { lamports, source })?;

        Ok(SettlementReceipt {
            payee,
            lamports,
            signature,
        })
    }

    /// Spawns [`settle`](Self::settle) and logs its result.
    ///
    /// The handle may be dropped; the task keeps running.
    pub fn dispatch(&self, plan: PayoutPlan) -> SettlementTask {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let session_id = plan.session_id().clone();
            let winner = *plan.winner();
            let result = coordinator.settle(plan).await;
            match &result {
                Ok(receipt) => info!(
                    %session_id,
                    %winner,
                    payee = %receipt.payee,
                    lamports = receipt.lamports,
                    signature = %receipt.signature,
                    "Sent prize to winner"
                ),
                Err(e @ SettlementError::LedgerTransferFailure { .. }) => {
                    error!(%session_id, %winner, error = %e, "Failed to send prize")
                }
                Err(e) => warn!(%session_id, %winner, error = %e, "Settlement skipped"),
            }
            result
        })
    }
}
