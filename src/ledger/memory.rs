//! In-process ledger for local play and tests.

use super::{LedgerError, SettlementLedger, Signature, WalletAddress};
use crate::protocol::Lamports;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// A transfer the memory ledger confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Paying account.
    pub from: WalletAddress,
    /// Receiving account.
    pub to: WalletAddress,
    /// Amount moved.
    pub lamports: Lamports,
    /// Issued confirmation.
    pub signature: Signature,
}

/// Balances held in a map, with switches to simulate outages.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: Mutex<HashMap<WalletAddress, Lamports>>,
    transfers: Mutex<Vec<TransferRecord>>,
    fail_balance: AtomicBool,
    fail_transfers: AtomicBool,
    sequence: AtomicU64,
}

impl MemoryLedger {
    /// Empty ledger; unknown accounts hold zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with one funded account.
    pub fn with_account(address: WalletAddress, lamports: Lamports) -> Self {
        Self {
            accounts: Mutex::new(HashMap::from([(address, lamports)])),
            ..Self::default()
        }
    }

    /// Adds `lamports` to `address`.
    pub async fn credit(&self, address: &WalletAddress, lamports: Lamports) {
        let mut accounts = self.accounts.lock().await;
        let balance = accounts.entry(address.clone()).or_default();
        *balance = balance.saturating_add(lamports);
    }

    /// Makes every balance query fail until switched back.
    pub fn fail_balance_queries(&self, fail: bool) {
        self.fail_balance.store(fail, Ordering::SeqCst);
    }

    /// Makes every transfer fail until switched back.
    pub fn fail_transfers(&self, fail: bool) {
        self.fail_transfers.store(fail, Ordering::SeqCst);
    }

    /// Confirmed transfers, oldest first.
    pub async fn transfers(&self) -> Vec<TransferRecord> {
        self.transfers.lock().await.clone()
    }
}

#[async_trait]
impl SettlementLedger for MemoryLedger {
    #[instrument(skip(self), fields(address = %address))]
    async fn balance(&self, address: &WalletAddress) -> Result<Lamports, LedgerError> {
        if self.fail_balance.load(Ordering::SeqCst) {
            warn!("Simulated balance outage");
            return Err(LedgerError::Request("simulated balance outage".to_string()));
        }
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(address).copied().unwrap_or_default())
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        lamports: Lamports,
    ) -> Result<Signature, LedgerError> {
        if self.fail_transfers.load(Ordering::SeqCst) {
            warn!("Simulated transfer outage");
            return Err(LedgerError::Request("simulated transfer outage".to_string()));
        }

        let mut accounts = self.accounts.lock().await;
        let available = accounts.get(from).copied().unwrap_or_default();
        if available < lamports {
            return Err(LedgerError::InsufficientBalance {
                available,
                requested: lamports,
            });
        }
        accounts.insert(from.clone(), available - lamports);
        let credited = accounts.entry(to.clone()).or_default();
        *credited = credited.saturating_add(lamports);
        drop(accounts);

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let signature = Signature::new(format!("memory-{seq}"));
        self.transfers.lock().await.push(TransferRecord {
            from: from.clone(),
            to: to.clone(),
            lamports,
            signature: signature.clone(),
        });

        debug!(%signature, lamports, "Transfer confirmed");
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> WalletAddress {
        s.parse().unwrap()
    }

    const ESCROW: &str = "CKqAWAngmy8VMs8UHBWgZu3XgiSnjV5XpEzJxxTz3G25";
    const ALICE: &str = "3x9az88Dkbxa6tkKByxqEn7jBTJCJCD4dVvou49L24ET";

    #[tokio::test]
    async fn test_transfer_moves_funds() {
        let ledger = MemoryLedger::with_account(addr(ESCROW), 1_000);
        let sig = ledger.transfer(&addr(ESCROW), &addr(ALICE), 400).await.unwrap();

        assert_eq!(sig.as_str(), "memory-1");
        assert_eq!(ledger.balance(&addr(ESCROW)).await.unwrap(), 600);
        assert_eq!(ledger.balance(&addr(ALICE)).await.unwrap(), 400);
        assert_eq!(ledger.transfers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_overdraft_refused() {
        let ledger = MemoryLedger::with_account(addr(ESCROW), 10);
        let err = ledger.transfer(&addr(ESCROW), &addr(ALICE), 11).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                available: 10,
                requested: 11
            }
        );
        assert!(ledger.transfers().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let ledger = MemoryLedger::with_account(addr(ESCROW), 10);
        ledger.fail_balance_queries(true);
        assert!(ledger.balance(&addr(ESCROW)).await.is_err());
        ledger.fail_balance_queries(false);
        assert_eq!(ledger.balance(&addr(ESCROW)).await.unwrap(), 10);

        ledger.fail_transfers(true);
        assert!(ledger.transfer(&addr(ESCROW), &addr(ALICE), 1).await.is_err());
    }
}
