//! Ledger backed by a custody service over HTTP.
//!
//! The custody service holds the escrow signing key. This client only asks it
//! for balances and transfers:
//!
//! - `GET  {base}/accounts/{address}/balance` returns `{"lamports": u64}`
//! - `POST {base}/transfers` with `{"from", "to", "lamports"}` returns
//!   `{"signature": string}` once the transfer is confirmed

use super::{LedgerError, SettlementLedger, Signature, WalletAddress};
use crate::protocol::Lamports;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    lamports: Lamports,
}

#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    from: &'a str,
    to: &'a str,
    lamports: Lamports,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    signature: String,
}

/// HTTP client for the custody service.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLedger {
    /// Creates a client whose requests give up after `timeout`.
    #[instrument]
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Request(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, ?timeout, "Custody ledger client ready");
        Ok(Self { base_url, client })
    }

    /// Service root, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, LedgerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| LedgerError::Request(format!("Malformed ledger response: {}", e)))
    }
}

#[async_trait]
impl SettlementLedger for HttpLedger {
    #[instrument(skip(self), fields(address = %address))]
    async fn balance(&self, address: &WalletAddress) -> Result<Lamports, LedgerError> {
        let url = format!("{}/accounts/{}/balance", self.base_url, address);
        debug!(url = %url, "Querying balance");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        let body: BalanceResponse = Self::read(response).await?;
        Ok(body.lamports)
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        lamports: Lamports,
    ) -> Result<Signature, LedgerError> {
        let url = format!("{}/transfers", self.base_url);
        debug!(url = %url, lamports, "Submitting transfer");

        let response = self
            .client
            .post(&url)
            .json(&TransferRequest {
                from: from.as_str(),
                to: to.as_str(),
                lamports,
            })
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        let body: TransferResponse = Self::read(response).await?;
        Ok(Signature::new(body.signature))
    }
}
