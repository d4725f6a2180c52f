//! Server configuration.

use crate::hub::DEFAULT_RESET_DELAY;
use crate::ledger::{HttpLedger, MemoryLedger, SettlementLedger, WalletAddress};
use crate::protocol::Lamports;
use crate::session::DEFAULT_ROOM_ID;
use crate::settlement::{DEFAULT_FEE_LAMPORTS, SettlementCoordinator};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable that overrides `escrow_address`.
pub const ESCROW_ADDRESS_ENV: &str = "ESCROW_ADDRESS";

/// Which ledger backend pays out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LedgerConfig {
    /// In-process balances, for local play.
    Memory {
        /// Starting escrow balance.
        #[serde(default)]
        escrow_balance: Lamports,
    },
    /// Custody service over HTTP.
    Http {
        /// Service root URL.
        url: String,
        /// Per-request timeout.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig::Memory { escrow_balance: 0 }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_room_id() -> String {
    DEFAULT_ROOM_ID.to_string()
}

fn default_reset_delay_ms() -> u64 {
    DEFAULT_RESET_DELAY.as_millis() as u64
}

fn default_fee_lamports() -> Lamports {
    DEFAULT_FEE_LAMPORTS
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Id of the single room.
    #[serde(default = "default_room_id")]
    room_id: String,

    /// Pause between `gameOver` and the fresh board, in milliseconds.
    #[serde(default = "default_reset_delay_ms")]
    reset_delay_ms: u64,

    /// Lamports kept in escrow on top of each pot for the transfer fee.
    #[serde(default = "default_fee_lamports")]
    fee_lamports: Lamports,

    /// Escrow account that funds payouts.
    #[serde(default)]
    escrow_address: Option<String>,

    /// Ledger backend.
    #[serde(default)]
    ledger: LedgerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            room_id: default_room_id(),
            reset_delay_ms: default_reset_delay_ms(),
            fee_lamports: default_fee_lamports(),
            escrow_address: None,
            ledger: LedgerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(room_id = %config.room_id, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise starts from defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies `ESCROW_ADDRESS` from the environment, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(address) = std::env::var(ESCROW_ADDRESS_ENV) {
            debug!("Escrow address taken from environment");
            self.escrow_address = Some(address);
        }
        self
    }

    /// Replaces the escrow address.
    pub fn with_escrow_address(mut self, address: impl Into<String>) -> Self {
        self.escrow_address = Some(address.into());
        self
    }

    /// Overrides bind address pieces that were given.
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Pause between `gameOver` and the fresh board.
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    /// Validated escrow address. Missing or malformed is fatal at startup.
    pub fn escrow(&self) -> Result<WalletAddress, ConfigError> {
        let raw = self.escrow_address.as_deref().ok_or_else(|| {
            ConfigError::new(format!(
                "No escrow address: set escrow_address or {}",
                ESCROW_ADDRESS_ENV
            ))
        })?;
        raw.parse()
            .map_err(|e| ConfigError::new(format!("Invalid escrow address: {}", e)))
    }

    /// Builds the configured ledger backend.
    #[instrument(skip(self), fields(ledger = ?self.ledger))]
    pub fn build_ledger(&self) -> Result<Arc<dyn SettlementLedger>, ConfigError> {
        match &self.ledger {
            LedgerConfig::Memory { escrow_balance } => {
                info!(escrow_balance, "Using in-memory ledger");
                Ok(Arc::new(MemoryLedger::with_account(
                    self.escrow()?,
                    *escrow_balance,
                )))
            }
            LedgerConfig::Http { url, timeout_secs } => {
                let ledger =
                    HttpLedger::new(url, Duration::from_secs(*timeout_secs)).map_err(|e| {
                        ConfigError::new(format!("Failed to create ledger client: {}", e))
                    })?;
                Ok(Arc::new(ledger))
            }
        }
    }

    /// Builds the settlement coordinator for this configuration.
    pub fn build_settlement(&self) -> Result<SettlementCoordinator, ConfigError> {
        Ok(SettlementCoordinator::new(
            self.build_ledger()?,
            self.escrow()?,
            self.fee_lamports,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
