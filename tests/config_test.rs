//! Configuration loading.

use std::io::Write;
use std::time::Duration;
use tictac_escrow::{DEFAULT_FEE_LAMPORTS, DEFAULT_ROOM_ID, LedgerConfig, ServerConfig};

const ESCROW: &str = "CKqAWAngmy8VMs8UHBWgZu3XgiSnjV5XpEzJxxTz3G25";

#[test]
fn test_defaults() {
    let config = ServerConfig::default();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.port(), 3003);
    assert_eq!(config.room_id(), DEFAULT_ROOM_ID);
    assert_eq!(config.reset_delay(), Duration::from_secs(1));
    assert_eq!(*config.fee_lamports(), DEFAULT_FEE_LAMPORTS);
    assert_eq!(config.ledger(), &LedgerConfig::Memory { escrow_balance: 0 });
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
port = 4000
reset_delay_ms = 250
escrow_address = "{ESCROW}"

[ledger]
kind = "http"
url = "http://custody.local:8080/"
"#
    )
    .unwrap();

    let config = ServerConfig::load(file.path()).unwrap();
    assert_eq!(*config.port(), 4000);
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(config.reset_delay(), Duration::from_millis(250));
    assert_eq!(config.escrow().unwrap().as_str(), ESCROW);
    assert_eq!(
        config.ledger(),
        &LedgerConfig::Http {
            url: "http://custody.local:8080/".to_string(),
            timeout_secs: 30
        }
    );
    assert!(config.build_settlement().is_ok());
}

#[test]
fn test_malformed_file_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "port = \"not a number\"").unwrap();
    let err = ServerConfig::load(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_escrow_is_required() {
    let config = ServerConfig::default();
    let err = config.build_settlement().unwrap_err();
    assert!(err.message.contains("No escrow address"));

    let config = config.with_escrow_address("not base58!");
    assert!(config.escrow().unwrap_err().message.contains("Invalid escrow address"));
}

#[tokio::test]
async fn test_memory_ledger_seeded_with_escrow_balance() {
    let config = ServerConfig::from_toml(&format!(
        "escrow_address = \"{ESCROW}\"\n[ledger]\nkind = \"memory\"\nescrow_balance = 42\n"
    ))
    .unwrap();

    let settlement = config.build_settlement().unwrap();
    let balance = settlement
        .ledger()
        .balance(settlement.escrow())
        .await
        .unwrap();
    assert_eq!(balance, 42);
    assert_eq!(settlement.fee(), DEFAULT_FEE_LAMPORTS);
}

#[test]
fn test_bind_overrides() {
    let config = ServerConfig::default().with_bind(Some("0.0.0.0".to_string()), None);
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(*config.port(), 3003);
}
