//! Wallet address validation.

use super::LedgerError;
use std::str::FromStr;

/// Byte length of a public key.
const PUBKEY_LEN: usize = 32;

/// Longest base58 rendering of a 32-byte key.
const MAX_LEN: usize = 44;

/// A base58 string that decodes to a 32-byte public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for WalletAddress {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| LedgerError::InvalidAddress {
            address: raw.to_string(),
            reason,
        };

        if raw.is_empty() || raw.len() > MAX_LEN {
            return Err(invalid(format!(
                "expected 1-{MAX_LEN} characters, got {}",
                raw.len()
            )));
        }

        let bytes = bs58::decode(raw)
            .into_vec()
            .map_err(|e| invalid(format!("not base58: {e}")))?;
        if bytes.len() != PUBKEY_LEN {
            return Err(invalid(format!(
                "decodes to {} bytes, expected {PUBKEY_LEN}",
                bytes.len()
            )));
        }

        Ok(Self(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
    const SAMPLE: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    #[test]
    fn test_accepts_base58_keys() {
        assert_eq!(SYSTEM_PROGRAM.parse::<WalletAddress>().unwrap().as_str(), SYSTEM_PROGRAM);
        assert_eq!(SAMPLE.parse::<WalletAddress>().unwrap().to_string(), SAMPLE);
    }

    #[test]
    fn test_rejects_bad_length() {
        assert!("abc".parse::<WalletAddress>().is_err());
        assert!(format!("{SAMPLE}1").parse::<WalletAddress>().is_err());
        assert!("".parse::<WalletAddress>().is_err());
    }

    #[test]
    fn test_rejects_ambiguous_characters() {
        // 0, O, I and l are excluded from the alphabet
        let bad = "0WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
        let err = bad.parse::<WalletAddress>().unwrap_err();
        assert!(err.to_string().contains("not base58"), "{err}");
    }

    #[test]
    fn test_rejects_keys_that_are_not_32_bytes() {
        // 32 characters that decode to 23 bytes
        let short = "2".repeat(32);
        let err = short.parse::<WalletAddress>().unwrap_err();
        assert!(err.to_string().contains("23 bytes"), "{err}");

        // 44 characters that decode to 33 bytes
        let long = "z".repeat(44);
        let err = long.parse::<WalletAddress>().unwrap_err();
        assert!(err.to_string().contains("33 bytes"), "{err}");

        // 44 leading zero bytes
        assert!("1".repeat(44).parse::<WalletAddress>().is_err());
    }
}
