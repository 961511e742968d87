//! Signer loading.
//!
//! The signer comes from the MAIN_KP environment variable (base58-encoded
//! secret key) when set, otherwise from a keypair file in either raw-bytes or
//! JSON-array format.

use anyhow::{Context, Result};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    /// Load a keypair file (raw 64 bytes or a JSON byte array).
    pub fn from_file(path: &str) -> Result<Self> {
        let keypair_bytes = std::fs::read(path)
            .with_context(|| format!("failed to read keypair file: {path}"))?;

        let bytes = if keypair_bytes.len() == 64 {
            keypair_bytes
        } else {
            serde_json::from_slice::<Vec<u8>>(&keypair_bytes)
                .context("failed to parse keypair JSON")?
        };

        Self::from_bytes(&bytes)
    }

    /// Decode a base58-encoded secret key, the MAIN_KP format.
    pub fn from_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .context("failed to decode base58 keypair")?;
        Self::from_bytes(&bytes)
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            anyhow::bail!("invalid keypair length: expected 64 bytes, got {}", bytes.len());
        }
        if bytes.iter().all(|&b| b == 0) {
            anyhow::bail!("invalid keypair: all-zero key rejected");
        }
        let keypair = Keypair::try_from(bytes).context("invalid keypair bytes")?;
        Ok(Self { keypair })
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file_raw_bytes() {
        let keypair = Keypair::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&keypair.to_bytes()).unwrap();

        let wallet = Wallet::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_from_file_json_array() {
        let keypair = Keypair::new();
        let json = serde_json::to_vec(&keypair.to_bytes().to_vec()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&json).unwrap();

        let wallet = Wallet::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_from_base58_round_trip() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();
        let wallet = Wallet::from_base58(&encoded).unwrap();
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_rejects_all_zero_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        assert!(Wallet::from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let encoded = bs58::encode([1u8; 32]).into_string();
        assert!(Wallet::from_base58(&encoded).is_err());
    }
}
