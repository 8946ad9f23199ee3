//! Common types used across the application

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::atomic::{compiler_fence, Ordering};

use crate::shared::errors::SettingsError;

/// Wrapped SOL mint; swaps touching it need wrap/unwrap instructions
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Tradable asset as reported by the listing endpoint.
///
/// Equality and hashing use the identifier only, so two listings of the same
/// mint with different metadata are the same asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub symbol: String,
    pub name: Option<String>,
}

impl Asset {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name,
        }
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Asset {}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Chat recipient handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price of the configured base symbol against a sampled asset
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    pub base_symbol: String,
    pub quote_symbol: String,
}

/// Secret signing key bytes.
///
/// Not `Clone`, not serializable, and redacted in `Debug` output. Owned by a
/// single `SwapRequest` and dropped when the swap call returns.
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse either a Solana CLI keypair file body (`[12, 34, ...]`) or a base58 string
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        let raw = raw.trim();
        if raw.starts_with('[') {
            let bytes: Vec<u8> = serde_json::from_str(raw)
                .map_err(|e| SettingsError::KeyMaterial(format!("invalid byte array: {}", e)))?;
            return Ok(Self(bytes));
        }
        bs58::decode(raw)
            .into_vec()
            .map(Self)
            .map_err(|e| SettingsError::KeyMaterial(format!("invalid base58: {}", e)))
    }

    /// Parse a key file; the file contents are wiped before returning
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let mut raw = std::fs::read(path.as_ref()).map_err(|e| {
            SettingsError::KeyMaterial(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let parsed = std::str::from_utf8(&raw)
            .map_err(|_| SettingsError::KeyMaterial("key file is not valid UTF-8".to_string()))
            .and_then(Self::parse);
        wipe(&mut raw);
        parsed
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// Zero a buffer with writes the optimiser may not elide
pub(crate) fn wipe(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        // SAFETY: `b` is a valid, aligned, exclusive reference
        unsafe { std::ptr::write_volatile(b, 0) };
    }
    compiler_fence(Ordering::SeqCst);
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        wipe(&mut self.0);
    }
}

/// Swap parameters plus the signing key for one on-demand swap
#[derive(Debug)]
pub struct SwapRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount_in: u64,
    pub slippage_bps: u16,
    pub user_public_key: Pubkey,
    pub key_material: KeyMaterial,
}

impl SwapRequest {
    /// Either side of the pair is wrapped SOL
    pub fn touches_native_mint(&self) -> bool {
        self.input_mint == NATIVE_MINT || self.output_mint == NATIVE_MINT
    }
}

/// Node-assigned transaction signature; acknowledges receipt, not finality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
