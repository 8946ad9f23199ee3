//! Error handling for the application

use thiserror::Error;

/// Outbound HTTP call errors (listing, price, quote and swap-build endpoints)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Endpoint unreachable, connection reset or timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx status, error payload or malformed body
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Request URLs may embed credentials (the bot token path), so they are stripped
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() || err.is_status() {
            FetchError::Protocol(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Key-value storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored value for '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Message delivery errors
#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("Delivery to {chat_id} failed: {reason}")]
    DeliveryFailed { chat_id: i64, reason: String },
}

/// Blockchain node submission errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Node unreachable: {0}")]
    Transport(String),

    #[error("Node rejected transaction: {0}")]
    Rejected(String),

    /// Signed transaction could not be put into wire format; nothing was sent
    #[error("Failed to encode signed transaction: {0}")]
    Encode(String),
}

/// Swap execution errors, one variant per pipeline step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("Quote request failed: {0}")]
    Quote(FetchError),

    #[error("Swap transaction build failed: {0}")]
    Build(FetchError),

    #[error("Swap transaction payload is not valid base64: {0}")]
    Decode(String),

    #[error("Swap transaction bytes are malformed: {0}")]
    Deserialize(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Submission failed: {0}")]
    Submit(SubmitError),
}

impl SwapError {
    /// Short machine-friendly label used in logs and chat replies
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::Quote(_) => "quote",
            SwapError::Build(_) => "build",
            SwapError::Decode(_) => "decode",
            SwapError::Deserialize(_) => "deserialize",
            SwapError::Signing(_) => "signing",
            SwapError::Submit(_) => "submit",
        }
    }
}

/// Discovery cycle errors; the snapshot is left untouched on fetch or load failure
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to fetch asset universe: {0}")]
    Fetch(#[from] FetchError),

    #[error("Snapshot storage failed: {0}")]
    Snapshot(#[from] StoreError),
}

/// Per-user swap settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("No swap settings stored for user {0}")]
    Missing(i64),

    #[error("Invalid wallet address '{0}'")]
    InvalidWallet(String),

    #[error("Invalid mint address '{0}'")]
    InvalidMint(String),

    #[error("Unable to load key material: {0}")]
    KeyMaterial(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_error_kinds() {
        let err = SwapError::Quote(FetchError::Transport("timeout".to_string()));
        assert_eq!(err.kind(), "quote");
        assert_eq!(err.to_string(), "Quote request failed: Transport error: timeout");

        let err = SwapError::Submit(SubmitError::Rejected("blockhash not found".to_string()));
        assert_eq!(err.kind(), "submit");
        assert!(err.to_string().contains("blockhash not found"));
    }

    #[test]
    fn test_decode_is_distinct_from_network_failures() {
        let decode = SwapError::Decode("invalid byte".to_string());
        let build = SwapError::Build(FetchError::Transport("reset".to_string()));
        assert_ne!(decode.kind(), build.kind());
    }
}
