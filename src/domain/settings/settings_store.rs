//! Per-user swap settings persisted as one JSON map

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::infrastructure::storage::KeyValueStore;
use crate::shared::errors::{SettingsError, StoreError};
use crate::shared::types::{KeyMaterial, SwapRequest, NATIVE_MINT};

const SETTINGS_KEY: &str = "user_settings";

fn default_slippage_bps() -> u16 {
    50
}

/// What a user swaps with. The key itself stays on disk; only its path is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSettings {
    pub wallet_address: String,
    /// Input amount in lamports
    pub amount: u64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
    pub keypair_path: PathBuf,
}

impl SwapSettings {
    /// Build a swap request from `input_mint` (wrapped SOL when `None`) into `output_mint`
    pub fn into_request(
        &self,
        output_mint: &str,
        input_mint: Option<&str>,
    ) -> Result<SwapRequest, SettingsError> {
        let user_public_key = Pubkey::from_str(&self.wallet_address)
            .map_err(|_| SettingsError::InvalidWallet(self.wallet_address.clone()))?;
        let input_mint = input_mint.unwrap_or(NATIVE_MINT);
        for mint in [input_mint, output_mint] {
            Pubkey::from_str(mint).map_err(|_| SettingsError::InvalidMint(mint.to_string()))?;
        }
        let key_material = KeyMaterial::from_file(&self.keypair_path)?;

        Ok(SwapRequest {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount_in: self.amount,
            slippage_bps: self.slippage_bps,
            user_public_key,
            key_material,
        })
    }
}

pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn load_all(&self) -> Result<BTreeMap<i64, SwapSettings>, StoreError> {
        match self.store.get(SETTINGS_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                key: SETTINGS_KEY.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    pub async fn get_swap_settings(&self, user_id: i64) -> Result<Option<SwapSettings>, StoreError> {
        Ok(self.load_all().await?.remove(&user_id))
    }

    /// Settings for `user_id`, or `SettingsError::Missing`
    pub async fn require_swap_settings(&self, user_id: i64) -> Result<SwapSettings, SettingsError> {
        self.get_swap_settings(user_id)
            .await?
            .ok_or(SettingsError::Missing(user_id))
    }

    pub async fn put_swap_settings(&self, user_id: i64, settings: SwapSettings) -> Result<(), SettingsError> {
        Pubkey::from_str(&settings.wallet_address)
            .map_err(|_| SettingsError::InvalidWallet(settings.wallet_address.clone()))?;

        let _guard = self.write_lock.lock().await;
        let mut all = self.load_all().await?;
        all.insert(user_id, settings);
        let bytes = serde_json::to_vec_pretty(&all).map_err(|e| StoreError::Corrupt {
            key: SETTINGS_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.store.put(SETTINGS_KEY, &bytes).await?;
        info!("⚙️ Swap settings saved for user {}", user_id);
        Ok(())
    }
}
