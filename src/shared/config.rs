use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::errors::ConfigError;

/// Environment variable that overrides `telegram.bot_token`
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcCfg {
    pub url: String,
    pub timeout_ms: u64,
    pub skip_preflight: bool,
}

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet-beta.solana.com".to_string(),
            timeout_ms: 30_000,
            skip_preflight: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointsCfg {
    pub token_list_url: String,
    pub price_url: String,
    /// Symbol every sampled asset is priced against
    pub price_base_symbol: String,
    pub quote_url: String,
    pub swap_url: String,
    pub http_timeout_ms: u64,
}

impl Default for EndpointsCfg {
    fn default() -> Self {
        Self {
            token_list_url: "https://token.jup.ag/strict".to_string(),
            price_url: "https://price.jup.ag/v4/price".to_string(),
            price_base_symbol: "SOL".to_string(),
            quote_url: "https://quote-api.jup.ag/v6/quote".to_string(),
            swap_url: "https://quote-api.jup.ag/v6/swap".to_string(),
            http_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleCfg {
    pub discovery_interval_secs: u64,
    pub discovery_initial_delay_secs: u64,
    pub sampling_interval_secs: u64,
    pub sampling_initial_delay_secs: u64,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            discovery_interval_secs: 10,
            discovery_initial_delay_secs: 50,
            sampling_interval_secs: 20,
            sampling_initial_delay_secs: 55,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    /// Most recent assets priced per cycle
    pub window: usize,
    /// Buffer size at which sampling stops
    pub high_water_mark: usize,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            window: 30,
            high_water_mark: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageCfg {
    pub data_dir: PathBuf,
}

impl Default for StorageCfg {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramCfg {
    pub api_url: String,
    pub bot_token: Option<String>,
    pub poll_timeout_secs: u64,
}

impl Default for TelegramCfg {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            bot_token: None,
            poll_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcCfg,
    pub endpoints: EndpointsCfg,
    pub schedule: ScheduleCfg,
    pub sampling: SamplingCfg,
    pub storage: StorageCfg,
    pub telegram: TelegramCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.discovery_interval_secs == 0 || self.schedule.sampling_interval_secs == 0 {
            return Err(ConfigError::Invalid("schedule intervals must be positive".to_string()));
        }
        if self.sampling.window == 0 {
            return Err(ConfigError::Invalid("sampling.window must be positive".to_string()));
        }
        if self.endpoints.http_timeout_ms == 0 || self.rpc.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    /// Bot token from the environment, falling back to the config file
    pub fn bot_token(&self) -> Option<String> {
        std::env::var(BOT_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.telegram.bot_token.clone())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.endpoints.http_timeout_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_and_endpoints() {
        let cfg = Config::default();
        assert_eq!(cfg.schedule.discovery_interval_secs, 10);
        assert_eq!(cfg.schedule.discovery_initial_delay_secs, 50);
        assert_eq!(cfg.schedule.sampling_interval_secs, 20);
        assert_eq!(cfg.schedule.sampling_initial_delay_secs, 55);
        assert_eq!(cfg.sampling.window, 30);
        assert_eq!(cfg.sampling.high_water_mark, 1000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            [rpc]
            url = "http://127.0.0.1:8899"

            [sampling]
            window = 10
            "#,
        )
        .unwrap();
        assert_eq!(cfg.rpc.url, "http://127.0.0.1:8899");
        assert_eq!(cfg.rpc.timeout_ms, 30_000);
        assert_eq!(cfg.sampling.window, 10);
        assert_eq!(cfg.sampling.high_water_mark, 1000);
        assert_eq!(cfg.endpoints.price_base_symbol, "SOL");
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Config::from_toml("[schedule]\ndiscovery_interval_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Config::from_toml("[rpc\nurl = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
