//! Wiring of stores, clients and jobs from configuration

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use super::chat_intake::ChatIntake;
use super::scheduler::Scheduler;
use crate::domain::discovery::{AssetDiscoveryJob, SnapshotStore};
use crate::domain::execution::SwapExecutor;
use crate::domain::notification::{NotificationFanout, SubscriberRegistry};
use crate::domain::price::{PriceSamplingJob, RecentAssetBuffer};
use crate::domain::settings::SettingsStore;
use crate::infrastructure::blockchain::SolanaRpcClient;
use crate::infrastructure::jupiter::{http_client, PriceApiClient, SwapApiClient, TokenListClient};
use crate::infrastructure::messaging::TelegramBot;
use crate::infrastructure::storage::{FileStore, KeyValueStore};
use crate::shared::config::{Config, BOT_TOKEN_ENV};

/// Persistent store under the configured data directory
pub async fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let store = FileStore::open(&config.storage.data_dir)
        .await
        .with_context(|| format!("opening data dir {}", config.storage.data_dir.display()))?;
    Ok(Arc::new(store))
}

/// Swap pipeline against the configured aggregator and RPC node
pub fn build_executor(config: &Config) -> Result<SwapExecutor> {
    let client = http_client(config.http_timeout())?;
    let api = SwapApiClient::new(client, &config.endpoints.quote_url, &config.endpoints.swap_url);
    let rpc = SolanaRpcClient::new(config.rpc.url.clone(), config.rpc_timeout(), config.rpc.skip_preflight);
    Ok(SwapExecutor::new(Arc::new(api), Arc::new(rpc)))
}

/// Long-running agent: both periodic jobs plus the chat intake
pub struct AgentService {
    config: Config,
    bot: Arc<TelegramBot>,
    discovery: Arc<AssetDiscoveryJob>,
    sampling: Arc<PriceSamplingJob>,
    intake: Arc<ChatIntake>,
}

impl AgentService {
    pub async fn build(config: Config) -> Result<Self> {
        let token = config
            .bot_token()
            .ok_or_else(|| anyhow!("bot token missing: set {} or telegram.bot_token", BOT_TOKEN_ENV))?;

        let store = open_store(&config).await?;
        let client = http_client(config.http_timeout())?;

        let bot = Arc::new(TelegramBot::new(client.clone(), &config.telegram.api_url, &token));
        let registry = Arc::new(
            SubscriberRegistry::load(store.clone())
                .await
                .context("loading subscribers")?,
        );
        info!("👥 {} subscribers loaded", registry.len().await);
        let fanout = Arc::new(NotificationFanout::new(bot.clone(), registry.clone()));
        let buffer = Arc::new(RecentAssetBuffer::new());

        let discovery = Arc::new(AssetDiscoveryJob::new(
            Arc::new(TokenListClient::new(client.clone(), &config.endpoints.token_list_url)),
            SnapshotStore::new(store.clone()),
            buffer.clone(),
            fanout.clone(),
        ));
        let sampling = Arc::new(PriceSamplingJob::new(
            Arc::new(PriceApiClient::new(
                client,
                &config.endpoints.price_url,
                &config.endpoints.price_base_symbol,
            )),
            buffer,
            fanout,
            &config.sampling,
        ));
        let intake = Arc::new(ChatIntake::new(
            bot.clone(),
            registry,
            Arc::new(SettingsStore::new(store)),
            Arc::new(build_executor(&config)?),
        ));

        Ok(Self {
            config,
            bot,
            discovery,
            sampling,
            intake,
        })
    }

    /// Run until Ctrl-C
    pub async fn run(self) -> Result<()> {
        info!("🚀 Starting jupwatch agent");
        let scheduler = Scheduler::for_jobs(self.discovery, self.sampling, &self.config.schedule).start();
        let poll_timeout = std::time::Duration::from_secs(self.config.telegram.poll_timeout_secs);
        let intake = tokio::spawn(self.intake.run(self.bot, poll_timeout));

        tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
        warn!("🛑 Shutdown requested");
        intake.abort();
        scheduler.shutdown().await;
        info!("👋 Stopped");
        Ok(())
    }
}
