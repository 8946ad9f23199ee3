//! CLI commands and handlers
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use super::services::{build_executor, open_store, AgentService};
use crate::domain::notification::SubscriberRegistry;
use crate::domain::settings::{SettingsStore, SwapSettings};
use crate::shared::config::Config;
use crate::shared::types::ChatId;

#[derive(Parser)]
#[command(name = "jupwatch")]
#[command(version, about = "Jupiter new-listing alerts, price digests and on-demand swaps")]
pub struct Cli {
    /// Path to config file (optional, every field has a default)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// RPC endpoint URL (overrides config)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run discovery, price digests and the chat bot until Ctrl-C
    Run,

    /// Execute one swap and print the transaction signature
    Swap(SwapArgs),

    /// Register a chat for notifications
    Subscribe {
        /// Telegram chat id
        chat_id: i64,
    },

    /// Manage per-user swap settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
pub struct SwapArgs {
    /// Mint to buy
    pub output_mint: String,

    /// Mint to sell (defaults to wrapped SOL)
    #[arg(long)]
    pub input_mint: Option<String>,

    /// Use the stored settings of this user
    #[arg(long, conflicts_with_all = ["wallet", "keypair"])]
    pub user: Option<i64>,

    /// Wallet address (requires --keypair and --amount)
    #[arg(long, requires_all = ["keypair", "amount"])]
    pub wallet: Option<String>,

    /// Path to keypair file
    #[arg(long)]
    pub keypair: Option<PathBuf>,

    /// Input amount in lamports
    #[arg(long)]
    pub amount: Option<u64>,

    /// Slippage tolerance in basis points
    #[arg(long, default_value_t = 50)]
    pub slippage_bps: u16,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Save swap settings for a user
    Set {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        wallet: String,
        /// Input amount in lamports
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value_t = 50)]
        slippage_bps: u16,
        #[arg(long)]
        keypair: PathBuf,
    },

    /// Print the swap settings of a user
    Show {
        #[arg(long)]
        user: i64,
    },
}

impl Cli {
    /// Config file (or defaults) with CLI overrides applied
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if let Some(rpc_url) = &self.rpc_url {
            config.rpc.url = rpc_url.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: Config) -> Result<()> {
        match command {
            Commands::Run => AgentService::build(config).await?.run().await,
            Commands::Swap(args) => Self::execute_swap_command(args, config).await,
            Commands::Subscribe { chat_id } => Self::execute_subscribe_command(chat_id, config).await,
            Commands::Settings(cmd) => Self::execute_settings_command(cmd, config).await,
        }
    }

    async fn execute_swap_command(args: SwapArgs, config: Config) -> Result<()> {
        let settings = match (args.user, args.wallet) {
            (Some(user), _) => {
                let store = SettingsStore::new(open_store(&config).await?);
                store.require_swap_settings(user).await?
            }
            (None, Some(wallet)) => SwapSettings {
                wallet_address: wallet,
                amount: args.amount.context("--amount is required with --wallet")?,
                slippage_bps: args.slippage_bps,
                keypair_path: args.keypair.context("--keypair is required with --wallet")?,
            },
            (None, None) => bail!("either --user or --wallet/--keypair/--amount is required"),
        };

        let request = settings.into_request(&args.output_mint, args.input_mint.as_deref())?;
        let executor = build_executor(&config)?;
        match executor.execute_swap(request).await {
            Ok(id) => {
                info!("✅ Submitted: {}", id);
                println!("{}", id);
                Ok(())
            }
            Err(e) => {
                warn!("❌ Swap failed at {} step", e.kind());
                Err(e.into())
            }
        }
    }

    async fn execute_subscribe_command(chat_id: i64, config: Config) -> Result<()> {
        let registry = SubscriberRegistry::load(open_store(&config).await?).await?;
        if registry.add(ChatId(chat_id)).await? {
            info!("✅ Chat {} subscribed", chat_id);
        } else {
            info!("ℹ️ Chat {} was already subscribed", chat_id);
        }
        Ok(())
    }

    async fn execute_settings_command(command: SettingsCommand, config: Config) -> Result<()> {
        let store = SettingsStore::new(open_store(&config).await?);
        match command {
            SettingsCommand::Set {
                user,
                wallet,
                amount,
                slippage_bps,
                keypair,
            } => {
                store
                    .put_swap_settings(
                        user,
                        SwapSettings {
                            wallet_address: wallet,
                            amount,
                            slippage_bps,
                            keypair_path: keypair,
                        },
                    )
                    .await?;
            }
            SettingsCommand::Show { user } => match store.get_swap_settings(user).await? {
                Some(settings) => println!("{}", serde_json::to_string_pretty(&settings)?),
                None => warn!("No swap settings stored for user {}", user),
            },
        }
        Ok(())
    }
}
