//! Jupwatch - Jupiter listing alerts, price digests and on-demand swaps
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::{AgentService, Scheduler};
pub use domain::discovery::AssetDiscoveryJob;
pub use domain::execution::SwapExecutor;
pub use domain::notification::NotificationFanout;
pub use domain::price::{PriceSamplingJob, RecentAssetBuffer};
pub use shared::config::Config;
