//! Discovery domain - listing snapshot and new asset detection

mod snapshot_store;
mod asset_discovery;

pub use snapshot_store::SnapshotStore;
pub use asset_discovery::{new_assets, AssetDiscoveryJob, DiscoveryReport};
