//! Settings domain - per-user swap configuration

mod settings_store;

pub use settings_store::{SettingsStore, SwapSettings};
