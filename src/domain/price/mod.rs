//! Price domain - recent asset buffer and periodic price digest

mod recent_buffer;
mod price_sampler;

pub use recent_buffer::RecentAssetBuffer;
pub use price_sampler::{PriceSamplingJob, SamplingReport, SkipReason};
