//! Consolidation core: aggregation over dynamic location sets and
//! derivation of secondary metrics.

pub mod aggregate;
pub mod derive;
pub mod sanity;

pub use aggregate::Aggregator;
pub use derive::{SmoothedPoint, daily_change, enrich_location, smoothed_daily_change};
pub use sanity::{MAX_DAILY_PER_MILLION, check_sanity};
