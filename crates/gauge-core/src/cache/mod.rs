//! Shared data cache: one versioned JSON document for all fetched sources.

pub mod errors;
pub mod store;
pub mod types;

pub use errors::CacheError;
pub use store::CacheStore;
pub use types::{
    BillingData, CACHE_VERSION, CacheDocument, CacheEntry, ContextData, GitData, HotswapData,
    ModelData, OauthData, QuotaData, SourceData, WeeklyData,
};
