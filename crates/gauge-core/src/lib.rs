//! gauge-core: Core library for the freshness-aware statusline data broker
//!
//! This library holds the business logic shared by every gauge process:
//! the cache document, freshness classification, fetch orchestration and
//! the account failover surfaces. It is consumed by the `gauge` CLI.
//!
//! # Main Entry Points
//!
//! - [`broker`] - Register sessions, run refresh cycles, read source data
//! - [`freshness`] - Age classification, indicators, cooldowns
//! - [`cache`] - The shared cache document and its store
//! - [`lock`] - Advisory per-source process locks
//! - [`events`] - Account failover event log
//! - [`transcript`] - Session cost estimation
//! - [`urgency`] - Quota urgency scoring

pub mod broker;
pub mod cache;
pub mod clock;
pub mod events;
pub mod freshness;
pub mod intent;
pub mod lock;
pub mod logging;
pub mod transcript;
pub mod urgency;

pub use broker::{
    Broker, BrokerError, CycleOutcome, CycleStep, FetchError, SessionRecord, Source, SourceId,
    StepAction, default_sources,
};
pub use cache::{
    BillingData, CACHE_VERSION, CacheDocument, CacheEntry, CacheError, CacheStore, ContextData,
    GitData, HotswapData, ModelData, OauthData, QuotaData, SourceData, WeeklyData,
};
pub use events::{EventType, FailoverEvent, read_events, swap_notification};
pub use freshness::{
    Age, Category, CategoryConfig, CooldownStore, Freshness, FreshnessError, Indicator,
};
pub use lock::{LockError, LockInfo, LockStatus, LockToken};
pub use logging::init_logging;
pub use transcript::{CostEstimate, estimate};
pub use urgency::{Recommendation, UrgencyAssessment, UrgencyInput, UrgencyLevel, assess};
