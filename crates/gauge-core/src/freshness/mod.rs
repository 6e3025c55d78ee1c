//! Freshness classification and cooldown bookkeeping.
//!
//! Decides, per category, whether cached data is still trustworthy and
//! whether a failed fetch is allowed to retry yet.

pub mod classifier;
pub mod cooldown;
pub mod errors;
pub mod report;
pub mod types;

pub use classifier::{
    IndicatorContext, age_at, age_of, context_aware_indicator, context_aware_indicator_at,
    indicator, indicator_at, is_billing_fresh, is_billing_fresh_at, is_fresh, is_fresh_at, status,
    status_at,
};
pub use cooldown::CooldownStore;
pub use errors::FreshnessError;
pub use report::{FieldReport, FreshnessReport, report, report_at};
pub use types::{
    Age, Category, CategoryConfig, Freshness, INTENT_BROKEN_MS, INTENT_IN_FLIGHT_MS, Indicator,
};
