//! Age-based freshness classification.
//!
//! Timestamps are milliseconds since epoch; `None` or `0` means the value was
//! never fetched. Every function here has an `*_at` variant taking an explicit
//! `now_ms` so threshold boundaries can be tested exactly.

use crate::clock::now_ms;
use crate::freshness::types::{
    Age, Category, Freshness, INTENT_BROKEN_MS, INTENT_IN_FLIGHT_MS, Indicator,
};

/// Refresh-pipeline state consulted by the context-aware indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorContext {
    /// Age of the refresh-intent marker, when one exists.
    pub intent_age_ms: Option<u64>,
    /// Whether the category currently has an active failure cooldown.
    pub cooldown_active: bool,
}

/// Age of a timestamp at `now_ms`. Future timestamps clamp to zero.
pub fn age_at(now_ms: u64, timestamp: Option<u64>) -> Age {
    match timestamp {
        None | Some(0) => Age::Infinite,
        Some(ts) => Age::Finite(now_ms.saturating_sub(ts)),
    }
}

pub fn age_of(timestamp: Option<u64>) -> Age {
    age_at(now_ms(), timestamp)
}

pub fn is_fresh_at(now_ms: u64, timestamp: Option<u64>, category: Category) -> bool {
    match age_at(now_ms, timestamp) {
        Age::Finite(age) => age <= category.config().fresh_ms,
        Age::Infinite => false,
    }
}

pub fn is_fresh(timestamp: Option<u64>, category: Category) -> bool {
    is_fresh_at(now_ms(), timestamp, category)
}

/// Classify a timestamp into `unknown | fresh | stale | critical`.
///
/// Categories without a stale window never reach `Critical`.
pub fn status_at(now_ms: u64, timestamp: Option<u64>, category: Category) -> Freshness {
    let config = category.config();
    match age_at(now_ms, timestamp) {
        Age::Infinite => Freshness::Unknown,
        Age::Finite(age) if age <= config.fresh_ms => Freshness::Fresh,
        Age::Finite(age) => match config.stale_ms {
            Some(stale_ms) if age > stale_ms => Freshness::Critical,
            _ => Freshness::Stale,
        },
    }
}

pub fn status(timestamp: Option<u64>, category: Category) -> Freshness {
    status_at(now_ms(), timestamp, category)
}

/// Unconditional indicator: warns on anything that is not fresh.
pub fn indicator_at(now_ms: u64, timestamp: Option<u64>, category: Category) -> Indicator {
    match status_at(now_ms, timestamp, category) {
        Freshness::Fresh => Indicator::None,
        Freshness::Unknown | Freshness::Stale => Indicator::Warning,
        Freshness::Critical => Indicator::Alert,
    }
}

pub fn indicator(timestamp: Option<u64>, category: Category) -> Indicator {
    indicator_at(now_ms(), timestamp, category)
}

/// The indicator the renderer actually shows.
///
/// Softens the unconditional variant so a pending refresh does not spam
/// warnings. Rules, in order:
///
/// 1. fresh → none
/// 2. never fetched → none (the refresh path owns first fetches)
/// 3. critical → alert, regardless of intent
/// 4. stale without intent → none
/// 5. stale, intent younger than 30s → none (refresh presumed in flight)
/// 6. stale, intent 30s–5m old → warning (refresh overdue)
/// 7. stale, intent 5m+ old → alert (refresh mechanism presumed broken)
/// 8. stale, no intent, active cooldown → warning (retry deliberately delayed)
pub fn context_aware_indicator_at(
    now_ms: u64,
    timestamp: Option<u64>,
    category: Category,
    context: IndicatorContext,
) -> Indicator {
    match status_at(now_ms, timestamp, category) {
        Freshness::Fresh | Freshness::Unknown => Indicator::None,
        Freshness::Critical => Indicator::Alert,
        Freshness::Stale => match context.intent_age_ms {
            Some(intent_age) if intent_age < INTENT_IN_FLIGHT_MS => Indicator::None,
            Some(intent_age) if intent_age < INTENT_BROKEN_MS => Indicator::Warning,
            Some(_) => Indicator::Alert,
            None if context.cooldown_active => Indicator::Warning,
            None => Indicator::None,
        },
    }
}

pub fn context_aware_indicator(
    timestamp: Option<u64>,
    category: Category,
    context: IndicatorContext,
) -> Indicator {
    context_aware_indicator_at(now_ms(), timestamp, category, context)
}

/// Billing freshness computed purely from age.
///
/// Deliberately ignores any freshness flag stored alongside the data: a flag
/// captured at fetch time says nothing about how old the data is now.
pub fn is_billing_fresh_at(now_ms: u64, timestamp: Option<u64>) -> bool {
    is_fresh_at(now_ms, timestamp, Category::BillingOauth)
}

pub fn is_billing_fresh(timestamp: Option<u64>) -> bool {
    is_billing_fresh_at(now_ms(), timestamp)
}
