use serde::{Deserialize, Serialize};

/// Intent younger than this is presumed to have a refresh in flight.
pub const INTENT_IN_FLIGHT_MS: u64 = 30_000;

/// Intent older than this means the refresh mechanism is presumed broken.
pub const INTENT_BROKEN_MS: u64 = 300_000;

/// Fixed set of data categories the statusline tracks.
///
/// The set is closed on purpose: thresholds and cooldowns are tuned per
/// category, and every persisted record is keyed by these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BillingOauth,
    BillingCcusage,
    QuotaHotswap,
    QuotaSubscription,
    GitStatus,
    Transcript,
    Model,
    Context,
    WeeklyQuota,
}

/// Immutable freshness thresholds for one category.
///
/// `stale_ms: None` means the category has no critical tier and is capped at
/// stale. `cooldown_ms: 0` means failed fetches are retried immediately,
/// which is right for free local sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryConfig {
    pub fresh_ms: u64,
    pub stale_ms: Option<u64>,
    pub cooldown_ms: u64,
    pub session_scoped: bool,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::BillingOauth,
        Category::BillingCcusage,
        Category::QuotaHotswap,
        Category::QuotaSubscription,
        Category::GitStatus,
        Category::Transcript,
        Category::Model,
        Category::Context,
        Category::WeeklyQuota,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BillingOauth => "billing_oauth",
            Category::BillingCcusage => "billing_ccusage",
            Category::QuotaHotswap => "quota_hotswap",
            Category::QuotaSubscription => "quota_subscription",
            Category::GitStatus => "git_status",
            Category::Transcript => "transcript",
            Category::Model => "model",
            Category::Context => "context",
            Category::WeeklyQuota => "weekly_quota",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    pub fn config(&self) -> CategoryConfig {
        match self {
            Category::BillingOauth => CategoryConfig {
                fresh_ms: 120_000,
                stale_ms: Some(600_000),
                cooldown_ms: 300_000,
                session_scoped: false,
            },
            Category::BillingCcusage => CategoryConfig {
                fresh_ms: 120_000,
                stale_ms: Some(600_000),
                cooldown_ms: 180_000,
                session_scoped: false,
            },
            Category::QuotaHotswap => CategoryConfig {
                fresh_ms: 60_000,
                stale_ms: Some(300_000),
                cooldown_ms: 60_000,
                session_scoped: false,
            },
            Category::QuotaSubscription => CategoryConfig {
                fresh_ms: 120_000,
                stale_ms: Some(600_000),
                cooldown_ms: 300_000,
                session_scoped: false,
            },
            Category::WeeklyQuota => CategoryConfig {
                fresh_ms: 300_000,
                stale_ms: Some(1_800_000),
                cooldown_ms: 300_000,
                session_scoped: false,
            },
            Category::GitStatus => CategoryConfig {
                fresh_ms: 10_000,
                stale_ms: None,
                cooldown_ms: 0,
                session_scoped: true,
            },
            Category::Transcript => CategoryConfig {
                fresh_ms: 10_000,
                stale_ms: None,
                cooldown_ms: 0,
                session_scoped: true,
            },
            Category::Model => CategoryConfig {
                fresh_ms: 30_000,
                stale_ms: None,
                cooldown_ms: 0,
                session_scoped: true,
            },
            Category::Context => CategoryConfig {
                fresh_ms: 10_000,
                stale_ms: None,
                cooldown_ms: 0,
                session_scoped: true,
            },
        }
    }

    /// Metered categories pay for failed fetches with a cooldown.
    pub fn is_metered(&self) -> bool {
        self.config().cooldown_ms > 0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age-based classification of a cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Unknown,
    Fresh,
    Stale,
    Critical,
}

impl Freshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::Unknown => "unknown",
            Freshness::Fresh => "fresh",
            Freshness::Stale => "stale",
            Freshness::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staleness glyph shown next to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    None,
    Warning,
    Alert,
}

impl Indicator {
    pub fn glyph(&self) -> &'static str {
        match self {
            Indicator::None => "",
            Indicator::Warning => "⚠",
            Indicator::Alert => "🔺",
        }
    }
}

/// Age of a cached value. Missing timestamps age out to `Infinite`, which
/// orders above every finite age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    Finite(u64),
    Infinite,
}

impl Age {
    pub fn as_millis(&self) -> Option<u64> {
        match self {
            Age::Finite(ms) => Some(*ms),
            Age::Infinite => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Age::Infinite)
    }
}

impl PartialOrd for Age {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Age {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Age::Finite(a), Age::Finite(b)) => a.cmp(b),
            (Age::Finite(_), Age::Infinite) => std::cmp::Ordering::Less,
            (Age::Infinite, Age::Finite(_)) => std::cmp::Ordering::Greater,
            (Age::Infinite, Age::Infinite) => std::cmp::Ordering::Equal,
        }
    }
}
