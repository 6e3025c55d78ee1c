//! Shared cache document model.
//!
//! One JSON document holds the latest value from every data source, keyed by
//! source id. Payloads are a tagged union so readers get typed access without
//! trusting any single writer; anything that fails to parse degrades to "no
//! data" at the entry level rather than poisoning the whole document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::transcript::CostEstimate;
use crate::urgency::{Recommendation, UrgencyLevel};

/// Schema tag for the cache document. Documents with a different version are
/// discarded on load rather than reinterpreted.
pub const CACHE_VERSION: u32 = 2;

/// The on-disk cache document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheDocument {
    pub version: u32,
    pub updated_at: u64,
    pub sources: BTreeMap<String, CacheEntry>,
}

impl CacheDocument {
    /// An empty document at schema [`CACHE_VERSION`].
    pub fn empty(updated_at: u64) -> Self {
        Self {
            version: CACHE_VERSION,
            updated_at,
            sources: BTreeMap::new(),
        }
    }

    /// Entry for a source id, if present.
    pub fn source(&self, id: &str) -> Option<&CacheEntry> {
        self.sources.get(id)
    }

    /// Entry for a source id, restricted to a context. Entries written under
    /// a different context key are treated as absent.
    pub fn source_in_context(&self, id: &str, context_key: &str) -> Option<&CacheEntry> {
        self.sources
            .get(id)
            .filter(|entry| entry.context_key.as_deref() == Some(context_key))
    }
}

impl Default for CacheDocument {
    fn default() -> Self {
        Self::empty(0)
    }
}

/// One cached source value plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub data: SourceData,
    /// When the value was produced, epoch milliseconds.
    pub fetched_at: u64,
    /// OS process id of the writer. Diagnostic only.
    pub fetched_by: u32,
    /// Session context the value belongs to. Absent for global sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_key: Option<String>,
}

impl CacheEntry {
    pub fn new(data: SourceData, fetched_at: u64) -> Self {
        Self {
            data,
            fetched_at,
            fetched_by: std::process::id(),
            context_key: None,
        }
    }

    pub fn with_context_key(mut self, context_key: impl Into<String>) -> Self {
        self.context_key = Some(context_key.into());
        self
    }
}

/// Tagged payload union. The external tag doubles as the source kind on disk,
/// e.g. `{"billing": {"costToday": 40.3}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SourceData {
    Billing(BillingData),
    Oauth(OauthData),
    Hotswap(HotswapData),
    Quota(QuotaData),
    Weekly(WeeklyData),
    Git(GitData),
    Model(ModelData),
    Context(ContextData),
    Transcript(CostEstimate),
}

impl SourceData {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceData::Billing(_) => "billing",
            SourceData::Oauth(_) => "oauth",
            SourceData::Hotswap(_) => "hotswap",
            SourceData::Quota(_) => "quota",
            SourceData::Weekly(_) => "weekly",
            SourceData::Git(_) => "git",
            SourceData::Model(_) => "model",
            SourceData::Context(_) => "context",
            SourceData::Transcript(_) => "transcript",
        }
    }

    pub fn as_billing(&self) -> Option<&BillingData> {
        match self {
            SourceData::Billing(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_oauth(&self) -> Option<&OauthData> {
        match self {
            SourceData::Oauth(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_hotswap(&self) -> Option<&HotswapData> {
        match self {
            SourceData::Hotswap(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_quota(&self) -> Option<&QuotaData> {
        match self {
            SourceData::Quota(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_weekly(&self) -> Option<&WeeklyData> {
        match self {
            SourceData::Weekly(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_git(&self) -> Option<&GitData> {
        match self {
            SourceData::Git(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&ModelData> {
        match self {
            SourceData::Model(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&ContextData> {
        match self {
            SourceData::Context(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_transcript(&self) -> Option<&CostEstimate> {
        match self {
            SourceData::Transcript(data) => Some(data),
            _ => None,
        }
    }
}

/// Daily spend as reported by the billing command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingData {
    pub cost_today: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

/// Subscription and rate-limit standing from the assistant's credential store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OauthData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_used_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_used_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_reset_at: Option<String>,
}

/// Active account slot as reported by the hotswap tool's state file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotswapData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_swap_at_ms: Option<u64>,
}

/// Subscription quota utilization with its urgency assessment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_used_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_used_pct: Option<f64>,
    pub urgency_score: f64,
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub recommendation: Recommendation,
}

/// Weekly quota window standing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<String>,
}

/// Working-tree summary from `git status --porcelain=v2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub staged: u32,
    pub unstaged: u32,
    pub untracked: u32,
    pub conflicted: u32,
}

impl GitData {
    pub fn is_dirty(&self) -> bool {
        self.staged + self.unstaged + self.untracked + self.conflicted > 0
    }
}

/// Active model for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Context-window utilization for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_pct: Option<f64>,
}
