use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::broker::errors::FetchError;
use crate::cache::SourceData;
use crate::freshness::Category;
use gauge_config::GaugeConfig;
use gauge_paths::GaugePaths;

/// A registered session: the mapping from a session identifier to its
/// isolated configuration root and per-session inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub config_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<PathBuf>,
    pub registered_at: u64,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, config_dir: PathBuf, registered_at: u64) -> Self {
        Self {
            session_id: session_id.into(),
            config_dir,
            transcript_path: None,
            workspace_dir: None,
            registered_at,
        }
    }

    /// Cache context key for this session's scoped entries.
    pub fn context_key(&self) -> String {
        self.config_dir.to_string_lossy().into_owned()
    }
}

/// Identifier of one data source. Doubles as the cache key and the name of
/// the process lock guarding the source's fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Model,
    Context,
    Git,
    Transcript,
    Billing,
    Oauth,
    Hotswap,
    Quota,
    Weekly,
}

impl SourceId {
    pub const ALL: [SourceId; 9] = [
        SourceId::Model,
        SourceId::Context,
        SourceId::Git,
        SourceId::Transcript,
        SourceId::Billing,
        SourceId::Oauth,
        SourceId::Hotswap,
        SourceId::Quota,
        SourceId::Weekly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Model => "model",
            SourceId::Context => "context",
            SourceId::Git => "git",
            SourceId::Transcript => "transcript",
            SourceId::Billing => "billing",
            SourceId::Oauth => "oauth",
            SourceId::Hotswap => "hotswap",
            SourceId::Quota => "quota",
            SourceId::Weekly => "weekly",
        }
    }

    /// Freshness category governing this source's cached data.
    pub fn category(&self) -> Category {
        match self {
            SourceId::Model => Category::Model,
            SourceId::Context => Category::Context,
            SourceId::Git => Category::GitStatus,
            SourceId::Transcript => Category::Transcript,
            SourceId::Billing => Category::BillingCcusage,
            SourceId::Oauth => Category::BillingOauth,
            SourceId::Hotswap => Category::QuotaHotswap,
            SourceId::Quota => Category::QuotaSubscription,
            SourceId::Weekly => Category::WeeklyQuota,
        }
    }

    /// The source whose cache entry backs a freshness category.
    pub fn for_category(category: Category) -> SourceId {
        match category {
            Category::Model => SourceId::Model,
            Category::Context => SourceId::Context,
            Category::GitStatus => SourceId::Git,
            Category::Transcript => SourceId::Transcript,
            Category::BillingCcusage => SourceId::Billing,
            Category::BillingOauth => SourceId::Oauth,
            Category::QuotaHotswap => SourceId::Hotswap,
            Category::QuotaSubscription => SourceId::Quota,
            Category::WeeklyQuota => SourceId::Weekly,
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a source's fetch may consult. `resolved` holds the outputs of
/// sources already settled this cycle, either freshly fetched or taken from
/// fresh cache, which is how dependencies flow to dependent sources.
pub struct FetchContext<'a> {
    pub session: &'a SessionRecord,
    pub config: &'a GaugeConfig,
    pub paths: &'a GaugePaths,
    pub now_ms: u64,
    pub resolved: &'a BTreeMap<SourceId, SourceData>,
}

impl FetchContext<'_> {
    /// Source timeouts never exceed the configured cap.
    pub fn effective_timeout(&self, source_timeout_ms: u64) -> u64 {
        source_timeout_ms.min(self.config.fetch.timeout_ms_cap())
    }
}

/// Per-cycle aggregate the sources fold their values into.
pub type Aggregate = BTreeMap<SourceId, SourceData>;

/// One data source: what it costs, what it depends on, how to fetch it.
pub trait Source {
    fn id(&self) -> SourceId;

    /// 1 = cheap/local, 2 = medium, 3 = expensive or dependent. Tiers run in
    /// ascending order within a cycle.
    fn tier(&self) -> u8;

    fn timeout_ms(&self) -> u64;

    /// Source ids that must be resolved before this source fetches.
    fn dependencies(&self) -> &[SourceId] {
        &[]
    }

    fn category(&self) -> Category {
        self.id().category()
    }

    fn session_scoped(&self) -> bool {
        self.category().config().session_scoped
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError>;

    fn merge(&self, aggregate: &mut Aggregate, data: SourceData) {
        aggregate.insert(self.id(), data);
    }
}

/// What happened to one source during a refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Fetched,
    SkippedFresh,
    SkippedCooldown,
    SkippedDependency,
    SkippedLockHeld,
    SkippedMissingInput,
    Failed { error: String },
}

impl StepAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Fetched => "fetched",
            StepAction::SkippedFresh => "fresh",
            StepAction::SkippedCooldown => "cooldown",
            StepAction::SkippedDependency => "dependency_unresolved",
            StepAction::SkippedLockHeld => "lock_held",
            StepAction::SkippedMissingInput => "missing_input",
            StepAction::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleStep {
    pub source: SourceId,
    pub action: StepAction,
}

/// Result of one `refresh_cycle` pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub cycle_id: String,
    pub steps: Vec<CycleStep>,
}

impl CycleOutcome {
    pub fn fetched(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.action == StepAction::Fetched)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step.action, StepAction::Failed { .. }))
            .count()
    }

    pub fn step(&self, source: SourceId) -> Option<&CycleStep> {
        self.steps.iter().find(|step| step.source == source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_category_mapping_round_trips() {
        for id in SourceId::ALL {
            assert_eq!(SourceId::for_category(id.category()), id);
        }
    }

    #[test]
    fn test_source_id_names() {
        assert_eq!(SourceId::Billing.as_str(), "billing");
        assert_eq!(SourceId::Git.to_string(), "git");
        assert_eq!(
            serde_json::to_string(&SourceId::Oauth).unwrap(),
            "\"oauth\""
        );
    }

    #[test]
    fn test_session_record_context_key_is_config_dir() {
        let record = SessionRecord::new("s1", PathBuf::from("/home/user/.claude"), 100);
        assert_eq!(record.context_key(), "/home/user/.claude");
        assert!(record.transcript_path.is_none());
    }

    #[test]
    fn test_session_record_serde_round_trip() {
        let mut record = SessionRecord::new("s1", PathBuf::from("/tmp/a"), 100);
        record.transcript_path = Some(PathBuf::from("/tmp/a/t.jsonl"));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"sessionId\""));
        assert!(json.contains("\"configDir\""));
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_cycle_outcome_counts() {
        let outcome = CycleOutcome {
            cycle_id: "c".to_string(),
            steps: vec![
                CycleStep {
                    source: SourceId::Git,
                    action: StepAction::Fetched,
                },
                CycleStep {
                    source: SourceId::Billing,
                    action: StepAction::Failed {
                        error: "timeout".to_string(),
                    },
                },
                CycleStep {
                    source: SourceId::Quota,
                    action: StepAction::SkippedDependency,
                },
            ],
        };
        assert_eq!(outcome.fetched(), 1);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(
            outcome.step(SourceId::Quota).map(|s| s.action.as_str()),
            Some("dependency_unresolved")
        );
    }
}
