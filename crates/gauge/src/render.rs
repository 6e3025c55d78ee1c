//! Statusline rendering.
//!
//! Pure functions from cached data to the single output line. The render
//! path never fails: segments with no data drop out, and a line with no
//! segments at all becomes a neutral loading placeholder so a cold start
//! is distinguishable from known-but-stale data.

use gauge_config::GaugeConfig;
use gauge_core::broker::{SessionRecord, SourceId};
use gauge_core::cache::{BillingData, CacheDocument, ContextData, GitData, ModelData, QuotaData};
use gauge_core::freshness::{self, Category, IndicatorContext};
use gauge_core::transcript::CostEstimate;
use gauge_core::urgency::UrgencyLevel;

pub const LOADING_PLACEHOLDER: &str = "loading…";

/// Everything one render needs, lifted out of the cache document.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub model: Option<ModelData>,
    pub git: Option<GitData>,
    pub context: Option<ContextData>,
    pub cost: Option<CostEstimate>,
    pub billing: Option<BillingData>,
    pub billing_at: Option<u64>,
    pub billing_context: IndicatorContext,
    pub quota: Option<QuotaData>,
    pub quota_at: Option<u64>,
    pub quota_context: IndicatorContext,
    pub notification: Option<String>,
}

impl Snapshot {
    /// Lift a session's view out of the shared cache document. Session-scoped
    /// entries belonging to another context read as absent.
    pub fn from_document(doc: &CacheDocument, session: &SessionRecord) -> Self {
        let key = session.context_key();
        let scoped = |id: SourceId| doc.source_in_context(id.as_str(), &key);
        let global = |id: SourceId| doc.source(id.as_str());

        Self {
            model: scoped(SourceId::Model).and_then(|entry| entry.data.as_model().cloned()),
            git: scoped(SourceId::Git).and_then(|entry| entry.data.as_git().cloned()),
            context: scoped(SourceId::Context).and_then(|entry| entry.data.as_context().cloned()),
            cost: scoped(SourceId::Transcript)
                .and_then(|entry| entry.data.as_transcript().cloned()),
            billing: global(SourceId::Billing).and_then(|entry| entry.data.as_billing().cloned()),
            billing_at: global(SourceId::Billing).map(|entry| entry.fetched_at),
            billing_context: IndicatorContext::default(),
            quota: global(SourceId::Quota).and_then(|entry| entry.data.as_quota().cloned()),
            quota_at: global(SourceId::Quota).map(|entry| entry.fetched_at),
            quota_context: IndicatorContext::default(),
            notification: None,
        }
    }
}

/// Render the configured segments into the output line.
pub fn render_line(config: &GaugeConfig, snapshot: &Snapshot, now_ms: u64) -> String {
    let mut parts: Vec<String> = Vec::new();
    for name in config.statusline.segments() {
        let rendered = match name {
            "model" => model_segment(snapshot),
            "git" => git_segment(snapshot),
            "context" => context_segment(snapshot),
            "cost" => cost_segment(snapshot),
            "billing" => billing_segment(snapshot, now_ms),
            "quota" => quota_segment(snapshot, now_ms),
            other => {
                tracing::debug!(event = "cli.render.unknown_segment", segment = other);
                None
            }
        };
        if let Some(text) = rendered {
            parts.push(text);
        }
    }
    if let Some(notification) = &snapshot.notification {
        parts.push(format!("⇄ {notification}"));
    }
    if parts.is_empty() {
        return LOADING_PLACEHOLDER.to_string();
    }
    parts.join(config.statusline.separator())
}

fn model_segment(snapshot: &Snapshot) -> Option<String> {
    let model = snapshot.model.as_ref()?;
    let name = model.display_name.as_deref().or(model.id.as_deref())?;
    Some(format!("🤖 {name}"))
}

fn git_segment(snapshot: &Snapshot) -> Option<String> {
    let git = snapshot.git.as_ref()?;
    let branch = git.branch.as_deref().unwrap_or("(no branch)");
    let mut text = format!("🌿 {branch}");
    if git.is_dirty() {
        text.push('*');
    }
    if git.ahead > 0 {
        text.push_str(&format!(" ↑{}", git.ahead));
    }
    if git.behind > 0 {
        text.push_str(&format!(" ↓{}", git.behind));
    }
    if git.conflicted > 0 {
        text.push_str(&format!(" !{}", git.conflicted));
    }
    Some(text)
}

fn context_segment(snapshot: &Snapshot) -> Option<String> {
    let context = snapshot.context.as_ref()?;
    let pct = context_pct(context)?;
    Some(format!("🧵 {pct:.0}%"))
}

fn context_pct(context: &ContextData) -> Option<f64> {
    context.used_pct.or(match (context.used_tokens, context.max_tokens) {
        (Some(used), Some(max)) if max > 0 => Some(used as f64 / max as f64 * 100.0),
        _ => None,
    })
}

fn cost_segment(snapshot: &Snapshot) -> Option<String> {
    let estimate = snapshot.cost.as_ref()?;
    Some(format!("💰 ${:.2}", estimate.cost_usd))
}

fn billing_segment(snapshot: &Snapshot, now_ms: u64) -> Option<String> {
    let billing = snapshot.billing.as_ref()?;
    let glyph = freshness::context_aware_indicator_at(
        now_ms,
        snapshot.billing_at,
        Category::BillingCcusage,
        snapshot.billing_context,
    )
    .glyph();
    Some(format!("💳 ${:.2}{glyph}", billing.cost_today))
}

fn quota_segment(snapshot: &Snapshot, now_ms: u64) -> Option<String> {
    let quota = snapshot.quota.as_ref()?;
    let staleness = freshness::context_aware_indicator_at(
        now_ms,
        snapshot.quota_at,
        Category::QuotaSubscription,
        snapshot.quota_context,
    )
    .glyph();
    // Urgency escalation reuses the alert glyphs so the line stays terse
    let urgency = match quota.urgency_level {
        UrgencyLevel::Low | UrgencyLevel::Medium => "",
        UrgencyLevel::High => "⚠",
        UrgencyLevel::Urgent => "🔺",
    };
    Some(format!("⚡ {:.0}{urgency}{staleness}", quota.urgency_score))
}
