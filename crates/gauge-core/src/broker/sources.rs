//! Concrete data sources.
//!
//! Tier 1 sources are local and free (git working tree, transcript math).
//! Tier 2 run external tools with modest cost. Tier 3 touch the rate-limited
//! account surfaces and are derived strictly in dependency order. All parsing
//! here is boundary parsing: reject loudly inside the fetch, degrade to
//! "no data" outside it.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::broker::errors::FetchError;
use crate::broker::runner::{run_command, split_command};
use crate::broker::types::{FetchContext, Source, SourceId};
use crate::cache::{BillingData, GitData, HotswapData, OauthData, QuotaData, SourceData, WeeklyData};
use crate::transcript;
use crate::urgency::{self, UrgencyInput};
use gauge_paths::GaugePaths;

/// Tail cap when estimating cost from long transcripts.
const MAX_TRANSCRIPT_LINES: usize = 2_000;

/// The built-in source set, in fetch order. Model and context data have no
/// descriptor: they arrive with the statusline payload and are merged into
/// the cache by that entry point directly.
pub fn default_sources() -> Vec<Box<dyn Source>> {
    vec![
        Box::new(GitStatusSource),
        Box::new(TranscriptSource),
        Box::new(CcusageSource),
        Box::new(HotswapStateSource),
        Box::new(OauthSource),
        Box::new(QuotaSource),
        Box::new(WeeklyQuotaSource),
    ]
}

// --- tier 1: local ---

pub struct GitStatusSource;

impl Source for GitStatusSource {
    fn id(&self) -> SourceId {
        SourceId::Git
    }

    fn tier(&self) -> u8 {
        1
    }

    fn timeout_ms(&self) -> u64 {
        2_000
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError> {
        let Some(workspace) = ctx.session.workspace_dir.as_deref() else {
            return Err(FetchError::MissingInput {
                message: "session has no workspace directory".to_string(),
            });
        };

        let output = match run_command(
            "git",
            &["status", "--porcelain=v2", "--branch"],
            Some(workspace),
            ctx.effective_timeout(self.timeout_ms()),
        ) {
            Ok(output) => output,
            Err(FetchError::CommandFailed { ref stderr, .. })
                if stderr.contains("not a git repository") =>
            {
                return Err(FetchError::MissingInput {
                    message: "workspace is not a git repository".to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        Ok(SourceData::Git(parse_porcelain(&output.stdout)))
    }
}

/// Parse `git status --porcelain=v2 --branch` output.
pub(crate) fn parse_porcelain(output: &str) -> GitData {
    let mut data = GitData::default();
    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("# branch.head ") {
            data.branch = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("# branch.ab ") {
            for field in rest.split_whitespace() {
                if let Some(n) = field.strip_prefix('+') {
                    data.ahead = n.parse().unwrap_or(0);
                } else if let Some(n) = field.strip_prefix('-') {
                    data.behind = n.parse().unwrap_or(0);
                }
            }
        } else if line.starts_with("1 ") || line.starts_with("2 ") {
            let mut fields = line.split_whitespace();
            fields.next();
            if let Some(xy) = fields.next() {
                let mut flags = xy.chars();
                if flags.next().is_some_and(|x| x != '.') {
                    data.staged += 1;
                }
                if flags.next().is_some_and(|y| y != '.') {
                    data.unstaged += 1;
                }
            }
        } else if line.starts_with("u ") {
            data.conflicted += 1;
        } else if line.starts_with("? ") {
            data.untracked += 1;
        }
    }
    data
}

pub struct TranscriptSource;

impl Source for TranscriptSource {
    fn id(&self) -> SourceId {
        SourceId::Transcript
    }

    fn tier(&self) -> u8 {
        1
    }

    fn timeout_ms(&self) -> u64 {
        2_000
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError> {
        let Some(path) = ctx.session.transcript_path.as_deref() else {
            return Err(FetchError::MissingInput {
                message: "session has no transcript path".to_string(),
            });
        };
        if !path.exists() {
            return Err(FetchError::MissingInput {
                message: format!("transcript {} does not exist", path.display()),
            });
        }

        Ok(SourceData::Transcript(transcript::estimate(
            path,
            Some(MAX_TRANSCRIPT_LINES),
        )))
    }
}

// --- tier 2: external tools ---

pub struct CcusageSource;

impl Source for CcusageSource {
    fn id(&self) -> SourceId {
        SourceId::Billing
    }

    fn tier(&self) -> u8 {
        2
    }

    fn timeout_ms(&self) -> u64 {
        8_000
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError> {
        let configured = ctx.config.fetch.ccusage_command();
        let Some((program, mut args)) = split_command(configured) else {
            return Err(FetchError::ParseFailed {
                what: "ccusage command".to_string(),
                message: format!("'{configured}' is empty"),
            });
        };
        args.push("daily".to_string());
        args.push("--json".to_string());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = run_command(
            &program,
            &arg_refs,
            None,
            ctx.effective_timeout(self.timeout_ms()),
        )?;
        Ok(SourceData::Billing(parse_ccusage(&output.stdout)?))
    }
}

#[derive(Debug, Deserialize)]
struct CcusageReport {
    #[serde(default)]
    daily: Vec<CcusageDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CcusageDay {
    #[serde(default)]
    total_cost: f64,
    #[serde(default)]
    total_tokens: Option<u64>,
}

pub(crate) fn parse_ccusage(stdout: &str) -> Result<BillingData, FetchError> {
    let report: CcusageReport =
        serde_json::from_str(stdout).map_err(|e| FetchError::ParseFailed {
            what: "ccusage output".to_string(),
            message: e.to_string(),
        })?;

    // The daily list is ascending; the last entry is the current day
    let today = report.daily.last();
    Ok(BillingData {
        cost_today: today.map(|day| day.total_cost).unwrap_or(0.0),
        total_tokens: today.and_then(|day| day.total_tokens),
    })
}

pub struct HotswapStateSource;

impl Source for HotswapStateSource {
    fn id(&self) -> SourceId {
        SourceId::Hotswap
    }

    fn tier(&self) -> u8 {
        2
    }

    fn timeout_ms(&self) -> u64 {
        1_000
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError> {
        let state_path = hotswap_state_path(ctx)?;
        let content = match fs::read_to_string(&state_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::MissingInput {
                    message: format!("hotswap state {} does not exist", state_path.display()),
                });
            }
            Err(e) => {
                return Err(FetchError::Io {
                    path: state_path,
                    source: e,
                });
            }
        };

        Ok(SourceData::Hotswap(parse_hotswap_state(&content)?))
    }
}

fn hotswap_state_path(ctx: &FetchContext<'_>) -> Result<PathBuf, FetchError> {
    match &ctx.config.hotswap.state_path {
        Some(path) => Ok(path.clone()),
        None => GaugePaths::default_hotswap_state().map_err(|e| FetchError::MissingInput {
            message: format!("hotswap state path unresolvable: {e}"),
        }),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotswapStateFile {
    #[serde(default)]
    active_slot: Option<String>,
    #[serde(default)]
    active_email: Option<String>,
    #[serde(default)]
    slots: Option<serde_json::Value>,
    #[serde(default)]
    last_swap_at: Option<u64>,
}

pub(crate) fn parse_hotswap_state(content: &str) -> Result<HotswapData, FetchError> {
    let state: HotswapStateFile =
        serde_json::from_str(content).map_err(|e| FetchError::ParseFailed {
            what: "hotswap state".to_string(),
            message: e.to_string(),
        })?;

    let slot_count = state.slots.as_ref().and_then(|slots| match slots {
        serde_json::Value::Array(items) => Some(items.len() as u32),
        serde_json::Value::Object(map) => Some(map.len() as u32),
        _ => None,
    });

    Ok(HotswapData {
        active_slot: state.active_slot,
        active_email: state.active_email,
        slot_count,
        last_swap_at_ms: state.last_swap_at,
    })
}

// --- tier 3: account surfaces ---

pub struct OauthSource;

impl Source for OauthSource {
    fn id(&self) -> SourceId {
        SourceId::Oauth
    }

    fn tier(&self) -> u8 {
        3
    }

    fn timeout_ms(&self) -> u64 {
        10_000
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError> {
        let credentials_path = ctx.session.config_dir.join(".credentials.json");
        let content = match fs::read_to_string(&credentials_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::MissingInput {
                    message: format!("{} does not exist", credentials_path.display()),
                });
            }
            Err(e) => {
                return Err(FetchError::Io {
                    path: credentials_path,
                    source: e,
                });
            }
        };

        let mut data = parse_credentials(&content)?;

        if let Some(usage_command) = ctx.config.fetch.usage_command() {
            // Usage standing is additive; a broken usage command must not
            // discard valid credential data
            match run_usage_command(usage_command, ctx) {
                Ok(usage) => {
                    data.session_used_pct = usage.session_used_pct;
                    data.weekly_used_pct = usage.weekly_used_pct;
                    data.weekly_reset_at = usage.weekly_reset_at;
                }
                Err(e) => {
                    tracing::warn!(
                        event = "core.broker.usage_command_failed",
                        command = %usage_command,
                        error = %e,
                    );
                }
            }
        }

        Ok(SourceData::Oauth(data))
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(rename = "claudeAiOauth")]
    oauth: Option<CredentialsOauthSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsOauthSection {
    #[serde(default)]
    subscription_type: Option<String>,
    #[serde(default)]
    expires_at: Option<u64>,
}

pub(crate) fn parse_credentials(content: &str) -> Result<OauthData, FetchError> {
    let file: CredentialsFile =
        serde_json::from_str(content).map_err(|e| FetchError::ParseFailed {
            what: "credentials file".to_string(),
            message: e.to_string(),
        })?;

    let section = file.oauth.ok_or_else(|| FetchError::ParseFailed {
        what: "credentials file".to_string(),
        message: "missing claudeAiOauth section".to_string(),
    })?;

    Ok(OauthData {
        subscription_type: section.subscription_type,
        expires_at_ms: section.expires_at,
        ..Default::default()
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageReport {
    #[serde(default)]
    pub session_used_pct: Option<f64>,
    #[serde(default)]
    pub weekly_used_pct: Option<f64>,
    #[serde(default)]
    pub weekly_reset_at: Option<String>,
}

fn run_usage_command(command: &str, ctx: &FetchContext<'_>) -> Result<UsageReport, FetchError> {
    let Some((program, args)) = split_command(command) else {
        return Err(FetchError::ParseFailed {
            what: "usage command".to_string(),
            message: format!("'{command}' is empty"),
        });
    };
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = run_command(&program, &arg_refs, None, ctx.effective_timeout(10_000))?;
    serde_json::from_str(&output.stdout).map_err(|e| FetchError::ParseFailed {
        what: "usage command output".to_string(),
        message: e.to_string(),
    })
}

pub struct QuotaSource;

impl Source for QuotaSource {
    fn id(&self) -> SourceId {
        SourceId::Quota
    }

    fn tier(&self) -> u8 {
        3
    }

    fn timeout_ms(&self) -> u64 {
        500
    }

    fn dependencies(&self) -> &[SourceId] {
        &[SourceId::Oauth]
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError> {
        let oauth = resolved_oauth(ctx)?;

        // Session burn rate sharpens the score when the transcript resolved
        // earlier this cycle; without it the utilization terms stand alone
        let burn_rate_per_hour = ctx
            .resolved
            .get(&SourceId::Transcript)
            .and_then(|data| data.as_transcript())
            .map(|estimate| estimate.cost_per_hour)
            .unwrap_or(0.0);

        let assessment = urgency::assess(&UrgencyInput {
            weekly_used_pct: oauth.weekly_used_pct.unwrap_or(0.0),
            daily_used_pct: oauth.session_used_pct.unwrap_or(0.0),
            burn_rate_per_hour,
            remaining_budget_minutes: None,
        });

        Ok(SourceData::Quota(QuotaData {
            session_used_pct: oauth.session_used_pct,
            weekly_used_pct: oauth.weekly_used_pct,
            urgency_score: assessment.score,
            urgency_level: assessment.level,
            recommendation: assessment.recommendation,
        }))
    }
}

pub struct WeeklyQuotaSource;

impl Source for WeeklyQuotaSource {
    fn id(&self) -> SourceId {
        SourceId::Weekly
    }

    fn tier(&self) -> u8 {
        3
    }

    fn timeout_ms(&self) -> u64 {
        500
    }

    fn dependencies(&self) -> &[SourceId] {
        &[SourceId::Oauth, SourceId::Quota]
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<SourceData, FetchError> {
        let oauth = resolved_oauth(ctx)?;
        let quota = ctx
            .resolved
            .get(&SourceId::Quota)
            .and_then(|data| data.as_quota())
            .ok_or_else(|| FetchError::MissingInput {
                message: "quota data unresolved".to_string(),
            })?;

        Ok(SourceData::Weekly(WeeklyData {
            used_pct: quota.weekly_used_pct,
            reset_at: oauth.weekly_reset_at.clone(),
        }))
    }
}

fn resolved_oauth<'a>(ctx: &'a FetchContext<'_>) -> Result<&'a OauthData, FetchError> {
    ctx.resolved
        .get(&SourceId::Oauth)
        .and_then(|data| data.as_oauth())
        .ok_or_else(|| FetchError::MissingInput {
            message: "oauth data unresolved".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::types::SessionRecord;
    use gauge_config::GaugeConfig;
    use std::collections::BTreeMap;

    const NOW: u64 = 1_700_000_000_000;

    fn make_session(temp: &tempfile::TempDir) -> SessionRecord {
        SessionRecord::new("s1", temp.path().join(".claude"), NOW)
    }

    // --- porcelain parsing ---

    #[test]
    fn test_parse_porcelain_full_status() {
        let output = "\
# branch.oid 1234abcd
# branch.head main
# branch.upstream origin/main
# branch.ab +2 -1
1 .M N... 100644 100644 100644 aaaa bbbb src/lib.rs
1 M. N... 100644 100644 100644 aaaa bbbb src/main.rs
2 R. N... 100644 100644 100644 aaaa bbbb R100 new.rs\told.rs
u UU N... 100644 100644 100644 100644 aaaa bbbb cccc conflict.rs
? notes.txt
";
        let data = parse_porcelain(output);
        assert_eq!(data.branch.as_deref(), Some("main"));
        assert_eq!(data.ahead, 2);
        assert_eq!(data.behind, 1);
        assert_eq!(data.staged, 2); // 'M.' and 'R.'
        assert_eq!(data.unstaged, 1); // '.M'
        assert_eq!(data.conflicted, 1);
        assert_eq!(data.untracked, 1);
        assert!(data.is_dirty());
    }

    #[test]
    fn test_parse_porcelain_clean_tree() {
        let output = "# branch.oid 1234abcd\n# branch.head main\n";
        let data = parse_porcelain(output);
        assert_eq!(data.branch.as_deref(), Some("main"));
        assert!(!data.is_dirty());
        assert_eq!(data.ahead, 0);
    }

    #[test]
    fn test_parse_porcelain_detached_head() {
        let data = parse_porcelain("# branch.head (detached)\n");
        assert_eq!(data.branch.as_deref(), Some("(detached)"));
    }

    #[test]
    fn test_parse_porcelain_empty_output() {
        assert_eq!(parse_porcelain(""), GitData::default());
    }

    // --- git source ---

    #[test]
    fn test_git_source_requires_workspace() {
        let temp = tempfile::tempdir().unwrap();
        let session = make_session(&temp);
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        let err = GitStatusSource.fetch(&ctx).unwrap_err();
        assert!(err.is_missing_input());
    }

    #[test]
    fn test_git_source_reads_real_repository() {
        let temp = tempfile::tempdir().unwrap();
        run_command(
            "git",
            &["init", "--initial-branch=main"],
            Some(temp.path()),
            5_000,
        )
        .unwrap();
        std::fs::write(temp.path().join("notes.txt"), "x").unwrap();

        let mut session = make_session(&temp);
        session.workspace_dir = Some(temp.path().to_path_buf());
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        let data = GitStatusSource.fetch(&ctx).unwrap();
        let git = data.as_git().unwrap();
        assert_eq!(git.branch.as_deref(), Some("main"));
        assert_eq!(git.untracked, 1);
    }

    #[test]
    fn test_git_source_non_repository_is_missing_input() {
        let temp = tempfile::tempdir().unwrap();
        let mut session = make_session(&temp);
        session.workspace_dir = Some(temp.path().to_path_buf());
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        let err = GitStatusSource.fetch(&ctx).unwrap_err();
        assert!(err.is_missing_input(), "got {err:?}");
    }

    // --- transcript source ---

    #[test]
    fn test_transcript_source_estimates_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let transcript = temp.path().join("t.jsonl");
        std::fs::write(
            &transcript,
            r#"{"timestamp":"2025-06-01T10:00:00Z","message":{"model":"claude-sonnet-4","usage":{"input_tokens":100,"output_tokens":50}}}"#,
        )
        .unwrap();

        let mut session = make_session(&temp);
        session.transcript_path = Some(transcript);
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        let data = TranscriptSource.fetch(&ctx).unwrap();
        let estimate = data.as_transcript().unwrap();
        assert_eq!(estimate.total_tokens, 150);
        assert_eq!(estimate.message_count, 1);
    }

    #[test]
    fn test_transcript_source_without_path_is_missing_input() {
        let temp = tempfile::tempdir().unwrap();
        let session = make_session(&temp);
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        assert!(TranscriptSource.fetch(&ctx).unwrap_err().is_missing_input());
    }

    // --- ccusage parsing ---

    #[test]
    fn test_parse_ccusage_uses_last_day() {
        let stdout = r#"{
            "daily": [
                {"date": "2025-06-01", "totalCost": 12.5, "totalTokens": 100000},
                {"date": "2025-06-02", "totalCost": 40.3, "totalTokens": 250000}
            ]
        }"#;
        let data = parse_ccusage(stdout).unwrap();
        assert_eq!(data.cost_today, 40.3);
        assert_eq!(data.total_tokens, Some(250_000));
    }

    #[test]
    fn test_parse_ccusage_empty_days_is_zero() {
        let data = parse_ccusage(r#"{"daily": []}"#).unwrap();
        assert_eq!(data.cost_today, 0.0);
        assert_eq!(data.total_tokens, None);
    }

    #[test]
    fn test_parse_ccusage_rejects_garbage() {
        let err = parse_ccusage("command crashed").unwrap_err();
        assert!(matches!(err, FetchError::ParseFailed { .. }));
    }

    // --- hotswap state parsing ---

    #[test]
    fn test_parse_hotswap_state_with_slot_map() {
        let content = r#"{
            "activeSlot": "work",
            "activeEmail": "work@example.com",
            "slots": {"personal": {}, "work": {}},
            "lastSwapAt": 1700000000000
        }"#;
        let data = parse_hotswap_state(content).unwrap();
        assert_eq!(data.active_slot.as_deref(), Some("work"));
        assert_eq!(data.active_email.as_deref(), Some("work@example.com"));
        assert_eq!(data.slot_count, Some(2));
        assert_eq!(data.last_swap_at_ms, Some(1_700_000_000_000));
    }

    #[test]
    fn test_parse_hotswap_state_with_slot_array() {
        let data = parse_hotswap_state(r#"{"slots": [1, 2, 3]}"#).unwrap();
        assert_eq!(data.slot_count, Some(3));
        assert!(data.active_slot.is_none());
    }

    #[test]
    fn test_parse_hotswap_state_minimal() {
        let data = parse_hotswap_state("{}").unwrap();
        assert_eq!(data, HotswapData::default());
    }

    // --- credentials parsing ---

    #[test]
    fn test_parse_credentials_reads_subscription() {
        let content = r#"{
            "claudeAiOauth": {
                "accessToken": "sk-redacted",
                "subscriptionType": "max",
                "expiresAt": 1700000360000
            }
        }"#;
        let data = parse_credentials(content).unwrap();
        assert_eq!(data.subscription_type.as_deref(), Some("max"));
        assert_eq!(data.expires_at_ms, Some(1_700_000_360_000));
        assert!(data.weekly_used_pct.is_none());
    }

    #[test]
    fn test_parse_credentials_without_oauth_section_fails() {
        let err = parse_credentials(r#"{"other": {}}"#).unwrap_err();
        assert!(matches!(err, FetchError::ParseFailed { .. }));
    }

    #[test]
    fn test_oauth_source_missing_credentials_is_missing_input() {
        let temp = tempfile::tempdir().unwrap();
        let session = make_session(&temp);
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        assert!(OauthSource.fetch(&ctx).unwrap_err().is_missing_input());
    }

    #[test]
    fn test_oauth_source_reads_credentials_file() {
        let temp = tempfile::tempdir().unwrap();
        let session = make_session(&temp);
        std::fs::create_dir_all(&session.config_dir).unwrap();
        std::fs::write(
            session.config_dir.join(".credentials.json"),
            r#"{"claudeAiOauth": {"subscriptionType": "pro", "expiresAt": 42}}"#,
        )
        .unwrap();

        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        let data = OauthSource.fetch(&ctx).unwrap();
        let oauth = data.as_oauth().unwrap();
        assert_eq!(oauth.subscription_type.as_deref(), Some("pro"));
    }

    // --- derived quota sources ---

    fn oauth_payload() -> SourceData {
        SourceData::Oauth(OauthData {
            subscription_type: Some("max".to_string()),
            expires_at_ms: None,
            session_used_pct: Some(40.0),
            weekly_used_pct: Some(90.0),
            weekly_reset_at: Some("2025-06-08T00:00:00Z".to_string()),
        })
    }

    #[test]
    fn test_quota_source_derives_from_oauth() {
        let temp = tempfile::tempdir().unwrap();
        let session = make_session(&temp);
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let mut resolved = BTreeMap::new();
        resolved.insert(SourceId::Oauth, oauth_payload());
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        let data = QuotaSource.fetch(&ctx).unwrap();
        let quota = data.as_quota().unwrap();
        assert_eq!(quota.weekly_used_pct, Some(90.0));
        assert_eq!(quota.session_used_pct, Some(40.0));
        // 90 * 0.6 + 40 * 0.3 = 66
        assert!((quota.urgency_score - 66.0).abs() < 1e-9);
    }

    #[test]
    fn test_quota_source_without_oauth_is_missing_input() {
        let temp = tempfile::tempdir().unwrap();
        let session = make_session(&temp);
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let resolved = BTreeMap::new();
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        assert!(QuotaSource.fetch(&ctx).unwrap_err().is_missing_input());
    }

    #[test]
    fn test_weekly_source_combines_oauth_and_quota() {
        let temp = tempfile::tempdir().unwrap();
        let session = make_session(&temp);
        let config = GaugeConfig::default();
        let paths = GaugePaths::from_dir(temp.path().join(".gauge"));
        let mut resolved = BTreeMap::new();
        resolved.insert(SourceId::Oauth, oauth_payload());
        resolved.insert(
            SourceId::Quota,
            SourceData::Quota(QuotaData {
                session_used_pct: Some(40.0),
                weekly_used_pct: Some(90.0),
                urgency_score: 66.0,
                urgency_level: urgency::UrgencyLevel::Medium,
                recommendation: urgency::Recommendation::None,
            }),
        );
        let ctx = FetchContext {
            session: &session,
            config: &config,
            paths: &paths,
            now_ms: NOW,
            resolved: &resolved,
        };

        let data = WeeklyQuotaSource.fetch(&ctx).unwrap();
        let weekly = data.as_weekly().unwrap();
        assert_eq!(weekly.used_pct, Some(90.0));
        assert_eq!(weekly.reset_at.as_deref(), Some("2025-06-08T00:00:00Z"));
    }

    // --- descriptor wiring ---

    #[test]
    fn test_default_sources_are_in_tier_order() {
        let sources = default_sources();
        let tiers: Vec<u8> = sources.iter().map(|source| source.tier()).collect();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let sources = default_sources();
        let order: Vec<SourceId> = sources.iter().map(|source| source.id()).collect();
        for (index, source) in sources.iter().enumerate() {
            for dep in source.dependencies() {
                let dep_index = order.iter().position(|id| id == dep).unwrap();
                assert!(dep_index < index, "{dep} must precede {}", source.id());
            }
        }
    }

    #[test]
    fn test_session_scoped_matches_category_config() {
        assert!(GitStatusSource.session_scoped());
        assert!(TranscriptSource.session_scoped());
        assert!(!CcusageSource.session_scoped());
        assert!(!OauthSource.session_scoped());
    }
}
