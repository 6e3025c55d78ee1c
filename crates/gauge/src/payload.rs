//! Stdin payload from the assistant host.
//!
//! On every render the host pipes a JSON document describing the active
//! session. Every field is optional and malformed input degrades to an empty
//! payload; the statusline still renders from cache in that case.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use serde::Deserialize;

use gauge_core::broker::{SessionRecord, SourceId};
use gauge_core::cache::{ContextData, ModelData, SourceData};
use gauge_paths::GaugePaths;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StatuslinePayload {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
    #[serde(default)]
    pub model: Option<PayloadModel>,
    #[serde(default)]
    pub workspace: Option<PayloadWorkspace>,
    #[serde(default)]
    pub context_window: Option<PayloadContextWindow>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PayloadModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PayloadWorkspace {
    #[serde(default)]
    pub current_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PayloadContextWindow {
    #[serde(default)]
    pub used_tokens: Option<u64>,
    #[serde(default)]
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub used_pct: Option<f64>,
}

/// Read the payload from stdin. A terminal stdin means the command was run
/// by hand; don't block waiting for input that will never come.
pub fn read_stdin_payload() -> StatuslinePayload {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return StatuslinePayload::default();
    }
    let mut raw = String::new();
    if let Err(e) = stdin.lock().read_to_string(&mut raw) {
        tracing::warn!(event = "cli.payload.read_failed", error = %e);
        return StatuslinePayload::default();
    }
    parse_payload(&raw)
}

pub fn parse_payload(raw: &str) -> StatuslinePayload {
    if raw.trim().is_empty() {
        return StatuslinePayload::default();
    }
    match serde_json::from_str(raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(
                event = "cli.payload.invalid_json",
                error = %e,
                message = "Malformed statusline payload, rendering from cache only",
            );
            StatuslinePayload::default()
        }
    }
}

impl StatuslinePayload {
    /// Build the session record this invocation acts as. The config
    /// directory comes from `CLAUDE_CONFIG_DIR` when set, which is also
    /// what distinguishes sessions running against different accounts.
    pub fn session_record(&self, now_ms: u64) -> SessionRecord {
        let config_dir = std::env::var_os("CLAUDE_CONFIG_DIR")
            .map(PathBuf::from)
            .or_else(|| GaugePaths::default_assistant_config_dir().ok())
            .unwrap_or_else(|| PathBuf::from(".claude"));

        let session_id = self.session_id.clone().unwrap_or_else(|| "default".to_string());
        let mut record = SessionRecord::new(session_id, config_dir, now_ms);
        record.transcript_path = self.transcript_path.clone();
        record.workspace_dir = self
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.current_dir.clone());
        record
    }

    /// Payload-borne data to publish into the cache before rendering.
    pub fn push_items(&self) -> Vec<(SourceId, SourceData)> {
        let mut items = Vec::new();
        if let Some(model) = &self.model {
            items.push((
                SourceId::Model,
                SourceData::Model(ModelData {
                    id: model.id.clone(),
                    display_name: model.display_name.clone(),
                }),
            ));
        }
        if let Some(window) = &self.context_window {
            let used_pct = window.used_pct.or_else(|| match (window.used_tokens, window.max_tokens) {
                (Some(used), Some(max)) if max > 0 => Some(used as f64 / max as f64 * 100.0),
                _ => None,
            });
            items.push((
                SourceId::Context,
                SourceData::Context(ContextData {
                    used_tokens: window.used_tokens,
                    max_tokens: window.max_tokens,
                    used_pct,
                }),
            ));
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_parse_full_payload() {
        let raw = r#"{
            "session_id": "abc-123",
            "transcript_path": "/tmp/t.jsonl",
            "model": {"id": "claude-sonnet-4", "display_name": "Sonnet"},
            "workspace": {"current_dir": "/home/dev/proj"},
            "context_window": {"used_tokens": 50000, "max_tokens": 200000}
        }"#;
        let payload = parse_payload(raw);
        assert_eq!(payload.session_id.as_deref(), Some("abc-123"));
        assert_eq!(
            payload.transcript_path.as_deref(),
            Some(std::path::Path::new("/tmp/t.jsonl"))
        );
        assert_eq!(
            payload.model.as_ref().unwrap().display_name.as_deref(),
            Some("Sonnet")
        );
        assert_eq!(
            payload.workspace.as_ref().unwrap().current_dir.as_deref(),
            Some(std::path::Path::new("/home/dev/proj"))
        );
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_payload(""), StatuslinePayload::default());
        assert_eq!(parse_payload("  \n"), StatuslinePayload::default());
    }

    #[test]
    fn test_parse_malformed_input_degrades() {
        assert_eq!(parse_payload("{not json"), StatuslinePayload::default());
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let payload = parse_payload(r#"{"session_id": "s", "hook_event_name": "Status"}"#);
        assert_eq!(payload.session_id.as_deref(), Some("s"));
    }

    #[test]
    fn test_session_record_uses_env_config_dir() {
        let payload = parse_payload(r#"{"session_id": "s1"}"#);
        temp_env::with_var("CLAUDE_CONFIG_DIR", Some("/tmp/alt-claude"), || {
            let record = payload.session_record(NOW);
            assert_eq!(record.session_id, "s1");
            assert_eq!(record.config_dir, PathBuf::from("/tmp/alt-claude"));
            assert_eq!(record.registered_at, NOW);
        });
    }

    #[test]
    fn test_session_record_without_session_id() {
        let record = StatuslinePayload::default().session_record(NOW);
        assert_eq!(record.session_id, "default");
        assert!(record.transcript_path.is_none());
    }

    #[test]
    fn test_push_items_carries_model_and_context() {
        let payload = parse_payload(
            r#"{
                "model": {"id": "claude-sonnet-4", "display_name": "Sonnet"},
                "context_window": {"used_tokens": 50000, "max_tokens": 200000}
            }"#,
        );
        let items = payload.push_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0, SourceId::Model);
        let context = items[1].1.as_context().unwrap();
        assert_eq!(context.used_pct, Some(25.0));
    }

    #[test]
    fn test_push_items_respects_explicit_pct() {
        let payload =
            parse_payload(r#"{"context_window": {"used_pct": 62.5}}"#);
        let items = payload.push_items();
        let context = items[0].1.as_context().unwrap();
        assert_eq!(context.used_pct, Some(62.5));
        assert!(context.used_tokens.is_none());
    }

    #[test]
    fn test_push_items_empty_payload() {
        assert!(StatuslinePayload::default().push_items().is_empty());
    }
}
