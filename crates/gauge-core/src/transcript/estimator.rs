//! Transcript-based session cost estimation.
//!
//! Walks the assistant's JSONL transcript, prices each usage-bearing message
//! by its model, and derives session duration and burn rates. Transcripts are
//! written by another program while we read, so every line parse is tolerant.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::freshness::Category;
use crate::transcript::pricing::{cost_usd, pricing_for};
use crate::transcript::types::{CostEstimate, TranscriptLine};

/// Cost per 100KiB of transcript when no message carries usage data.
const FALLBACK_COST_PER_CHUNK: f64 = 0.02;
const FALLBACK_CHUNK_BYTES: f64 = 102_400.0;

/// Estimate session cost from a transcript file.
///
/// `max_lines` caps how much of the transcript tail is examined. A missing or
/// unreadable transcript yields the zero estimate, never an error.
pub fn estimate(transcript_path: &Path, max_lines: Option<usize>) -> CostEstimate {
    let content = match fs::read_to_string(transcript_path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(
                event = "core.transcript.read_failed",
                file = %transcript_path.display(),
                error = %e,
            );
            return CostEstimate::default();
        }
    };

    let file_bytes = content.len() as u64;
    let all_lines: Vec<&str> = content.lines().collect();
    let lines = match max_lines {
        Some(cap) if all_lines.len() > cap => &all_lines[all_lines.len() - cap..],
        _ => &all_lines[..],
    };

    let mut cost = 0.0_f64;
    let mut total_tokens = 0_u64;
    let mut message_count = 0_u64;
    let mut first_ts: Option<i64> = None;
    let mut last_ts: Option<i64> = None;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let parsed = match serde_json::from_str::<TranscriptLine>(line) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };

        if let Some(ts) = parsed
            .timestamp
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.timestamp_millis())
        {
            if first_ts.is_none() {
                first_ts = Some(ts);
            }
            last_ts = Some(ts);
        }

        let Some(message) = parsed.message else {
            continue;
        };
        let Some(usage) = message.usage else {
            continue;
        };

        let pricing = pricing_for(message.model.as_deref().unwrap_or_default());
        cost += cost_usd(
            &pricing,
            usage.input_tokens,
            usage.output_tokens,
            usage.cache_creation_input_tokens,
            usage.cache_read_input_tokens,
        );
        total_tokens += usage.total();
        message_count += 1;
    }

    if message_count == 0 {
        // Old transcript formats carry no usage blocks; approximate by size
        cost = file_bytes as f64 / FALLBACK_CHUNK_BYTES * FALLBACK_COST_PER_CHUNK;
        total_tokens = 0;
    }

    let session_duration_ms = match (first_ts, last_ts) {
        (Some(first), Some(last)) => (last - first).max(0) as u64,
        _ => 0,
    };

    let hours = session_duration_ms as f64 / 3_600_000.0;
    let minutes = session_duration_ms as f64 / 60_000.0;
    let cost_per_hour = if hours > 0.0 { cost / hours } else { 0.0 };
    let tokens_per_minute = if minutes > 0.0 {
        total_tokens as f64 / minutes
    } else {
        0.0
    };

    CostEstimate {
        cost_usd: cost,
        total_tokens,
        message_count,
        session_duration_ms,
        cost_per_hour,
        tokens_per_minute,
        is_fresh: transcript_is_fresh(transcript_path),
    }
}

/// Whether the transcript file was modified within the transcript category's
/// fresh window.
fn transcript_is_fresh(transcript_path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(transcript_path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or_default();
    (age.as_millis() as u64) <= Category::Transcript.config().fresh_ms
}
