//! Reader for the account-failover event log.
//!
//! The log is an append-only JSONL file owned by the external hotswap tool;
//! this side only ever reads it. Partial trailing lines are expected while
//! the writer is mid-append, so unparseable lines are skipped, never fatal.

pub mod types;

use std::path::Path;

use crate::clock::now_ms;
pub use types::{EventType, FailoverEvent};

/// Events newer than this still produce a swap notification.
pub const RECENT_WINDOW_MS: u64 = 300_000;

/// Read all parseable events, ascending by timestamp. A missing or empty log
/// yields no events.
pub fn read_events(path: &Path) -> Vec<FailoverEvent> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(
                event = "core.events.read_error",
                file = %path.display(),
                error = %e,
                message = "Failed to read failover event log"
            );
            return Vec::new();
        }
    };

    let mut events: Vec<FailoverEvent> = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<FailoverEvent>(line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(
                    event = "core.events.line_invalid",
                    file = %path.display(),
                    line = line_no + 1,
                    error = %e,
                    message = "Skipping malformed failover event line"
                );
            }
        }
    }

    events.sort_by_key(|event| event.timestamp);
    events
}

/// Whether the event happened within [`RECENT_WINDOW_MS`] of now.
pub fn is_recent(event: &FailoverEvent) -> bool {
    is_recent_at(now_ms(), event)
}

pub fn is_recent_at(now_ms: u64, event: &FailoverEvent) -> bool {
    now_ms.saturating_sub(event.timestamp) < RECENT_WINDOW_MS
}

/// Notification line for the most recent event, when it is recent enough to
/// still matter. Older history produces nothing.
pub fn swap_notification(events: &[FailoverEvent]) -> Option<String> {
    swap_notification_at(now_ms(), events)
}

pub fn swap_notification_at(now_ms: u64, events: &[FailoverEvent]) -> Option<String> {
    let event = events.last()?;
    if !is_recent_at(now_ms, event) {
        return None;
    }

    let verb = match event.event_type {
        EventType::Swap => "swapped to",
        EventType::Failover => "failed over to",
        EventType::Restore => "restored to",
        EventType::Manual => "switched to",
    };
    let elapsed = format_elapsed(now_ms.saturating_sub(event.timestamp));
    Some(format!("{verb} {} {elapsed} ago", event.target()))
}

/// `"<n>s"` below one minute, `"<n>m"` beyond.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    if elapsed_ms < 60_000 {
        format!("{}s", elapsed_ms / 1000)
    } else {
        format!("{}m", elapsed_ms / 60_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const NOW: u64 = 1_700_000_000_000;

    fn write_log(temp: &tempfile::TempDir, lines: &[String]) -> PathBuf {
        let path = temp.path().join("events.jsonl");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn event_line(timestamp: u64, event_type: &str) -> String {
        format!(r#"{{"timestamp": {timestamp}, "type": "{event_type}", "toEmail": "work@example.com"}}"#)
    }

    // --- read_events ---

    #[test]
    fn test_missing_log_yields_no_events() {
        let temp = tempfile::tempdir().unwrap();
        assert!(read_events(&temp.path().join("absent.jsonl")).is_empty());
    }

    #[test]
    fn test_empty_log_yields_no_events() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_log(&temp, &[]);
        assert!(read_events(&path).is_empty());
    }

    #[test]
    fn test_all_event_types_parse_in_ascending_order() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_log(
            &temp,
            &[
                event_line(1000, "swap"),
                event_line(2000, "failover"),
                event_line(3000, "restore"),
                event_line(4000, "manual"),
            ],
        );

        let events = read_events(&path);
        assert_eq!(events.len(), 4);
        let types: Vec<EventType> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::Swap,
                EventType::Failover,
                EventType::Restore,
                EventType::Manual,
            ]
        );
        assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_log(
            &temp,
            &[
                event_line(1000, "swap"),
                "this is not an event".to_string(),
                r#"{"timestamp": 1500, "type": "swap""#.to_string(),
                event_line(2000, "manual"),
            ],
        );

        let events = read_events(&path);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, 1000);
        assert_eq!(events[1].timestamp, 2000);
    }

    #[test]
    fn test_line_without_timestamp_is_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_log(
            &temp,
            &[
                r#"{"type": "swap", "toEmail": "work@example.com"}"#.to_string(),
                event_line(1000, "swap"),
            ],
        );
        assert_eq!(read_events(&path).len(), 1);
    }

    #[test]
    fn test_out_of_order_lines_are_sorted() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_log(
            &temp,
            &[
                event_line(3000, "restore"),
                event_line(1000, "swap"),
                event_line(2000, "failover"),
            ],
        );

        let timestamps: Vec<u64> = read_events(&path).iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
    }

    // --- recency ---

    #[test]
    fn test_recency_boundary() {
        let recent = FailoverEvent {
            timestamp: NOW - (RECENT_WINDOW_MS - 1),
            event_type: EventType::Swap,
            from_slot: None,
            to_slot: None,
            from_email: None,
            to_email: None,
            reason: None,
        };
        let old = FailoverEvent {
            timestamp: NOW - RECENT_WINDOW_MS,
            ..recent.clone()
        };
        assert!(is_recent_at(NOW, &recent));
        assert!(!is_recent_at(NOW, &old));
    }

    #[test]
    fn test_future_event_counts_as_recent() {
        let event = FailoverEvent {
            timestamp: NOW + 10_000,
            event_type: EventType::Swap,
            from_slot: None,
            to_slot: None,
            from_email: None,
            to_email: None,
            reason: None,
        };
        assert!(is_recent_at(NOW, &event));
    }

    // --- notifications ---

    fn make_event(timestamp: u64, event_type: EventType) -> FailoverEvent {
        FailoverEvent {
            timestamp,
            event_type,
            from_slot: Some("slot-1".to_string()),
            to_slot: Some("slot-2".to_string()),
            from_email: None,
            to_email: Some("work@example.com".to_string()),
            reason: None,
        }
    }

    #[test]
    fn test_notification_for_recent_swap() {
        let events = vec![make_event(NOW - 45_000, EventType::Swap)];
        let text = swap_notification_at(NOW, &events).unwrap();
        assert_eq!(text, "swapped to work@example.com 45s ago");
    }

    #[test]
    fn test_notification_uses_minutes_beyond_sixty_seconds() {
        let events = vec![make_event(NOW - 120_000, EventType::Failover)];
        let text = swap_notification_at(NOW, &events).unwrap();
        assert_eq!(text, "failed over to work@example.com 2m ago");
    }

    #[test]
    fn test_notification_only_from_most_recent_event() {
        let events = vec![
            make_event(NOW - 10_000, EventType::Swap),
            make_event(NOW - 5_000, EventType::Restore),
        ];
        let text = swap_notification_at(NOW, &events).unwrap();
        assert!(text.starts_with("restored to"));
    }

    #[test]
    fn test_no_notification_for_old_events() {
        let events = vec![make_event(NOW - RECENT_WINDOW_MS, EventType::Swap)];
        assert!(swap_notification_at(NOW, &events).is_none());
    }

    #[test]
    fn test_no_notification_without_events() {
        assert!(swap_notification_at(NOW, &[]).is_none());
    }

    #[test]
    fn test_notification_slot_fallback() {
        let mut event = make_event(NOW - 30_000, EventType::Manual);
        event.to_email = None;
        let text = swap_notification_at(NOW, &[event]).unwrap();
        assert_eq!(text, "switched to slot-2 30s ago");
    }

    #[test]
    fn test_format_elapsed_units() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(59_999), "59s");
        assert_eq!(format_elapsed(60_000), "1m");
        assert_eq!(format_elapsed(299_000), "4m");
    }
}
