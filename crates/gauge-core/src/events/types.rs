use serde::{Deserialize, Serialize};

/// One line of the account failover log, appended by the external hotswap
/// tool. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailoverEvent {
    /// Epoch milliseconds. Lines without it are dropped by the reader.
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FailoverEvent {
    /// The account the event moved to, for display. Email wins over slot.
    pub fn target(&self) -> &str {
        self.to_email
            .as_deref()
            .or(self.to_slot.as_deref())
            .unwrap_or("?")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Swap,
    Failover,
    Restore,
    Manual,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Swap => "swap",
            EventType::Failover => "failover",
            EventType::Restore => "restore",
            EventType::Manual => "manual",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_prefers_email_over_slot() {
        let event = FailoverEvent {
            timestamp: 1,
            event_type: EventType::Swap,
            from_slot: None,
            to_slot: Some("slot-2".to_string()),
            from_email: None,
            to_email: Some("work@example.com".to_string()),
            reason: None,
        };
        assert_eq!(event.target(), "work@example.com");
    }

    #[test]
    fn test_target_falls_back_to_slot_then_placeholder() {
        let mut event = FailoverEvent {
            timestamp: 1,
            event_type: EventType::Swap,
            from_slot: None,
            to_slot: Some("slot-2".to_string()),
            from_email: None,
            to_email: None,
            reason: None,
        };
        assert_eq!(event.target(), "slot-2");

        event.to_slot = None;
        assert_eq!(event.target(), "?");
    }

    #[test]
    fn test_event_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&EventType::Failover).unwrap(),
            "\"failover\""
        );
        let parsed: EventType = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(parsed, EventType::Manual);
    }

    #[test]
    fn test_event_parses_with_camel_case_fields() {
        let event: FailoverEvent = serde_json::from_str(
            r#"{"timestamp": 1000, "type": "swap", "fromSlot": "a", "toSlot": "b", "toEmail": "b@example.com"}"#,
        )
        .unwrap();
        assert_eq!(event.timestamp, 1000);
        assert_eq!(event.event_type, EventType::Swap);
        assert_eq!(event.from_slot.as_deref(), Some("a"));
        assert_eq!(event.target(), "b@example.com");
    }
}
