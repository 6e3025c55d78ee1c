use serde::{Deserialize, Serialize};

/// Cost and activity summary derived from a session transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub cost_usd: f64,
    pub total_tokens: u64,
    pub message_count: u64,
    pub session_duration_ms: u64,
    pub cost_per_hour: f64,
    pub tokens_per_minute: f64,
    /// Whether the transcript file itself was recently written.
    pub is_fresh: bool,
}

/// One JSONL transcript line. Unknown fields are ignored; lines missing the
/// interesting parts still parse and simply contribute nothing.
#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptLine {
    pub timestamp: Option<String>,
    pub message: Option<TranscriptMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptMessage {
    pub model: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens
            + self.output_tokens
            + self.cache_creation_input_tokens
            + self.cache_read_input_tokens
    }
}
