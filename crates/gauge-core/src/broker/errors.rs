use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Session '{session_id}' is not registered")]
    SessionNotFound { session_id: String },

    #[error("Failed to persist session '{session_id}': {source}")]
    SessionPersistFailed {
        session_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session record: {source}")]
    SerializeFailed {
        #[from]
        source: serde_json::Error,
    },
}

/// Why a single source fetch produced no data. Missing-input failures are
/// skips, not errors: they never start a cooldown.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Command '{command}' not found on PATH")]
    CommandNotFound { command: String },

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("Command '{command}' exited with status {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to parse {what}: {message}")]
    ParseFailed { what: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing input: {message}")]
    MissingInput { message: String },
}

impl FetchError {
    /// True when the source simply has nothing to work from, e.g. a session
    /// without a transcript or a workspace outside any git repository.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, FetchError::MissingInput { .. })
    }
}
