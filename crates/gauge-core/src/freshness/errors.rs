use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FreshnessError {
    #[error("Failed to persist cooldown state to {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cooldown state: {source}")]
    SerializeFailed {
        #[from]
        source: serde_json::Error,
    },
}
