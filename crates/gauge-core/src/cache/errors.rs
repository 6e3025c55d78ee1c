use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to persist cache to {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache document: {source}")]
    SerializeFailed {
        #[from]
        source: serde_json::Error,
    },
}
