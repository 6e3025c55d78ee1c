use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("Failed to write refresh marker {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clear refresh marker {path}: {source}")]
    ClearFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
