use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Lock '{name}' is already held")]
    Held {
        name: String,
        holder_pid: Option<u32>,
    },

    #[error("Failed to access lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize lock info: {source}")]
    SerializeFailed {
        #[from]
        source: serde_json::Error,
    },
}
