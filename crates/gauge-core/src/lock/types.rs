use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Contents of a lock file. Diagnostic only; the file's existence is the lock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LockInfo {
    pub pid: u32,
    pub acquired_at: u64,
}

/// Proof of a held lock. Dropping the token releases the lock, so a panicking
/// holder does not leave the file behind; explicit release is preferred where
/// the caller wants the error.
#[derive(Debug)]
pub struct LockToken {
    name: String,
    path: PathBuf,
    released: bool,
}

impl LockToken {
    pub(crate) fn new(name: String, path: PathBuf) -> Self {
        Self {
            name,
            path,
            released: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock, removing its file. A file already removed (by a
    /// forced release) is not an error.
    pub fn release(mut self) -> Result<(), crate::lock::errors::LockError> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(event = "core.lock.released", name = %self.name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(crate::lock::errors::LockError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

impl Drop for LockToken {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(event = "core.lock.released_on_drop", name = %self.name);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    event = "core.lock.drop_release_failed",
                    name = %self.name,
                    file = %self.path.display(),
                    error = %e,
                    message = "Failed to remove lock file on drop"
                );
            }
        }
    }
}

/// Observed state of one named lock, for operator display.
#[derive(Debug, Clone, PartialEq)]
pub struct LockStatus {
    pub name: String,
    pub holder: Option<LockInfo>,
    /// Whether the holder pid maps to a live process. `None` when there is no
    /// parseable holder.
    pub holder_alive: Option<bool>,
}
