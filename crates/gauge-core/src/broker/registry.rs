//! Session registration files.
//!
//! One JSON file per session under `sessions/`, written atomically. Readers
//! are tolerant: a malformed registration reads back as "not registered"
//! rather than an error, since a session can always re-register on its next
//! invocation.

use std::fs;
use std::path::Path;

use crate::broker::errors::BrokerError;
use crate::broker::types::SessionRecord;
use gauge_paths::GaugePaths;

/// Persist a session registration, overwriting any prior one.
pub fn register_session(paths: &GaugePaths, record: &SessionRecord) -> Result<(), BrokerError> {
    let file = paths.session_file(&record.session_id);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).map_err(|e| BrokerError::SessionPersistFailed {
            session_id: record.session_id.clone(),
            source: e,
        })?;
    }

    let json = serde_json::to_string(record)?;
    let temp_file = temp_path(&file);

    if let Err(e) = fs::write(&temp_file, &json) {
        cleanup_temp_file(&temp_file, &e);
        return Err(BrokerError::SessionPersistFailed {
            session_id: record.session_id.clone(),
            source: e,
        });
    }
    if let Err(e) = fs::rename(&temp_file, &file) {
        cleanup_temp_file(&temp_file, &e);
        return Err(BrokerError::SessionPersistFailed {
            session_id: record.session_id.clone(),
            source: e,
        });
    }

    tracing::debug!(
        event = "core.broker.session_registered",
        session_id = %record.session_id,
        config_dir = %record.config_dir.display(),
    );
    Ok(())
}

/// Read back a registration. Missing or unparseable files yield `None`.
pub fn session(paths: &GaugePaths, session_id: &str) -> Option<SessionRecord> {
    let file = paths.session_file(session_id);
    let content = match fs::read_to_string(&file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(
                event = "core.broker.session_read_error",
                session_id = %session_id,
                error = %e,
            );
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(
                event = "core.broker.session_invalid_json",
                session_id = %session_id,
                file = %file.display(),
                error = %e,
                message = "Ignoring unparseable session registration"
            );
            None
        }
    }
}

fn temp_path(path: &Path) -> std::path::PathBuf {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    std::path::PathBuf::from(temp)
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        tracing::warn!(
            event = "core.broker.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            message = "Failed to clean up temp file after write error"
        );
    }
}
