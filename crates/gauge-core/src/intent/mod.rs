//! Cross-process refresh-intent markers.
//!
//! One marker file per category under the refresh directory. The marker's
//! mtime is the signal: rewriting it stamps "a refresh was requested now",
//! and its age drives the context-aware indicator thresholds. Content is
//! informational only.

pub mod errors;

use std::fs;
use std::time::SystemTime;

use crate::clock::now_ms;
use crate::freshness::Category;
use gauge_paths::GaugePaths;

pub use errors::IntentError;

/// Record "a refresh was requested now" for the category, superseding any
/// earlier intent.
pub fn signal_refresh_needed(paths: &GaugePaths, category: Category) -> Result<(), IntentError> {
    let marker = paths.intent_marker(category.as_str());
    if let Some(parent) = marker.parent() {
        fs::create_dir_all(parent).map_err(|e| IntentError::WriteFailed {
            path: marker.clone(),
            source: e,
        })?;
    }

    // Rewriting bumps mtime even when the marker already exists
    fs::write(&marker, format!("{}\n", now_ms())).map_err(|e| IntentError::WriteFailed {
        path: marker.clone(),
        source: e,
    })?;

    tracing::debug!(
        event = "core.intent.signaled",
        category = %category,
        marker = %marker.display(),
    );
    Ok(())
}

/// Age of the category's refresh intent in milliseconds, from the marker's
/// mtime. `None` when no intent is recorded. A marker with an unreadable
/// mtime counts as no intent.
pub fn intent_age_ms(paths: &GaugePaths, category: Category) -> Option<u64> {
    let marker = paths.intent_marker(category.as_str());
    let metadata = match fs::metadata(&marker) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(
                event = "core.intent.metadata_failed",
                marker = %marker.display(),
                error = %e,
            );
            return None;
        }
    };

    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(e) => {
            tracing::warn!(
                event = "core.intent.mtime_unavailable",
                marker = %marker.display(),
                error = %e,
            );
            return None;
        }
    };

    // A marker touched "in the future" reads as a just-created intent
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or_default();
    Some(age.as_millis() as u64)
}

/// Remove the category's marker. Absent markers are fine.
pub fn clear(paths: &GaugePaths, category: Category) -> Result<(), IntentError> {
    let marker = paths.intent_marker(category.as_str());
    match fs::remove_file(&marker) {
        Ok(()) => {
            tracing::debug!(event = "core.intent.cleared", category = %category);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IntentError::ClearFailed {
            path: marker,
            source: e,
        }),
    }
}
