//! Persisted per-category fetch cooldowns.
//!
//! Every invocation is a fresh process, so cooldown state lives in a small
//! JSON file mapping category name to "suppressed until" (ms epoch), read on
//! load and rewritten atomically on every change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::clock::now_ms;
use crate::freshness::errors::FreshnessError;
use crate::freshness::types::Category;
use gauge_paths::GaugePaths;

#[derive(Debug)]
pub struct CooldownStore {
    path: PathBuf,
    until: BTreeMap<Category, u64>,
}

impl CooldownStore {
    pub fn load(paths: &GaugePaths) -> Self {
        Self::load_from(paths.cooldowns_file())
    }

    /// Load cooldown state from an explicit path. Missing file means no
    /// cooldowns; malformed content is dropped with a warning, never an error.
    pub fn load_from(path: PathBuf) -> Self {
        let until = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<Category, u64>>(&content) {
                Ok(until) => until,
                Err(e) => {
                    tracing::warn!(
                        event = "core.freshness.cooldowns_invalid_json",
                        file = %path.display(),
                        error = %e,
                        message = "Failed to parse cooldown state, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(
                    event = "core.freshness.cooldowns_read_error",
                    file = %path.display(),
                    error = %e,
                    message = "Failed to read cooldown state, starting empty"
                );
                BTreeMap::new()
            }
        };
        Self { path, until }
    }

    /// Whether a failure cooldown is currently suppressing fetches.
    pub fn cooldown_active_at(&self, now_ms: u64, category: Category) -> bool {
        match self.until.get(&category) {
            Some(until) => now_ms < *until,
            None => false,
        }
    }

    pub fn cooldown_active(&self, category: Category) -> bool {
        self.cooldown_active_at(now_ms(), category)
    }

    /// False only while a cooldown is active; zero-cooldown categories are
    /// always refetchable.
    pub fn should_refetch_at(&self, now_ms: u64, category: Category) -> bool {
        !self.cooldown_active_at(now_ms, category)
    }

    pub fn should_refetch(&self, category: Category) -> bool {
        self.should_refetch_at(now_ms(), category)
    }

    /// Time left on an active cooldown, for the status view.
    pub fn remaining_ms_at(&self, now_ms: u64, category: Category) -> Option<u64> {
        self.until
            .get(&category)
            .and_then(|until| until.checked_sub(now_ms))
            .filter(|remaining| *remaining > 0)
    }

    /// Record a fetch outcome. Failure arms the category's cooldown; success
    /// clears it. Changes persist immediately.
    pub fn record_fetch_at(
        &mut self,
        now_ms: u64,
        category: Category,
        success: bool,
    ) -> Result<(), FreshnessError> {
        let config = category.config();
        let changed = if success {
            self.until.remove(&category).is_some()
        } else if config.cooldown_ms > 0 {
            self.until.insert(category, now_ms + config.cooldown_ms);
            true
        } else {
            false
        };

        if changed {
            self.save()?;
            tracing::debug!(
                event = "core.freshness.cooldown_recorded",
                category = %category,
                success = success,
            );
        }
        Ok(())
    }

    pub fn record_fetch(&mut self, category: Category, success: bool) -> Result<(), FreshnessError> {
        self.record_fetch_at(now_ms(), category, success)
    }

    fn save(&self) -> Result<(), FreshnessError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| FreshnessError::PersistFailed {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let json = serde_json::to_string(&self.until)?;
        let temp_file = temp_path(&self.path);

        if let Err(e) = fs::write(&temp_file, &json) {
            cleanup_temp_file(&temp_file, &e);
            return Err(FreshnessError::PersistFailed {
                path: self.path.clone(),
                source: e,
            });
        }
        if let Err(e) = fs::rename(&temp_file, &self.path) {
            cleanup_temp_file(&temp_file, &e);
            return Err(FreshnessError::PersistFailed {
                path: self.path.clone(),
                source: e,
            });
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        tracing::warn!(
            event = "core.freshness.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            message = "Failed to clean up temp file after write error"
        );
    }
}
