//! File-backed cache store with tolerant reads and atomic writes.
//!
//! Many short-lived processes share one document, so writes go through a
//! temp-file-then-rename in the cache directory and reads never fail: a
//! missing, malformed, or wrong-version document loads as empty, and a
//! single bad entry is dropped without discarding its siblings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cache::errors::CacheError;
use crate::cache::types::{CACHE_VERSION, CacheDocument, CacheEntry};
use crate::clock::now_ms;
use gauge_paths::GaugePaths;

#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
}

/// First parse stage. Entries stay as raw JSON so one unparseable entry does
/// not reject the document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    updated_at: u64,
    #[serde(default)]
    sources: BTreeMap<String, serde_json::Value>,
}

impl CacheStore {
    pub fn open(paths: &GaugePaths) -> Self {
        Self {
            path: paths.cache_file(),
        }
    }

    /// Store backed by an explicit file. Used by tests and alternate roots.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current document. Never errors: anything unreadable degrades
    /// to an empty document with a structured warning.
    pub fn load(&self) -> CacheDocument {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CacheDocument::empty(0);
            }
            Err(e) => {
                tracing::warn!(
                    event = "core.cache.read_error",
                    file = %self.path.display(),
                    error = %e,
                    message = "Failed to read cache, treating as empty"
                );
                return CacheDocument::empty(0);
            }
        };

        let raw = match serde_json::from_str::<RawDocument>(&content) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    event = "core.cache.invalid_json",
                    file = %self.path.display(),
                    error = %e,
                    message = "Failed to parse cache, treating as empty"
                );
                return CacheDocument::empty(0);
            }
        };

        if raw.version != CACHE_VERSION {
            tracing::warn!(
                event = "core.cache.version_mismatch",
                file = %self.path.display(),
                found = raw.version,
                expected = CACHE_VERSION,
                message = "Cache document has unknown schema version, treating as empty"
            );
            return CacheDocument::empty(0);
        }

        let mut sources = BTreeMap::new();
        for (id, value) in raw.sources {
            match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => {
                    sources.insert(id, entry);
                }
                Err(e) => {
                    tracing::warn!(
                        event = "core.cache.entry_invalid",
                        source_id = %id,
                        error = %e,
                        message = "Dropping unparseable cache entry"
                    );
                }
            }
        }

        CacheDocument {
            version: raw.version,
            updated_at: raw.updated_at,
            sources,
        }
    }

    /// Merge entries into the on-disk document, last writer wins per source
    /// id, and persist atomically. Returns the merged document.
    pub fn update(
        &self,
        entries: BTreeMap<String, CacheEntry>,
    ) -> Result<CacheDocument, CacheError> {
        self.update_at(now_ms(), entries)
    }

    pub fn update_at(
        &self,
        now_ms: u64,
        entries: BTreeMap<String, CacheEntry>,
    ) -> Result<CacheDocument, CacheError> {
        let mut document = self.load();
        document.version = CACHE_VERSION;
        document.updated_at = now_ms;
        for (id, entry) in entries {
            document.sources.insert(id, entry);
        }
        self.save(&document)?;
        Ok(document)
    }

    /// Reset to an empty document.
    pub fn clear(&self) -> Result<CacheDocument, CacheError> {
        self.clear_at(now_ms())
    }

    pub fn clear_at(&self, now_ms: u64) -> Result<CacheDocument, CacheError> {
        let document = CacheDocument::empty(now_ms);
        self.save(&document)?;
        Ok(document)
    }

    fn save(&self, document: &CacheDocument) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::PersistFailed {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let temp_file = temp_path(&self.path);

        if let Err(e) = fs::write(&temp_file, &json) {
            cleanup_temp_file(&temp_file, &e);
            return Err(CacheError::PersistFailed {
                path: self.path.clone(),
                source: e,
            });
        }
        if let Err(e) = fs::rename(&temp_file, &self.path) {
            cleanup_temp_file(&temp_file, &e);
            return Err(CacheError::PersistFailed {
                path: self.path.clone(),
                source: e,
            });
        }

        tracing::debug!(
            event = "core.cache.saved",
            file = %self.path.display(),
            sources = document.sources.len(),
        );
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
            event = "core.cache.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            message = "Failed to clean up temp file after write error"
        );
    }
}
