use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found — set $HOME environment variable")]
    HomeNotFound,
    #[error("failed to create directory {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Centralized path construction for the `~/.gauge/` directory layout.
///
/// Single source of truth for every path under `~/.gauge/`. Use `resolve()` in
/// production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct GaugePaths {
    gauge_dir: PathBuf,
}

impl GaugePaths {
    /// Resolve paths from the user's home directory (`~/.gauge`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            gauge_dir: home.join(".gauge"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests and for
    /// the `[paths] base_dir` config override.
    pub fn from_dir(gauge_dir: PathBuf) -> Self {
        Self { gauge_dir }
    }

    /// The base `~/.gauge` directory.
    pub fn gauge_dir(&self) -> &Path {
        &self.gauge_dir
    }

    /// Create the subdirectories state files are written into.
    ///
    /// Idempotent; every writer calls this before its first write since any
    /// invocation may be the first ever on this machine.
    pub fn ensure_dirs(&self) -> Result<(), PathError> {
        for dir in [
            self.cache_dir(),
            self.state_dir(),
            self.refresh_dir(),
            self.sessions_dir(),
            self.locks_dir(),
            self.logs_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| PathError::CreateFailed {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    // --- Top-level subdirectories ---

    pub fn cache_dir(&self) -> PathBuf {
        self.gauge_dir.join("cache")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.gauge_dir.join("state")
    }

    pub fn refresh_dir(&self) -> PathBuf {
        self.gauge_dir.join("refresh")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.gauge_dir.join("sessions")
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.gauge_dir.join("locks")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.gauge_dir.join("logs")
    }

    // --- Top-level files ---

    pub fn user_config(&self) -> PathBuf {
        self.gauge_dir.join("config.toml")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir().join("data.json")
    }

    pub fn cooldowns_file(&self) -> PathBuf {
        self.state_dir().join("cooldowns.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("gauge.log")
    }

    // --- Parameterized paths ---

    pub fn intent_marker(&self, category: &str) -> PathBuf {
        self.refresh_dir().join(format!("{category}.refresh"))
    }

    pub fn session_file(&self, session_id: &str) -> PathBuf {
        let safe_id = session_id.replace('/', "_");
        self.sessions_dir().join(format!("{safe_id}.json"))
    }

    pub fn lock_file(&self, name: &str) -> PathBuf {
        let safe_name = name.replace('/', "-");
        self.locks_dir().join(format!("{safe_name}.lock"))
    }

    // --- Static helpers (no self) ---

    /// Project-level config: `<project_root>/.gauge/config.toml`.
    pub fn project_config(project_root: &Path) -> PathBuf {
        project_root.join(".gauge").join("config.toml")
    }

    /// Default assistant config directory (`~/.claude`), used for sessions
    /// that never registered an explicit one.
    pub fn default_assistant_config_dir() -> Result<PathBuf, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(home.join(".claude"))
    }

    /// Default hotswap state file written by the external account switcher.
    pub fn default_hotswap_state() -> Result<PathBuf, PathError> {
        Ok(Self::default_assistant_config_dir()?
            .join("hotswap")
            .join("state.json"))
    }

    /// Default hotswap failover event log (append-only JSONL).
    pub fn default_hotswap_events() -> Result<PathBuf, PathError> {
        Ok(Self::default_assistant_config_dir()?
            .join("hotswap")
            .join("events.jsonl"))
    }
}
