//! Configuration types for gauge.
//!
//! All fields are optional in the TOML so that user and project configs can
//! override independently; accessors apply the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Segment names the statusline knows how to render.
pub const VALID_SEGMENTS: [&str; 6] = ["model", "git", "context", "cost", "billing", "quota"];

/// Default segment order for the rendered line.
pub const DEFAULT_SEGMENTS: [&str; 5] = ["model", "git", "context", "billing", "quota"];

/// Top-level configuration, merged from defaults, user, and project files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GaugeConfig {
    #[serde(default)]
    pub statusline: StatuslineConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub hotswap: HotswapConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// `[statusline]` — what the rendered line contains.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatuslineConfig {
    /// Ordered segment names. Unset means the default order.
    pub segments: Option<Vec<String>>,
    /// Separator between segments.
    pub separator: Option<String>,
}

impl StatuslineConfig {
    pub fn segments(&self) -> Vec<&str> {
        match &self.segments {
            Some(segments) => segments.iter().map(String::as_str).collect(),
            None => DEFAULT_SEGMENTS.to_vec(),
        }
    }

    pub fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(" | ")
    }
}

/// `[fetch]` — external commands and timeout policy for data sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Command producing today's billing usage as JSON.
    pub ccusage_command: Option<String>,
    /// Optional command producing subscription quota standing as JSON.
    /// When unset, the oauth source reports credentials data only.
    pub usage_command: Option<String>,
    /// Upper bound applied to every per-source timeout, in milliseconds.
    pub timeout_ms_cap: Option<u64>,
}

impl FetchConfig {
    pub fn ccusage_command(&self) -> &str {
        self.ccusage_command.as_deref().unwrap_or("ccusage")
    }

    pub fn usage_command(&self) -> Option<&str> {
        self.usage_command.as_deref()
    }

    pub fn timeout_ms_cap(&self) -> u64 {
        self.timeout_ms_cap.unwrap_or(10_000)
    }
}

/// `[hotswap]` — where the external account switcher keeps its files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HotswapConfig {
    /// Path to the switcher's state.json.
    pub state_path: Option<PathBuf>,
    /// Path to the append-only failover event log.
    pub events_path: Option<PathBuf>,
}

/// `[paths]` — storage location overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Overrides `~/.gauge` as the state directory.
    pub base_dir: Option<PathBuf>,
}
