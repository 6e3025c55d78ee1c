//! Configuration loading and merging logic.
//!
//! This module handles loading configuration from files and merging
//! configurations from different sources (user config, project config).
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.gauge/config.toml` (global user preferences)
//! 3. **Project config** - `./.gauge/config.toml` (project-specific overrides)

use crate::types::{FetchConfig, GaugeConfig, HotswapConfig, PathsConfig, StatuslineConfig};
use crate::validation::validate_config;
use std::fs;
use std::path::Path;

/// Check if an error is a "file not found" error.
fn is_file_not_found(e: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
        return io_err.kind() == std::io::ErrorKind::NotFound;
    }

    let err_str = e.to_string();
    err_str.contains("No such file or directory") || err_str.contains("cannot find the path")
}

/// Load configuration from the hierarchy of config files.
///
/// Loads and merges configuration from:
/// 1. Default values
/// 2. User config (`~/.gauge/config.toml`)
/// 3. Project config (`./.gauge/config.toml`)
///
/// # Errors
///
/// Returns an error if validation fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<GaugeConfig, Box<dyn std::error::Error>> {
    let mut config = GaugeConfig::default();

    // Load user config (file not found is expected, parse errors fail)
    match load_user_config() {
        Ok(user_config) => config = merge_configs(config, user_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {
            // File not found - continue with defaults
            tracing::debug!(
                event = "config.user_config_missing",
                "No user config found - using defaults"
            );
        }
    }

    // Load project config (file not found is expected, parse errors fail)
    match load_project_config() {
        Ok(project_config) => config = merge_configs(config, project_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {
            // File not found - continue with merged config
            tracing::debug!(
                event = "config.project_config_missing",
                "No project config found - using merged config"
            );
        }
    }

    // Validate the final configuration
    validate_config(&config)?;

    Ok(config)
}

/// Load the user configuration from ~/.gauge/config.toml.
fn load_user_config() -> Result<GaugeConfig, Box<dyn std::error::Error>> {
    let paths = gauge_paths::GaugePaths::resolve().map_err(|e| e.to_string())?;
    load_config_file(&paths.user_config())
}

/// Load the project configuration from ./.gauge/config.toml.
fn load_project_config() -> Result<GaugeConfig, Box<dyn std::error::Error>> {
    let project_root = std::env::current_dir()?;
    load_config_file(&gauge_paths::GaugePaths::project_config(&project_root))
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<GaugeConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("'{}': {}", path.display(), e)))?;
    let config: GaugeConfig = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;
    Ok(config)
}

/// Merge two configurations, with override_config taking precedence.
///
/// Optional fields take the override value only when it is present.
pub fn merge_configs(base: GaugeConfig, override_config: GaugeConfig) -> GaugeConfig {
    GaugeConfig {
        statusline: StatuslineConfig {
            segments: override_config
                .statusline
                .segments
                .or(base.statusline.segments),
            separator: override_config
                .statusline
                .separator
                .or(base.statusline.separator),
        },
        fetch: FetchConfig {
            ccusage_command: override_config
                .fetch
                .ccusage_command
                .or(base.fetch.ccusage_command),
            usage_command: override_config
                .fetch
                .usage_command
                .or(base.fetch.usage_command),
            timeout_ms_cap: override_config
                .fetch
                .timeout_ms_cap
                .or(base.fetch.timeout_ms_cap),
        },
        hotswap: HotswapConfig {
            state_path: override_config.hotswap.state_path.or(base.hotswap.state_path),
            events_path: override_config
                .hotswap
                .events_path
                .or(base.hotswap.events_path),
        },
        paths: PathsConfig {
            base_dir: override_config.paths.base_dir.or(base.paths.base_dir),
        },
    }
}
