//! Configuration for gauge: types, loading, merging, and validation.
//!
//! Configuration comes from TOML files merged over built-in defaults:
//! `~/.gauge/config.toml` (user) then `./.gauge/config.toml` (project).
//! Missing files are fine; parse and validation failures are reported so the
//! CLI can warn and fall back to defaults.

pub mod errors;
pub mod loading;
pub mod types;
pub mod validation;

pub use errors::ConfigError;
pub use loading::{load_config_file, load_hierarchy, merge_configs};
pub use types::{
    DEFAULT_SEGMENTS, FetchConfig, GaugeConfig, HotswapConfig, PathsConfig, StatuslineConfig,
    VALID_SEGMENTS,
};
pub use validation::validate_config;

impl GaugeConfig {
    /// Load the effective configuration from the file hierarchy.
    ///
    /// Convenience wrapper over [`loading::load_hierarchy`].
    pub fn load_hierarchy() -> Result<Self, Box<dyn std::error::Error>> {
        loading::load_hierarchy()
    }
}
