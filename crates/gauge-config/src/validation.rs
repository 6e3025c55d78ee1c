//! Configuration validation logic.
//!
//! Runs after the hierarchy merge so it sees the effective configuration,
//! not any single file in isolation.

use crate::errors::ConfigError;
use crate::types::{GaugeConfig, VALID_SEGMENTS};

/// Validate a GaugeConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Segment names must come from the known segment set and the list, if
///   given, must not be empty
/// - `timeout_ms_cap`, if set, must be greater than zero
/// - Commands, if set, must not be blank
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfiguration` describing the first violation.
pub fn validate_config(config: &GaugeConfig) -> Result<(), ConfigError> {
    if let Some(ref segments) = config.statusline.segments {
        if segments.is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "statusline.segments must not be empty — remove the key to use defaults"
                    .to_string(),
            });
        }
        for segment in segments {
            if !VALID_SEGMENTS.contains(&segment.as_str()) {
                return Err(ConfigError::InvalidConfiguration {
                    message: format!(
                        "Unknown segment '{}'. Valid segments: {}",
                        segment,
                        VALID_SEGMENTS.join(", ")
                    ),
                });
            }
        }
    }

    if config.fetch.timeout_ms_cap == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "fetch.timeout_ms_cap must be greater than zero".to_string(),
        });
    }

    for (key, command) in [
        ("fetch.ccusage_command", &config.fetch.ccusage_command),
        ("fetch.usage_command", &config.fetch.usage_command),
    ] {
        if let Some(command) = command
            && command.trim().is_empty()
        {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("{key} must not be blank"),
            });
        }
    }

    Ok(())
}
