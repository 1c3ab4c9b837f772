//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::str::FromStr;
use thiserror::Error;

use super::parser::{expand_tilde, parse_non_negative_number, parse_positive_integer};
use super::settings::ConfigFile;
use super::writer::path_to_string;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Zone settings
    ZonesCatalog,
    ZonesStabilityThreshold,
    ZonesNearThresholdKm,

    // Replay settings
    ReplayIntervalMs,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zones.catalog" => Ok(ConfigKey::ZonesCatalog),
            "zones.stability_threshold" => Ok(ConfigKey::ZonesStabilityThreshold),
            "zones.near_threshold_km" => Ok(ConfigKey::ZonesNearThresholdKm),
            "replay.interval_ms" => Ok(ConfigKey::ReplayIntervalMs),
            "logging.file" => Ok(ConfigKey::LoggingFile),
            _ => Err(ConfigKeyError::UnknownKey(s.to_string())),
        }
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "zones.catalog").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ZonesCatalog => "zones.catalog",
            ConfigKey::ZonesStabilityThreshold => "zones.stability_threshold",
            ConfigKey::ZonesNearThresholdKm => "zones.near_threshold_km",
            ConfigKey::ReplayIntervalMs => "replay.interval_ms",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "zones").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "catalog").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ZonesCatalog => config
                .zones
                .catalog
                .as_ref()
                .map(|p| path_to_string(p))
                .unwrap_or_default(),
            ConfigKey::ZonesStabilityThreshold => config.zones.stability_threshold.to_string(),
            ConfigKey::ZonesNearThresholdKm => config.zones.near_threshold_km.to_string(),
            ConfigKey::ReplayIntervalMs => config.replay.interval_ms.to_string(),
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        let invalid = |reason: &str| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::ZonesCatalog => {
                let value = value.trim();
                config.zones.catalog = if value.is_empty() {
                    None
                } else {
                    Some(expand_tilde(value))
                };
            }
            ConfigKey::ZonesStabilityThreshold => {
                config.zones.stability_threshold = parse_positive_integer(value)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| invalid("must be a positive integer"))?;
            }
            ConfigKey::ZonesNearThresholdKm => {
                config.zones.near_threshold_km = parse_non_negative_number(value)
                    .ok_or_else(|| invalid("must be a non-negative number"))?;
            }
            ConfigKey::ReplayIntervalMs => {
                config.replay.interval_ms = parse_positive_integer(value)
                    .ok_or_else(|| invalid("must be a positive integer"))?;
            }
            ConfigKey::LoggingFile => {
                config.logging.file = expand_tilde(value.trim());
            }
        }
        Ok(())
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value)
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::ZonesCatalog => Box::new(OptionalPathSpec),
            ConfigKey::ZonesStabilityThreshold => Box::new(PositiveIntegerSpec {
                max: u64::from(u32::MAX),
            }),
            ConfigKey::ZonesNearThresholdKm => Box::new(NonNegativeNumberSpec),
            ConfigKey::ReplayIntervalMs => Box::new(PositiveIntegerSpec { max: u64::MAX }),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ZonesCatalog,
            ConfigKey::ZonesStabilityThreshold,
            ConfigKey::ZonesNearThresholdKm,
            ConfigKey::ReplayIntervalMs,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Check if the value satisfies this specification.
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Specification for integer values greater than zero.
struct PositiveIntegerSpec {
    max: u64,
}

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match parse_positive_integer(value) {
            Some(n) if n <= self.max => Ok(()),
            Some(_) => Err(format!("must be at most {}", self.max)),
            None => Err("must be a positive integer".to_string()),
        }
    }
}

/// Specification for finite numbers that are zero or greater.
struct NonNegativeNumberSpec;

impl ValueSpecification for NonNegativeNumberSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_non_negative_number(value)
            .map(|_| ())
            .ok_or_else(|| "must be a non-negative number".to_string())
    }
}

/// Specification for path values (non-empty).
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// Specification for optional path values (empty allowed).
struct OptionalPathSpec;

impl ValueSpecification for OptionalPathSpec {
    fn is_satisfied_by(&self, _value: &str) -> Result<(), String> {
        Ok(())
    }
}
