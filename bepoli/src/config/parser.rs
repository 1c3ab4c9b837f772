//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [zones] section
    if let Some(section) = ini.section(Some("zones")) {
        if let Some(v) = section.get("catalog") {
            let v = v.trim();
            config.zones.catalog = if v.is_empty() {
                None
            } else {
                Some(expand_tilde(v))
            };
        }
        if let Some(v) = section.get("stability_threshold") {
            config.zones.stability_threshold = parse_positive_integer(v)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    invalid("zones", "stability_threshold", v, "must be a positive integer")
                })?;
        }
        if let Some(v) = section.get("near_threshold_km") {
            config.zones.near_threshold_km = parse_non_negative_number(v).ok_or_else(|| {
                invalid(
                    "zones",
                    "near_threshold_km",
                    v,
                    "must be a non-negative number (kilometers)",
                )
            })?;
        }
    }

    // [replay] section
    if let Some(section) = ini.section(Some("replay")) {
        if let Some(v) = section.get("interval_ms") {
            config.replay.interval_ms = parse_positive_integer(v).ok_or_else(|| {
                invalid(
                    "replay",
                    "interval_ms",
                    v,
                    "must be a positive integer (milliseconds)",
                )
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an integer greater than zero.
pub(super) fn parse_positive_integer(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// Parse a finite number that is zero or greater.
pub(super) fn parse_non_negative_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
