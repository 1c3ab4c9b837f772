//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let catalog = config
        .zones
        .catalog
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[zones]
; JSON zone catalog: {{"zones": [{{"name": "...", "points": [{{"lat": .., "lon": ..}}, ...]}}]}}
; Each zone needs a unique name and at least 3 vertices.
; If empty, the built-in catalog is used.
catalog = {}
; Consecutive samples that must agree before the current zone changes (default: 3)
stability_threshold = {}
; Distance in kilometers below which an outside position reports "near: <zone>" (default: 0.02)
near_threshold_km = {}

[replay]
; Delay between samples when replaying a recorded trace (default: 1000)
interval_ms = {}

[logging]
; Log file location (cleared at the start of every session)
file = {}
"#,
        catalog,
        config.zones.stability_threshold,
        config.zones.near_threshold_km,
        config.replay.interval_ms,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
