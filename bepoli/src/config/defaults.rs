//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::zone::{DEFAULT_NEAR_THRESHOLD_KM, DEFAULT_STABILITY_THRESHOLD};

/// Name of the per-user configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".bepoli";

/// Configuration file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log file name inside the configuration directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "bepoli.log";

/// Default delay between replayed trace samples (1 second, a typical GPS rate).
pub const DEFAULT_REPLAY_INTERVAL_MS: u64 = 1000;

/// Default log file path (~/.bepoli/bepoli.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            zones: ZonesSettings {
                catalog: None,
                stability_threshold: DEFAULT_STABILITY_THRESHOLD,
                near_threshold_km: DEFAULT_NEAR_THRESHOLD_KM,
            },
            replay: ReplaySettings {
                interval_ms: DEFAULT_REPLAY_INTERVAL_MS,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
