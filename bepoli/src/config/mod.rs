//! User configuration stored in `~/.bepoli/config.ini`.
//!
//! # Example
//!
//! ```
//! use bepoli::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! let key: ConfigKey = "zones.stability_threshold".parse().unwrap();
//! key.set(&mut config, "5").unwrap();
//!
//! assert_eq!(config.zones.resolver_config().stability_threshold, 5);
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    default_log_file, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_FILE_NAME,
    DEFAULT_REPLAY_INTERVAL_MS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{CatalogSource, ConfigFile, LoggingSettings, ReplaySettings, ZonesSettings};
