//! Reading and writing `~/.bepoli/config.ini`.
//!
//! A missing file is not an error: every key has a default and the built-in
//! catalog applies until `zones.catalog` names a JSON file. Errors carry the
//! offending path so the CLI can point at it.

use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not readable INI.
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// The file or its directory could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A key holds a value the resolver cannot use.
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load `~/.bepoli/config.ini`, falling back to defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, falling back to defaults when it does
    /// not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = super::parser::parse_ini(&ini)?;

        debug!(
            path = %path.display(),
            catalog = %config.zones.catalog_source(),
            stability_threshold = config.zones.stability_threshold,
            near_threshold_km = config.zones.near_threshold_km,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Write configuration to `~/.bepoli/config.ini`.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Write configuration to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_error = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, super::writer::to_config_string(self)).map_err(write_error)?;

        debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}

/// Per-user configuration directory (`~/.bepoli`), also home of the log file.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path of `config.ini` inside [`config_directory`].
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogSource;
    use crate::zone::ResolverConfig;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_builtin_catalog_and_default_tuning() {
        let temp_dir = TempDir::new().unwrap();

        let config = ConfigFile::load_from(&temp_dir.path().join("config.ini")).unwrap();

        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.zones.catalog_source(), CatalogSource::Builtin);
        assert_eq!(config.zones.resolver_config(), ResolverConfig::default());
        assert!(config
            .zones
            .load_catalog()
            .unwrap()
            .get("Radio Frequenza Libera")
            .is_some());
    }

    #[test]
    fn test_saved_tuning_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".bepoli").join("config.ini");
        let catalog = temp_dir.path().join("campus.json");

        let mut config = ConfigFile::default();
        config.zones.catalog = Some(catalog.clone());
        config.zones.stability_threshold = 5;
        config.zones.near_threshold_km = 0.05;
        config.replay.interval_ms = 250;
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.zones.catalog_source(), CatalogSource::File(&catalog));
        assert_eq!(loaded.zones.resolver_config().stability_threshold, 5);
        assert_eq!(loaded.zones.resolver_config().near_threshold_km, 0.05);
        assert_eq!(loaded.replay.interval(), std::time::Duration::from_millis(250));
    }

    #[test]
    fn test_unreadable_file_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "[zones\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();

        assert!(matches!(err, ConfigFileError::Read { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_write_failure_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("config.ini");

        let err = ConfigFile::default().save_to(&path).unwrap_err();

        assert!(matches!(err, ConfigFileError::Write { .. }));
        assert!(err.to_string().contains("not-a-dir"));
    }

    #[test]
    fn test_configured_catalog_missing_is_error() {
        let mut config = ConfigFile::default();
        config.zones.catalog = Some(PathBuf::from("/nonexistent/zones.json"));

        assert_eq!(config.zones.catalog_source().to_string(), "/nonexistent/zones.json");
        assert!(config.zones.load_catalog().is_err());
    }

    #[test]
    fn test_config_file_lives_in_config_directory() {
        assert!(config_directory().ends_with(CONFIG_DIR_NAME));
        assert_eq!(
            config_file_path(),
            config_directory().join(CONFIG_FILE_NAME)
        );
    }
}
