//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, and catalog loading
//! so command handlers start from the same state.

use std::path::PathBuf;
use std::sync::Arc;

use bepoli::config::ConfigFile;
use bepoli::logging::{init_logging, split_log_path, LoggingGuard};
use bepoli::zone::{ResolverConfig, ZoneCatalog};
use tracing::info;

use crate::error::CliError;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Catalog file overriding `zones.catalog`
    pub catalog: Option<PathBuf>,
    /// Force debug logging and echo logs to stdout
    pub debug: bool,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    options: GlobalOptions,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// Logs always go to the configured file. They are echoed to stdout only
    /// in debug mode so regular command output stays readable.
    pub fn new(options: GlobalOptions) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(log_dir, &log_file, options.debug, options.debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            options,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("BePoli v{}", bepoli::VERSION);
        info!("BePoli CLI: {} command", command);
    }

    /// Resolver tuning from the config file.
    pub fn resolver_config(&self) -> ResolverConfig {
        self.config.zones.resolver_config()
    }

    /// Load the zone catalog: `--catalog` first, then config, then built-in.
    pub fn load_catalog(&self) -> Result<Arc<ZoneCatalog>, CliError> {
        let catalog = match &self.options.catalog {
            Some(path) => ZoneCatalog::load(path)?,
            None => self.config.zones.load_catalog()?,
        };
        info!(zones = catalog.len(), "Zone catalog ready");
        Ok(Arc::new(catalog))
    }
}
