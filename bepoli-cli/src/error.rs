//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use bepoli::config::{ConfigFileError, ConfigKeyError};
use bepoli::tracking::{TraceError, TrackingError};
use bepoli::zone::CatalogError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Zone catalog could not be loaded
    Catalog(CatalogError),
    /// Trace file could not be read
    Trace(TraceError),
    /// Tracking session failed
    Tracking(TrackingError),
    /// Async runtime could not be created
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Catalog(CatalogError::Parse { .. }) => {
                eprintln!();
                eprintln!("A catalog file looks like:");
                eprintln!(
                    r#"  {{"zones": [{{"name": "Aula Magna", "points": [{{"lat": 41.108, "lon": 16.878}}, ...]}}]}}"#
                );
            }
            CliError::Tracking(TrackingError::UnknownZone(_)) => {
                eprintln!();
                eprintln!("Use 'bepoli zones' to list the available zones.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Catalog(e) => write!(f, "Failed to load zone catalog: {}", e),
            CliError::Trace(e) => write!(f, "{}", e),
            CliError::Tracking(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Catalog(e) => Some(e),
            CliError::Trace(e) => Some(e),
            CliError::Tracking(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ConfigKeyError> for CliError {
    fn from(e: ConfigKeyError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<TraceError> for CliError {
    fn from(e: TraceError) -> Self {
        CliError::Trace(e)
    }
}

impl From<TrackingError> for CliError {
    fn from(e: TrackingError) -> Self {
        CliError::Tracking(e)
    }
}
