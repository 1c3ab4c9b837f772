//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::zone::{CatalogError, ResolverConfig, ZoneCatalog};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Zone catalog and resolver tuning
    pub zones: ZonesSettings,
    /// Trace replay settings
    pub replay: ReplaySettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Zone resolution configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonesSettings {
    /// JSON catalog file; `None` uses the built-in catalog.
    pub catalog: Option<PathBuf>,
    /// Consecutive agreeing samples required to confirm a zone change.
    pub stability_threshold: u32,
    /// Distance in kilometers below which an outside position is "near".
    pub near_threshold_km: f64,
}

impl ZonesSettings {
    /// Resolver tuning derived from these settings.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            stability_threshold: self.stability_threshold,
            near_threshold_km: self.near_threshold_km,
        }
    }

    /// Where the zone catalog comes from.
    pub fn catalog_source(&self) -> CatalogSource<'_> {
        match &self.catalog {
            Some(path) => CatalogSource::File(path),
            None => CatalogSource::Builtin,
        }
    }

    /// Load the configured catalog, or the built-in one when none is set.
    pub fn load_catalog(&self) -> Result<ZoneCatalog, CatalogError> {
        self.catalog_source().load()
    }
}

/// Origin of the zone catalog used for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource<'a> {
    /// The compiled-in campus catalog.
    Builtin,
    /// A JSON catalog file.
    File(&'a Path),
}

impl CatalogSource<'_> {
    pub fn load(self) -> Result<ZoneCatalog, CatalogError> {
        match self {
            CatalogSource::Builtin => Ok(ZoneCatalog::builtin()),
            CatalogSource::File(path) => ZoneCatalog::load(path),
        }
    }
}

impl fmt::Display for CatalogSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Builtin => write!(f, "built-in"),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Trace replay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySettings {
    /// Delay between replayed samples in milliseconds.
    pub interval_ms: u64,
}

impl ReplaySettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
