//! BePoli - campus zone resolution from GPS samples
//!
//! This library decides which named campus zone a user is in (or near) from a
//! stream of location samples, and debounces the answer so boundary jitter
//! does not flip the reported zone.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use bepoli::tracking::{ChannelSource, LocationSample, ZoneTracker};
//! use bepoli::zone::{ResolverConfig, ZoneCatalog};
//!
//! let (source, feed) = ChannelSource::new("gps");
//! let tracker = ZoneTracker::with_handler(
//!     Arc::new(ZoneCatalog::builtin()),
//!     ResolverConfig::default(),
//!     Arc::new(source),
//!     |change| println!("Now in: {}", change.label),
//! );
//!
//! tracker.start_tracking()?;
//! feed.send(LocationSample::new(41.10874, 16.87967, 8.0));
//! ```
//!
//! # Modules
//!
//! - [`geo`] - Planar point-in-polygon and edge distance
//! - [`zone`] - Catalog, classification, stability filter, resolver
//! - [`tracking`] - Tracking sessions and location sources
//! - [`config`] - `~/.bepoli/config.ini`
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod geo;
pub mod logging;
pub mod tracking;
pub mod zone;

/// Version of the BePoli library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
