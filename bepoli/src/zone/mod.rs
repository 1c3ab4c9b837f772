//! Zone resolution - which campus zone is the user in?
//!
//! This module turns raw coordinates into a single debounced zone label:
//!
//! - [`catalog`] - `Zone` polygons and the immutable `ZoneCatalog`
//! - [`classify`] - Pure inside/near classification with tie-breaking
//! - [`stability`] - `StabilityFilter` that suppresses boundary flicker
//! - [`resolver`] - `ZoneResolver` combining both for one session
//! - [`label`] - `ZoneLabel` and its rendered grammar
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bepoli::geo::GeoPoint;
//! use bepoli::zone::{ResolverConfig, ZoneCatalog, ZoneLabel, ZoneResolver};
//!
//! let catalog = Arc::new(ZoneCatalog::builtin());
//! let mut resolver = ZoneResolver::new(catalog, ResolverConfig::default());
//!
//! let inside = GeoPoint::new(41.10874, 16.87967);
//! let mut confirmed = None;
//! for _ in 0..3 {
//!     confirmed = resolver.observe(inside).confirmed.or(confirmed);
//! }
//! assert_eq!(
//!     confirmed,
//!     Some(ZoneLabel::Inside("Radio Frequenza Libera".to_string()))
//! );
//! ```

pub mod catalog;
pub mod classify;
pub mod label;
pub mod resolver;
pub mod stability;

pub use catalog::{CatalogError, Zone, ZoneCatalog, MIN_ZONE_VERTICES};
pub use classify::{classify, measure, Classification, ZoneMeasurement, DEFAULT_NEAR_THRESHOLD_KM};
pub use label::{ZoneLabel, NEAR_PREFIX, UNKNOWN_ZONE_LABEL};
pub use resolver::{ResolverConfig, ResolverStep, ZoneResolver};
pub use stability::{StabilityFilter, DEFAULT_STABILITY_THRESHOLD};
