//! Zone resolver - classification plus debounce for one session.

use std::sync::Arc;

use super::catalog::ZoneCatalog;
use super::classify::{classify, Classification, DEFAULT_NEAR_THRESHOLD_KM};
use super::label::ZoneLabel;
use super::stability::{StabilityFilter, DEFAULT_STABILITY_THRESHOLD};
use crate::geo::GeoPoint;

/// Tuning parameters for a resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Consecutive agreeing samples required to confirm a change.
    pub stability_threshold: u32,

    /// Distance in kilometers below which an outside position is `near`.
    pub near_threshold_km: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            stability_threshold: DEFAULT_STABILITY_THRESHOLD,
            near_threshold_km: DEFAULT_NEAR_THRESHOLD_KM,
        }
    }
}

/// Result of feeding one position to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverStep {
    /// Raw classification of the position.
    pub classification: Classification,
    /// Newly confirmed label, if this position completed a change.
    pub confirmed: Option<ZoneLabel>,
}

/// Classifies positions against a shared catalog and debounces the result.
#[derive(Debug, Clone)]
pub struct ZoneResolver {
    catalog: Arc<ZoneCatalog>,
    config: ResolverConfig,
    filter: StabilityFilter,
}

impl ZoneResolver {
    /// Create a resolver in its initial state.
    pub fn new(catalog: Arc<ZoneCatalog>, config: ResolverConfig) -> Self {
        Self {
            catalog,
            filter: StabilityFilter::new(config.stability_threshold),
            config,
        }
    }

    /// Classify a position without touching the debounce state.
    pub fn classify(&self, point: GeoPoint) -> Classification {
        classify(&self.catalog, point, self.config.near_threshold_km)
    }

    /// Classify a position and run it through the stability filter.
    pub fn observe(&mut self, point: GeoPoint) -> ResolverStep {
        let classification = self.classify(point);
        let confirmed = self.filter.observe(classification.label.clone());
        ResolverStep {
            classification,
            confirmed,
        }
    }

    /// Reset the debounce state.
    pub fn reset(&mut self) {
        self.filter.reset();
    }

    /// Last confirmed label.
    pub fn confirmed(&self) -> &ZoneLabel {
        self.filter.last_confirmed()
    }

    /// Label of the most recent position.
    pub fn candidate(&self) -> Option<&ZoneLabel> {
        self.filter.candidate()
    }

    /// Consecutive positions agreeing with the candidate.
    pub fn stability_counter(&self) -> u32 {
        self.filter.counter()
    }

    /// The shared catalog.
    pub fn catalog(&self) -> &Arc<ZoneCatalog> {
        &self.catalog
    }

    /// Resolver configuration.
    pub fn config(&self) -> ResolverConfig {
        self.config
    }
}
