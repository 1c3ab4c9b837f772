//! Per-sample inside/near classification.
//!
//! Classification is a pure function of a position, the catalog, and the
//! proximity threshold:
//!
//! 1. Zones containing the position win. Among overlapping zones the one with
//!    the nearest boundary is chosen.
//! 2. Otherwise the nearest zone whose boundary is closer than the threshold
//!    is reported as `near`.
//! 3. Otherwise the position is outside known areas.
//!
//! Ties on equal distance resolve to the zone listed first in the catalog.

use super::catalog::{Zone, ZoneCatalog};
use super::label::ZoneLabel;
use crate::geo::GeoPoint;

/// Default proximity threshold for the `near` label (20 meters).
pub const DEFAULT_NEAR_THRESHOLD_KM: f64 = 0.02;

/// Geometry of one zone relative to a position.
#[derive(Debug, Clone, Copy)]
pub struct ZoneMeasurement<'a> {
    /// The measured zone.
    pub zone: &'a Zone,
    /// Whether the position is inside the zone.
    pub inside: bool,
    /// Distance to the nearest boundary edge in kilometers.
    pub edge_distance_km: f64,
}

/// Outcome of classifying a single position.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Raw (undebounced) label.
    pub label: ZoneLabel,
    /// Edge distance of the selected zone, `None` for the sentinel.
    pub edge_distance_km: Option<f64>,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            label: ZoneLabel::Unknown,
            edge_distance_km: None,
        }
    }
}

/// Measure every zone in the catalog against a position.
pub fn measure(catalog: &ZoneCatalog, point: GeoPoint) -> Vec<ZoneMeasurement<'_>> {
    catalog
        .iter()
        .map(|zone| ZoneMeasurement {
            zone,
            inside: zone.contains(point),
            edge_distance_km: zone.edge_distance_km(point),
        })
        .collect()
}

/// Classify a position against the catalog.
pub fn classify(catalog: &ZoneCatalog, point: GeoPoint, near_threshold_km: f64) -> Classification {
    let measurements = measure(catalog, point);

    // min_by keeps the first of equal elements, preserving catalog order
    let nearest = |inside: bool| {
        measurements
            .iter()
            .filter(|m| m.inside == inside)
            .filter(|m| inside || m.edge_distance_km < near_threshold_km)
            .min_by(|a, b| a.edge_distance_km.total_cmp(&b.edge_distance_km))
    };

    if let Some(m) = nearest(true) {
        return Classification {
            label: ZoneLabel::Inside(m.zone.name().to_string()),
            edge_distance_km: Some(m.edge_distance_km),
        };
    }

    if let Some(m) = nearest(false) {
        return Classification {
            label: ZoneLabel::Near(m.zone.name().to_string()),
            edge_distance_km: Some(m.edge_distance_km),
        };
    }

    Classification::unknown()
}
