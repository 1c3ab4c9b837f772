//! Zone catalog - the fixed set of campus polygons.
//!
//! The catalog is static configuration: it is built once, validated, and
//! then shared read-only (typically behind an `Arc`) by every resolver.
//!
//! # File Format
//!
//! ```json
//! {
//!   "zones": [
//!     { "name": "Radio Frequenza Libera",
//!       "points": [ { "lat": 41.108692, "lon": 16.879609 }, ... ] }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::label::{NEAR_PREFIX, UNKNOWN_ZONE_LABEL};
use crate::geo::{distance_to_polygon_km, point_in_polygon, GeoPoint};

/// Minimum number of vertices in a zone boundary.
pub const MIN_ZONE_VERTICES: usize = 3;

/// Errors raised while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("Failed to read zone catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON for the expected schema.
    #[error("Failed to parse zone catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A zone has fewer than three vertices.
    #[error("Zone '{zone}' has {count} vertices (at least 3 required)")]
    TooFewVertices { zone: String, count: usize },

    /// A zone has an empty name.
    #[error("Zone names must not be empty")]
    EmptyName,

    /// A zone name collides with the label grammar.
    #[error("Zone name '{0}' is reserved")]
    ReservedName(String),

    /// Two zones share a name.
    #[error("Duplicate zone name '{0}'")]
    DuplicateName(String),
}

/// A named polygonal region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    name: String,
    #[serde(rename = "points")]
    boundary: Vec<GeoPoint>,
}

impl Zone {
    /// Create a zone, validating its name and vertex count.
    pub fn new(
        name: impl Into<String>,
        boundary: impl IntoIterator<Item = GeoPoint>,
    ) -> Result<Self, CatalogError> {
        let zone = Self {
            name: name.into(),
            boundary: boundary.into_iter().collect(),
        };
        zone.validate()?;
        Ok(zone)
    }

    /// Human-readable zone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Polygon vertices in order (implicitly closed).
    pub fn boundary(&self) -> &[GeoPoint] {
        &self.boundary
    }

    /// Returns true if the point is inside the zone's polygon.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point_in_polygon(point, &self.boundary)
    }

    /// Distance in kilometers from the point to the nearest boundary edge.
    pub fn edge_distance_km(&self, point: GeoPoint) -> f64 {
        distance_to_polygon_km(point, &self.boundary)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if trimmed == UNKNOWN_ZONE_LABEL || self.name.starts_with(NEAR_PREFIX) {
            return Err(CatalogError::ReservedName(self.name.clone()));
        }
        if self.boundary.len() < MIN_ZONE_VERTICES {
            return Err(CatalogError::TooFewVertices {
                zone: self.name.clone(),
                count: self.boundary.len(),
            });
        }
        Ok(())
    }
}

/// On-disk shape of a catalog file.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    zones: Vec<Zone>,
}

/// Immutable, validated collection of zones.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
}

/// Vertices of the surveyed "Radio Frequenza Libera" room.
const RADIO_FREQUENZA_LIBERA: [(f64, f64); 4] = [
    (41.108692, 16.879609),
    (41.108730, 16.879755),
    (41.108786, 16.879728),
    (41.108755, 16.879577),
];

impl ZoneCatalog {
    /// Build a catalog from zones, rejecting invalid or duplicate entries.
    pub fn new(zones: Vec<Zone>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(zones.len());
        for zone in &zones {
            zone.validate()?;
            if !seen.insert(zone.name()) {
                return Err(CatalogError::DuplicateName(zone.name.clone()));
            }
        }
        Ok(Self { zones })
    }

    /// The built-in campus catalog.
    pub fn builtin() -> Self {
        let radio = Zone {
            name: "Radio Frequenza Libera".to_string(),
            boundary: RADIO_FREQUENZA_LIBERA
                .iter()
                .copied()
                .map(GeoPoint::from)
                .collect(),
        };
        Self { zones: vec![radio] }
    }

    /// Parse a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        Self::new(file.zones)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CatalogFile =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::new(file.zones)?;

        if catalog.is_empty() {
            tracing::warn!(path = %path.display(), "Zone catalog is empty");
        } else {
            tracing::debug!(
                path = %path.display(),
                zones = catalog.len(),
                "Zone catalog loaded"
            );
        }
        Ok(catalog)
    }

    /// Serialize the catalog to pretty-printed JSON.
    pub fn to_json_string(&self) -> String {
        let file = CatalogFile {
            zones: self.zones.clone(),
        };
        // Only f64 and String fields: serialization cannot fail
        serde_json::to_string_pretty(&file).unwrap_or_default()
    }

    /// Iterate over zones in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    /// Look up a zone by exact name.
    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Zone names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|z| z.name.as_str())
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if the catalog has no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl<'a> IntoIterator for &'a ZoneCatalog {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ]
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = ZoneCatalog::builtin();

        assert_eq!(catalog.len(), 1);
        let zone = catalog.get("Radio Frequenza Libera").unwrap();
        assert_eq!(zone.boundary().len(), 4);
        assert!(zone.contains(GeoPoint::new(41.10874, 16.87967)));
    }

    #[test]
    fn test_zone_requires_three_vertices() {
        let result = Zone::new("Line", [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]);
        assert!(matches!(
            result,
            Err(CatalogError::TooFewVertices { count: 2, .. })
        ));
    }

    #[test]
    fn test_reserved_names_rejected() {
        assert!(matches!(
            Zone::new(UNKNOWN_ZONE_LABEL, triangle()),
            Err(CatalogError::ReservedName(_))
        ));
        assert!(matches!(
            Zone::new("near: Bar", triangle()),
            Err(CatalogError::ReservedName(_))
        ));
        assert!(matches!(
            Zone::new("   ", triangle()),
            Err(CatalogError::EmptyName)
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = Zone::new("Atrio", triangle()).unwrap();
        let b = Zone::new("Atrio", triangle()).unwrap();

        let result = ZoneCatalog::new(vec![a, b]);
        assert!(matches!(result, Err(CatalogError::DuplicateName(name)) if name == "Atrio"));
    }

    #[test]
    fn test_parse_json_catalog() {
        let json = r#"{
            "zones": [
                { "name": "Bar", "points": [
                    {"lat": 41.0, "lon": 16.0},
                    {"lat": 41.0, "lon": 16.001},
                    {"lat": 41.001, "lon": 16.001}
                ] },
                { "name": "DEI", "points": [
                    {"lat": 42.0, "lon": 16.0},
                    {"lat": 42.0, "lon": 16.001},
                    {"lat": 42.001, "lon": 16.001}
                ] }
            ]
        }"#;

        let catalog = ZoneCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Bar", "DEI"]);
        assert!(catalog.get("Cortile").is_none());
    }

    #[test]
    fn test_parse_rejects_short_zone() {
        let json = r#"{ "zones": [ { "name": "Bar", "points": [ {"lat": 1.0, "lon": 1.0} ] } ] }"#;
        assert!(matches!(
            ZoneCatalog::from_json_str(json),
            Err(CatalogError::TooFewVertices { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            ZoneCatalog::from_json_str("{ zones: "),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_and_serialize_roundtrip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("zones.json");

        let catalog = ZoneCatalog::builtin();
        std::fs::write(&path, catalog.to_json_string()).unwrap();

        let loaded = ZoneCatalog::load(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = ZoneCatalog::load(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_iteration_order() {
        let zones = vec![
            Zone::new("B", triangle()).unwrap(),
            Zone::new("A", triangle()).unwrap(),
        ];
        let catalog = ZoneCatalog::new(zones).unwrap();

        let names: Vec<&str> = (&catalog).into_iter().map(Zone::name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
