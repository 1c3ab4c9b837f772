//! Planar geometry over geographic coordinates
//!
//! Provides the two primitives the zone resolver is built on: an even-odd
//! point-in-polygon test and a point-to-polygon edge distance.
//!
//! Distances use a small-angle planar approximation: degrees are converted to
//! radians and the Euclidean distance is scaled by the Earth radius. This is
//! accurate enough at campus scale (tens to hundreds of meters) and the
//! stability and proximity thresholds are tuned against it, so it must not be
//! replaced with a haversine formula.

mod types;


pub use types::{GeoPoint, EARTH_RADIUS_KM};

/// Tests whether a point lies inside a polygon using ray casting.
///
/// The polygon is implicitly closed (the last vertex connects to the first)
/// and may be wound in either direction. The ray runs along the latitude
/// axis; each boundary edge it crosses flips the result.
///
/// Points exactly on an edge or vertex get whatever answer the crossing count
/// produces.
pub fn point_in_polygon(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    let Some(mut prev) = polygon.last() else {
        return false;
    };

    let mut inside = false;
    for vertex in polygon {
        let (xi, yi) = (vertex.lat, vertex.lon);
        let (xj, yj) = (prev.lat, prev.lon);

        if (yi > point.lon) != (yj > point.lon)
            && point.lat < (xj - xi) * (point.lon - yi) / (yj - yi) + xi
        {
            inside = !inside;
        }
        prev = vertex;
    }

    inside
}

/// Distance in kilometers from a point to the segment `a`-`b`.
///
/// The point is projected onto the line through the segment and the
/// projection parameter is clamped to `[0, 1]`. A zero-length segment
/// measures to its first endpoint.
pub fn point_to_segment_distance_km(point: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let (x0, y0) = (point.lon.to_radians(), point.lat.to_radians());
    let (x1, y1) = (a.lon.to_radians(), a.lat.to_radians());
    let (x2, y2) = (b.lon.to_radians(), b.lat.to_radians());

    let (px, py) = (x0 - x1, y0 - y1);
    let (dx, dy) = (x2 - x1, y2 - y1);
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq != 0.0 {
        ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let ex = x0 - (x1 + t * dx);
    let ey = y0 - (y1 + t * dy);
    EARTH_RADIUS_KM * (ex * ex + ey * ey).sqrt()
}

/// Minimum distance in kilometers from a point to any edge of a polygon.
///
/// Edges wrap around, so vertex `i` connects to vertex `(i + 1) mod n`.
/// Returns `f64::INFINITY` for an empty polygon.
pub fn distance_to_polygon_km(point: GeoPoint, polygon: &[GeoPoint]) -> f64 {
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| point_to_segment_distance_km(point, *a, *b))
        .fold(f64::INFINITY, f64::min)
}

/// Converts a distance in kilometers to the equivalent arc in degrees.
///
/// Inverse of the scaling used by [`point_to_segment_distance_km`]; handy for
/// building offsets that land a known distance from an edge.
#[inline]
pub fn km_to_degrees(km: f64) -> f64 {
    (km / EARTH_RADIUS_KM).to_degrees()
}
