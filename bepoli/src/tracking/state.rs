//! Core state types for zone tracking.
//!
//! - [`LocationSample`] - One GPS observation
//! - [`TrackingStatus`] - Is a subscription active?
//! - [`ZoneChange`] - Payload of a confirmed zone change
//! - [`TrackingSnapshot`] - Full observable state for consumers

use std::fmt;

use crate::geo::GeoPoint;
use crate::zone::ZoneLabel;

/// One observation from a location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    /// Latitude in degrees.
    pub lat: f64,

    /// Longitude in degrees.
    pub lon: f64,

    /// Reported horizontal uncertainty in meters.
    ///
    /// Advisory only: carried through for display, not used to classify.
    pub accuracy: f64,
}

impl LocationSample {
    /// Create a sample.
    pub fn new(lat: f64, lon: f64, accuracy: f64) -> Self {
        Self { lat, lon, accuracy }
    }

    /// The sample's position.
    #[inline]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Tracking session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingStatus {
    /// Never started, or stopped.
    #[default]
    Idle,
    /// Subscription to a location source is active.
    Tracking,
    /// The location source is unavailable or reported a failure.
    Error,
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Tracking => write!(f, "tracking"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A confirmed zone change.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneChange {
    /// Newly confirmed label.
    pub label: ZoneLabel,

    /// Label confirmed before this change.
    pub previous: ZoneLabel,

    /// Sample that completed the confirmation.
    pub sample: LocationSample,

    /// Session generation that produced the change.
    pub generation: u64,
}

/// Observable state of a tracking session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSnapshot {
    /// Session status.
    pub status: TrackingStatus,

    /// Last raw coordinate, `None` before the first sample or after stop.
    pub coords: Option<GeoPoint>,

    /// Last reported accuracy in meters.
    pub accuracy: Option<f64>,

    /// Current confirmed label.
    pub zone: ZoneLabel,

    /// Label of the most recent sample (not yet necessarily confirmed).
    pub candidate: Option<ZoneLabel>,

    /// Consecutive samples agreeing with the candidate.
    pub stability_counter: u32,

    /// Samples accepted since tracking started.
    pub samples_seen: u64,

    /// Zone pinned by the user, overriding the GPS zone.
    pub pinned_zone: Option<String>,

    /// Session generation (advances on every start and stop).
    pub generation: u64,
}

impl TrackingSnapshot {
    /// Location to display and tag posts with: the pinned zone if any,
    /// otherwise the confirmed GPS label.
    pub fn effective_location(&self) -> ZoneLabel {
        match &self.pinned_zone {
            Some(name) => ZoneLabel::Inside(name.clone()),
            None => self.zone.clone(),
        }
    }

    /// Key used to filter the feed for the effective location.
    pub fn feed_location(&self) -> String {
        self.effective_location().feed_key().to_string()
    }
}
