//! Zone labels reported to callers.
//!
//! A label is one of three forms, rendered by [`ZoneLabel`]'s `Display`:
//!
//! - an exact zone name when the position is inside that zone
//! - `"near: <zone name>"` when outside every zone but close to one
//! - the sentinel [`UNKNOWN_ZONE_LABEL`] otherwise

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Label reported when no zone contains or is near the position.
pub const UNKNOWN_ZONE_LABEL: &str = "Fuori dalle aree conosciute";

/// Prefix of the qualified "near" label.
pub const NEAR_PREFIX: &str = "near: ";

/// Classification label for a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ZoneLabel {
    /// Inside the named zone.
    Inside(String),
    /// Outside every zone, within the proximity threshold of the named one.
    Near(String),
    /// Outside known areas.
    #[default]
    Unknown,
}

impl ZoneLabel {
    /// Name of the zone this label refers to, if any.
    pub fn zone_name(&self) -> Option<&str> {
        match self {
            Self::Inside(name) | Self::Near(name) => Some(name),
            Self::Unknown => None,
        }
    }

    /// Returns true if the label refers to a catalog zone.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Key used to filter the location feed.
    ///
    /// Posts are tagged with bare zone names, so the "near" qualifier is
    /// dropped and the sentinel passes through unchanged.
    pub fn feed_key(&self) -> &str {
        self.zone_name().unwrap_or(UNKNOWN_ZONE_LABEL)
    }
}

impl fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inside(name) => f.write_str(name),
            Self::Near(name) => write!(f, "{}{}", NEAR_PREFIX, name),
            Self::Unknown => f.write_str(UNKNOWN_ZONE_LABEL),
        }
    }
}

impl FromStr for ZoneLabel {
    type Err = Infallible;

    /// Parses the rendered label grammar back into a label.
    ///
    /// Empty strings are treated as the sentinel, matching the location
    /// picker's "all positions" choice.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == UNKNOWN_ZONE_LABEL {
            return Ok(Self::Unknown);
        }
        match s.strip_prefix(NEAR_PREFIX) {
            Some(name) => Ok(Self::Near(name.trim().to_string())),
            None => Ok(Self::Inside(s.to_string())),
        }
    }
}
