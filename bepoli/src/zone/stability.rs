//! Stability filter - debounces raw classifications into confirmed zones.
//!
//! GPS samples near a boundary oscillate between neighbouring labels. The
//! filter only confirms a new label after `threshold` consecutive samples
//! agree on it, trading roughly `threshold` sample intervals of latency for a
//! flicker-free zone.
//!
//! # Transitions
//!
//! For each raw label:
//! - same as the candidate: the counter increments
//! - different: it becomes the candidate and the counter restarts at 1
//!
//! A change is emitted when the counter reaches the threshold and the
//! candidate differs from the last confirmed label.

use super::label::ZoneLabel;

/// Default number of agreeing samples required to confirm a change.
pub const DEFAULT_STABILITY_THRESHOLD: u32 = 3;

/// Debounce state for one tracking session.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityFilter {
    threshold: u32,
    last_confirmed: ZoneLabel,
    candidate: Option<ZoneLabel>,
    counter: u32,
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY_THRESHOLD)
    }
}

impl StabilityFilter {
    /// Create a filter in its initial state.
    ///
    /// A threshold of zero is treated as one.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            last_confirmed: ZoneLabel::Unknown,
            candidate: None,
            counter: 0,
        }
    }

    /// Feed one raw label; returns the newly confirmed label on a change.
    pub fn observe(&mut self, label: ZoneLabel) -> Option<ZoneLabel> {
        if self.candidate.as_ref() == Some(&label) {
            self.counter = self.counter.saturating_add(1);
        } else {
            self.candidate = Some(label);
            self.counter = 1;
        }

        if self.counter < self.threshold {
            return None;
        }

        match &self.candidate {
            Some(candidate) if *candidate != self.last_confirmed => {
                self.last_confirmed = candidate.clone();
                Some(candidate.clone())
            }
            _ => None,
        }
    }

    /// Restore the initial state, keeping the threshold.
    pub fn reset(&mut self) {
        self.last_confirmed = ZoneLabel::Unknown;
        self.candidate = None;
        self.counter = 0;
    }

    /// Most recently confirmed label.
    pub fn last_confirmed(&self) -> &ZoneLabel {
        &self.last_confirmed
    }

    /// Label of the most recent sample, if any.
    pub fn candidate(&self) -> Option<&ZoneLabel> {
        self.candidate.as_ref()
    }

    /// Consecutive samples agreeing with the candidate.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Configured confirmation threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
