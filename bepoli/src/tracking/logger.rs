//! Periodic session logging for walk-through analysis.
//!
//! Logs the tracker snapshot at DEBUG level on a fixed interval, so a log
//! file shows where the session thought the user was even between zone
//! changes.
//!
//! # Usage
//!
//! ```ignore
//! use bepoli::tracking::{spawn_zone_logger, DEFAULT_LOG_INTERVAL};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancellation = CancellationToken::new();
//! if tracing::enabled!(tracing::Level::DEBUG) {
//!     spawn_zone_logger(tracker.clone(), cancellation.clone(), DEFAULT_LOG_INTERVAL);
//! }
//! ```

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::session::ZoneTracker;

/// Default logging interval (10 seconds).
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Spawns a background task that logs the session snapshot every `interval`.
///
/// Stops when `cancellation` is triggered. Must be called from within a
/// tokio runtime.
pub fn spawn_zone_logger(
    tracker: ZoneTracker,
    cancellation: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    log_snapshot(&tracker);
                }
                _ = cancellation.cancelled() => {
                    tracing::debug!("Zone logger stopped");
                    break;
                }
            }
        }
    })
}

fn log_snapshot(tracker: &ZoneTracker) {
    let snapshot = tracker.snapshot();

    match snapshot.coords {
        Some(coords) => tracing::debug!(
            lat = format!("{:.6}", coords.lat),
            lon = format!("{:.6}", coords.lon),
            accuracy_m = format!("{:.0}", snapshot.accuracy.unwrap_or_default()),
            status = %snapshot.status,
            zone = %snapshot.zone,
            counter = snapshot.stability_counter,
            location = %snapshot.effective_location(),
            "Zone session update"
        ),
        None => tracing::debug!(
            status = %snapshot.status,
            location = %snapshot.effective_location(),
            "Zone session update (no position data)"
        ),
    }
}
