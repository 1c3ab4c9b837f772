//! Track command - replay a recorded trace through a tracking session.
//!
//! Prints every confirmed zone change as it happens, then a summary of the
//! final session state.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bepoli::tracking::{
    spawn_zone_logger, ReplaySource, Trace, TrackingSnapshot, ZoneTracker, DEFAULT_LOG_INTERVAL,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the track command.
pub struct TrackArgs {
    pub trace: PathBuf,
    pub interval_ms: Option<u64>,
    pub stability_threshold: Option<u32>,
    pub near_threshold_km: Option<f64>,
    pub pin: Option<String>,
}

/// Run the track command.
pub fn run(options: GlobalOptions, args: TrackArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("track");

    let trace = Trace::load(&args.trace)?;
    let catalog = runner.load_catalog()?;

    // CLI > config
    let mut resolver_config = runner.resolver_config();
    if let Some(threshold) = args.stability_threshold {
        resolver_config.stability_threshold = threshold;
    }
    if let Some(km) = args.near_threshold_km {
        resolver_config.near_threshold_km = km;
    }
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| runner.config().replay.interval());

    let name = args
        .trace
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "trace".to_string());
    info!(
        trace = %args.trace.display(),
        samples = trace.len(),
        interval_ms = interval.as_millis() as u64,
        stability_threshold = resolver_config.stability_threshold,
        near_threshold_km = resolver_config.near_threshold_km,
        "Replaying trace"
    );
    println!(
        "Replaying {} sample(s) from {} every {} ms",
        trace.len(),
        args.trace.display(),
        interval.as_millis()
    );
    println!();

    let source = ReplaySource::new(name, trace, interval);
    let changes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&changes);
    let tracker = ZoneTracker::with_handler(
        catalog,
        resolver_config,
        Arc::new(source.clone()),
        move |change| {
            let index = counter.fetch_add(1, Ordering::SeqCst) + 1;
            println!(
                "  [{}] {} -> {}  at {} (±{:.0} m)",
                index,
                change.previous,
                change.label,
                change.sample.point(),
                change.sample.accuracy
            );
        },
    );

    if let Some(zone) = &args.pin {
        tracker.pin_zone(zone)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let snapshot = runtime.block_on(async {
        let cancellation = CancellationToken::new();
        if tracing::enabled!(tracing::Level::DEBUG) {
            spawn_zone_logger(tracker.clone(), cancellation.clone(), DEFAULT_LOG_INTERVAL);
        }

        tracker.start_tracking()?;
        source.wait_finished().await;

        let snapshot = tracker.snapshot();
        tracker.stop_tracking();
        cancellation.cancel();
        Ok::<_, CliError>(snapshot)
    })?;

    print_summary(&snapshot, changes.load(Ordering::SeqCst));
    Ok(())
}

fn print_summary(snapshot: &TrackingSnapshot, changes: usize) {
    if changes == 0 {
        println!("  (no zone changes)");
    }
    println!();
    println!(
        "Processed {} sample(s), {} zone change(s)",
        snapshot.samples_seen, changes
    );
    println!("  Zone:     {}", snapshot.zone);
    match &snapshot.pinned_zone {
        Some(pin) => println!("  Location: {} (pinned)", pin),
        None => println!("  Location: {}", snapshot.effective_location()),
    }
    println!("  Feed:     {}", snapshot.feed_location());
    if let Some(coords) = snapshot.coords {
        println!(
            "  Position: {} (±{:.0} m)",
            coords,
            snapshot.accuracy.unwrap_or_default()
        );
    }
    println!("  Status:   {}", snapshot.status);
}
