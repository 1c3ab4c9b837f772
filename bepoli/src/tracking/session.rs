//! Tracking session - binds a location source to a zone resolver.
//!
//! [`ZoneTracker`] owns one session's mutable state (resolver, last
//! coordinate, status) and the active [`Watch`] on its location source.
//! Samples arrive through a [`SampleSink`] handed to the source; each sink
//! carries the generation it was created for, and the session discards
//! anything delivered by a sink whose generation is no longer current.
//!
//! # Generations
//!
//! Every `start_tracking()` and every effective `stop_tracking()` advances
//! the generation. The generation check and the state mutation happen under
//! the same write lock, so once `stop_tracking()` returns no earlier sink can
//! change the session.
//!
//! # Notification
//!
//! Confirmed changes are delivered, in order, to the optional handler given
//! at construction and to every broadcast subscriber. Both run after the
//! state lock is released, so a handler may query the tracker.
//!
//! Delivery holds the session's delivery lock from the generation check
//! until the last subscriber has been sent the change. `start_tracking()`
//! and `stop_tracking()` take the same lock before advancing the generation,
//! so no change from an earlier generation is delivered after either returns.
//! A handler must therefore not start or stop its own tracker.
//!
//! Locks are always taken in the order delivery, watch, state.

use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};

use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use super::source::{LocationError, LocationSource, Watch};
use super::state::{LocationSample, TrackingSnapshot, TrackingStatus, ZoneChange};
use crate::geo::GeoPoint;
use crate::zone::{ResolverConfig, ZoneCatalog, ZoneLabel, ZoneResolver};

/// Callback invoked on every confirmed zone change.
pub type ZoneChangeHandler = Arc<dyn Fn(&ZoneChange) + Send + Sync>;

/// Capacity of the zone change broadcast channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Errors raised by tracking operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// The location source could not start.
    #[error("Cannot start tracking: {0}")]
    SourceUnavailable(#[from] LocationError),

    /// The zone is not in the catalog.
    #[error("Unknown zone '{0}'")]
    UnknownZone(String),
}

/// Mutable per-session state.
struct SessionState {
    resolver: ZoneResolver,
    status: TrackingStatus,
    coords: Option<GeoPoint>,
    accuracy: Option<f64>,
    samples_seen: u64,
    pinned_zone: Option<String>,
    generation: u64,
}

impl SessionState {
    fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            status: self.status,
            coords: self.coords,
            accuracy: self.accuracy,
            zone: self.resolver.confirmed().clone(),
            candidate: self.resolver.candidate().cloned(),
            stability_counter: self.resolver.stability_counter(),
            samples_seen: self.samples_seen,
            pinned_zone: self.pinned_zone.clone(),
            generation: self.generation,
        }
    }
}

/// Shared core of a tracker; sinks hold it weakly.
struct TrackerInner {
    state: RwLock<SessionState>,
    watch: Mutex<Option<Watch>>,
    delivery: Mutex<()>,
    handler: Option<ZoneChangeHandler>,
    changes_tx: broadcast::Sender<ZoneChange>,
}

impl TrackerInner {
    fn is_current(&self, generation: u64) -> bool {
        self.state.read().unwrap().generation == generation
    }

    fn process_sample(&self, generation: u64, sample: LocationSample) -> bool {
        let _delivery = self.delivery.lock().unwrap();
        let change = {
            let mut state = self.state.write().unwrap();
            if state.generation != generation || state.status == TrackingStatus::Idle {
                trace!(
                    generation,
                    current = state.generation,
                    "Ignoring sample from stale watch"
                );
                return false;
            }

            if state.status == TrackingStatus::Error {
                info!("Location source recovered");
                state.status = TrackingStatus::Tracking;
            }

            state.coords = Some(sample.point());
            state.accuracy = Some(sample.accuracy);
            state.samples_seen += 1;

            let previous = state.resolver.confirmed().clone();
            let step = state.resolver.observe(sample.point());

            debug!(
                lat = format!("{:.6}", sample.lat),
                lon = format!("{:.6}", sample.lon),
                accuracy_m = format!("{:.0}", sample.accuracy),
                raw = %step.classification.label,
                counter = state.resolver.stability_counter(),
                "Sample classified"
            );

            step.confirmed.map(|label| ZoneChange {
                label,
                previous,
                sample,
                generation,
            })
        };

        if let Some(change) = change {
            self.notify(change);
        }
        true
    }

    fn process_failure(&self, generation: u64, reason: &str) -> bool {
        let mut state = self.state.write().unwrap();
        if state.generation != generation || state.status == TrackingStatus::Idle {
            trace!(generation, "Ignoring failure from stale watch");
            return false;
        }

        warn!(
            reason,
            zone = %state.resolver.confirmed(),
            "Location source failed, keeping last confirmed zone"
        );
        state.status = TrackingStatus::Error;
        true
    }

    fn notify(&self, change: ZoneChange) {
        info!(
            zone = %change.label,
            previous = %change.previous,
            generation = change.generation,
            "Zone change confirmed"
        );

        if let Some(handler) = &self.handler {
            handler(&change);
        }
        // No subscribers is fine
        let _ = self.changes_tx.send(change);
    }
}

/// Delivery handle given to a location source for one generation.
///
/// Cheap to clone. Pushing through a sink whose generation has ended, or
/// whose tracker has been dropped, is a no-op.
#[derive(Clone)]
pub struct SampleSink {
    inner: Weak<TrackerInner>,
    generation: u64,
}

impl SampleSink {
    /// Deliver a sample. Returns false if the sample was ignored.
    pub fn push(&self, sample: LocationSample) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.process_sample(self.generation, sample),
            None => false,
        }
    }

    /// Report a mid-session failure. Returns false if it was ignored.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.process_failure(self.generation, &reason.into()),
            None => false,
        }
    }

    /// Returns true while this sink's generation is the session's current one.
    pub fn is_current(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.is_current(self.generation))
    }

    /// Generation this sink delivers for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for SampleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleSink")
            .field("generation", &self.generation)
            .field("attached", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Zone tracking session.
///
/// Cloning yields another handle to the same session.
///
/// # Usage
///
/// ```ignore
/// let (source, feed) = ChannelSource::new("gps");
/// let tracker = ZoneTracker::with_handler(
///     Arc::new(ZoneCatalog::builtin()),
///     ResolverConfig::default(),
///     Arc::new(source),
///     |change| println!("Now in: {}", change.label),
/// );
///
/// tracker.start_tracking()?;
/// feed.send(LocationSample::new(41.10874, 16.87967, 8.0));
/// // ...
/// tracker.stop_tracking();
/// ```
#[derive(Clone)]
pub struct ZoneTracker {
    inner: Arc<TrackerInner>,
    source: Arc<dyn LocationSource>,
}

impl ZoneTracker {
    /// Create an idle tracker without a change handler.
    pub fn new(
        catalog: Arc<ZoneCatalog>,
        config: ResolverConfig,
        source: Arc<dyn LocationSource>,
    ) -> Self {
        Self::build(catalog, config, source, None)
    }

    /// Create an idle tracker that calls `handler` on every confirmed change.
    pub fn with_handler<F>(
        catalog: Arc<ZoneCatalog>,
        config: ResolverConfig,
        source: Arc<dyn LocationSource>,
        handler: F,
    ) -> Self
    where
        F: Fn(&ZoneChange) + Send + Sync + 'static,
    {
        Self::build(catalog, config, source, Some(Arc::new(handler)))
    }

    fn build(
        catalog: Arc<ZoneCatalog>,
        config: ResolverConfig,
        source: Arc<dyn LocationSource>,
        handler: Option<ZoneChangeHandler>,
    ) -> Self {
        let (changes_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let state = SessionState {
            resolver: ZoneResolver::new(catalog, config),
            status: TrackingStatus::Idle,
            coords: None,
            accuracy: None,
            samples_seen: 0,
            pinned_zone: None,
            generation: 0,
        };

        Self {
            inner: Arc::new(TrackerInner {
                state: RwLock::new(state),
                watch: Mutex::new(None),
                delivery: Mutex::new(()),
                handler,
                changes_tx,
            }),
            source,
        }
    }

    /// Start (or restart) tracking.
    ///
    /// Any previous watch is cancelled first so no duplicate deliveries
    /// occur. Stability state is reset. If the source is unavailable the
    /// status becomes [`TrackingStatus::Error`] and no sampling begins.
    pub fn start_tracking(&self) -> Result<(), TrackingError> {
        let generation = {
            let _delivery = self.inner.delivery.lock().unwrap();
            if let Some(previous) = self.inner.watch.lock().unwrap().take() {
                debug!("Cancelling previous location watch");
                previous.cancel();
            }
            let mut state = self.inner.state.write().unwrap();
            state.generation += 1;
            state.resolver.reset();
            state.samples_seen = 0;
            state.status = TrackingStatus::Tracking;
            state.generation
        };

        let sink = SampleSink {
            inner: Arc::downgrade(&self.inner),
            generation,
        };

        match self.source.watch(sink) {
            Ok(watch) => {
                let mut slot = self.inner.watch.lock().unwrap();
                if !self.inner.is_current(generation) {
                    // Stopped or restarted while the source was starting
                    drop(slot);
                    watch.cancel();
                    return Ok(());
                }
                if let Some(stale) = slot.replace(watch) {
                    stale.cancel();
                }
                drop(slot);
                info!(
                    source = self.source.name(),
                    generation, "Zone tracking started"
                );
                Ok(())
            }
            Err(e) => {
                let _delivery = self.inner.delivery.lock().unwrap();
                let mut state = self.inner.state.write().unwrap();
                if state.generation == generation {
                    // Retire the rejected sink's generation too
                    state.generation += 1;
                    state.status = TrackingStatus::Error;
                }
                warn!(source = self.source.name(), error = %e, "Location source unavailable");
                Err(TrackingError::SourceUnavailable(e))
            }
        }
    }

    /// Stop tracking and reset the session.
    ///
    /// Clears coordinate and accuracy, resets the label to the sentinel and
    /// the status to idle. Calling it again, or on an idle tracker, has no
    /// further effect. The pinned zone is kept.
    pub fn stop_tracking(&self) {
        let _delivery = self.inner.delivery.lock().unwrap();
        let mut slot = self.inner.watch.lock().unwrap();
        let had_watch = slot.is_some();
        if let Some(watch) = slot.take() {
            debug!(
                delivery_finished = watch.is_finished(),
                "Cancelling location watch"
            );
            watch.cancel();
        }

        let mut state = self.inner.state.write().unwrap();
        if !had_watch && state.status == TrackingStatus::Idle {
            return;
        }

        state.generation += 1;
        state.resolver.reset();
        state.coords = None;
        state.accuracy = None;
        state.samples_seen = 0;
        state.status = TrackingStatus::Idle;

        info!(generation = state.generation, "Zone tracking stopped");
    }

    /// Pin a catalog zone as the effective location.
    pub fn pin_zone(&self, name: &str) -> Result<(), TrackingError> {
        let mut state = self.inner.state.write().unwrap();
        if state.resolver.catalog().get(name).is_none() {
            return Err(TrackingError::UnknownZone(name.to_string()));
        }
        info!(zone = name, "Zone pinned");
        state.pinned_zone = Some(name.to_string());
        Ok(())
    }

    /// Remove the pinned zone; the GPS label applies again.
    pub fn clear_pin(&self) {
        let mut state = self.inner.state.write().unwrap();
        if let Some(previous) = state.pinned_zone.take() {
            info!(zone = %previous, "Zone pin cleared");
        }
    }

    /// Full observable state.
    pub fn snapshot(&self) -> TrackingSnapshot {
        self.inner.state.read().unwrap().snapshot()
    }

    /// Current status.
    pub fn status(&self) -> TrackingStatus {
        self.inner.state.read().unwrap().status
    }

    /// Returns true while a subscription is active (including after a
    /// mid-session failure, until stopped).
    pub fn is_tracking(&self) -> bool {
        self.inner.watch.lock().unwrap().is_some()
    }

    /// Current confirmed GPS label.
    pub fn zone(&self) -> ZoneLabel {
        self.inner.state.read().unwrap().resolver.confirmed().clone()
    }

    /// Last raw coordinate.
    pub fn coords(&self) -> Option<GeoPoint> {
        self.inner.state.read().unwrap().coords
    }

    /// Last reported accuracy in meters.
    pub fn accuracy(&self) -> Option<f64> {
        self.inner.state.read().unwrap().accuracy
    }

    /// Pinned zone if set, otherwise the confirmed GPS label.
    pub fn effective_location(&self) -> ZoneLabel {
        self.snapshot().effective_location()
    }

    /// Feed filter key for the effective location.
    pub fn feed_location(&self) -> String {
        self.snapshot().feed_location()
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.inner.state.read().unwrap().generation
    }

    /// Subscribe to confirmed zone changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ZoneChange> {
        self.inner.changes_tx.subscribe()
    }

    /// The zone catalog this session resolves against.
    pub fn catalog(&self) -> Arc<ZoneCatalog> {
        self.inner.state.read().unwrap().resolver.catalog().clone()
    }

    /// Resolver configuration.
    pub fn config(&self) -> ResolverConfig {
        self.inner.state.read().unwrap().resolver.config()
    }

    /// Name of the location source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::source::ChannelSource;
    use crate::zone::{Zone, UNKNOWN_ZONE_LABEL};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, OnceLock};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Source that hands its sinks to the test for synchronous delivery.
    #[derive(Default)]
    struct ManualSource {
        unavailable: AtomicBool,
        sinks: Mutex<Vec<SampleSink>>,
        tokens: Mutex<Vec<CancellationToken>>,
    }

    impl ManualSource {
        fn sink(&self) -> SampleSink {
            self.sinks.lock().unwrap().last().cloned().unwrap()
        }

        fn token(&self, index: usize) -> CancellationToken {
            self.tokens.lock().unwrap()[index].clone()
        }

        fn watch_count(&self) -> usize {
            self.sinks.lock().unwrap().len()
        }
    }

    impl LocationSource for ManualSource {
        fn name(&self) -> &str {
            "manual"
        }

        fn watch(&self, sink: SampleSink) -> Result<Watch, LocationError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(LocationError::Unavailable {
                    source_name: "manual".into(),
                    reason: "no receiver".into(),
                });
            }
            let token = CancellationToken::new();
            self.sinks.lock().unwrap().push(sink);
            self.tokens.lock().unwrap().push(token.clone());
            Ok(Watch::new(token))
        }
    }

    /// Source whose first watch restarts the tracker before returning.
    #[derive(Default)]
    struct RestartingSource {
        tracker: OnceLock<ZoneTracker>,
        tokens: Mutex<Vec<CancellationToken>>,
    }

    impl LocationSource for RestartingSource {
        fn name(&self) -> &str {
            "restarting"
        }

        fn watch(&self, _sink: SampleSink) -> Result<Watch, LocationError> {
            let token = CancellationToken::new();
            let first = {
                let mut tokens = self.tokens.lock().unwrap();
                tokens.push(token.clone());
                tokens.len() == 1
            };
            if first {
                if let Some(tracker) = self.tracker.get() {
                    tracker.start_tracking().unwrap();
                }
            }
            Ok(Watch::new(token))
        }
    }

    /// Parks the emitting thread on an INFO event until released.
    struct ParkOnInfo {
        parked: mpsc::Sender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl<S: Subscriber> Layer<S> for ParkOnInfo {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::INFO {
                let _ = self.parked.send(());
                let _ = self.release.lock().unwrap().recv();
            }
        }
    }

    fn rect(name: &str, south: f64, west: f64, north: f64, east: f64) -> Zone {
        Zone::new(
            name,
            [
                GeoPoint::new(south, west),
                GeoPoint::new(south, east),
                GeoPoint::new(north, east),
                GeoPoint::new(north, west),
            ],
        )
        .unwrap()
    }

    /// Two adjacent zones "A" (west) and "B" (east), far apart enough that
    /// their centers are not near each other.
    fn catalog() -> Arc<ZoneCatalog> {
        Arc::new(
            ZoneCatalog::new(vec![
                rect("A", 41.0, 16.0, 41.001, 16.001),
                rect("B", 41.0, 16.002, 41.001, 16.003),
            ])
            .unwrap(),
        )
    }

    fn in_a() -> LocationSample {
        LocationSample::new(41.0005, 16.0005, 8.0)
    }

    fn in_b() -> LocationSample {
        LocationSample::new(41.0005, 16.0025, 8.0)
    }

    fn far_away() -> LocationSample {
        LocationSample::new(45.0, 9.0, 30.0)
    }

    type Recorded = Arc<Mutex<Vec<ZoneLabel>>>;

    fn tracker() -> (ZoneTracker, Arc<ManualSource>, Recorded) {
        let source = Arc::new(ManualSource::default());
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
        let sink = recorded.clone();
        let tracker = ZoneTracker::with_handler(
            catalog(),
            ResolverConfig::default(),
            source.clone(),
            move |change| sink.lock().unwrap().push(change.label.clone()),
        );
        (tracker, source, recorded)
    }

    fn a() -> ZoneLabel {
        ZoneLabel::Inside("A".into())
    }

    #[test]
    fn test_new_tracker_is_idle() {
        let (tracker, source, _) = tracker();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, TrackingStatus::Idle);
        assert_eq!(snapshot.zone, ZoneLabel::Unknown);
        assert!(snapshot.coords.is_none());
        assert!(!tracker.is_tracking());
        assert_eq!(source.watch_count(), 0);
    }

    #[test]
    fn test_start_tracking() {
        let (tracker, source, _) = tracker();

        tracker.start_tracking().unwrap();

        assert_eq!(tracker.status(), TrackingStatus::Tracking);
        assert!(tracker.is_tracking());
        assert_eq!(source.watch_count(), 1);
        assert!(source.sink().is_current());
    }

    #[test]
    fn test_three_samples_confirm_once() {
        let (tracker, source, recorded) = tracker();
        tracker.start_tracking().unwrap();
        let sink = source.sink();

        sink.push(in_a());
        sink.push(in_a());
        assert!(recorded.lock().unwrap().is_empty());
        assert_eq!(tracker.zone(), ZoneLabel::Unknown);

        sink.push(in_a());
        assert_eq!(*recorded.lock().unwrap(), vec![a()]);
        assert_eq!(tracker.zone(), a());

        // Further agreeing samples do not notify again
        sink.push(in_a());
        sink.push(in_a());
        assert_eq!(recorded.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stop_waits_for_in_flight_change() {
        let source = Arc::new(ManualSource::default());
        let stopped = Arc::new(AtomicBool::new(false));
        let after_stop: Recorded = Arc::new(Mutex::new(Vec::new()));
        let (flag, late) = (stopped.clone(), after_stop.clone());
        let config = ResolverConfig {
            stability_threshold: 2,
            ..ResolverConfig::default()
        };
        let tracker = ZoneTracker::with_handler(catalog(), config, source.clone(), move |change| {
            if flag.load(Ordering::SeqCst) {
                late.lock().unwrap().push(change.label.clone());
            }
        });
        tracker.start_tracking().unwrap();
        let sink = source.sink();

        let (parked_tx, parked_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gate = tracing_subscriber::registry().with(ParkOnInfo {
            parked: parked_tx,
            release: Mutex::new(release_rx),
        });
        let pusher = std::thread::spawn(move || {
            tracing::subscriber::with_default(gate, || {
                sink.push(in_a());
                sink.push(in_a());
            });
        });

        // The second sample confirms "A"; delivery is parked at its log line
        parked_rx.recv().unwrap();
        let stopper = {
            let tracker = tracker.clone();
            let stopped = stopped.clone();
            std::thread::spawn(move || {
                tracker.stop_tracking();
                stopped.store(true, Ordering::SeqCst);
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        assert!(
            !stopped.load(Ordering::SeqCst),
            "stop_tracking returned while a change was being delivered"
        );

        release_tx.send(()).unwrap();
        drop(release_tx);
        pusher.join().unwrap();
        stopper.join().unwrap();

        assert!(after_stop.lock().unwrap().is_empty());
        assert_eq!(tracker.status(), TrackingStatus::Idle);
        assert_eq!(tracker.zone(), ZoneLabel::Unknown);
    }

    #[test]
    fn test_superseded_start_keeps_newer_watch() {
        let source = Arc::new(RestartingSource::default());
        let tracker = ZoneTracker::new(catalog(), ResolverConfig::default(), source.clone());
        let _ = source.tracker.set(tracker.clone());

        tracker.start_tracking().unwrap();

        let tokens = source.tokens.lock().unwrap().clone();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is_cancelled(), "outer start must discard its own watch");
        assert!(!tokens[1].is_cancelled(), "newer watch must stay live");
        assert!(tracker.is_tracking());
        assert_eq!(tracker.status(), TrackingStatus::Tracking);
        assert_eq!(tracker.generation(), 2);
    }

    #[test]
    fn test_interrupted_run_never_notifies() {
        let (tracker, source, recorded) = tracker();
        tracker.start_tracking().unwrap();
        let sink = source.sink();

        sink.push(in_a());
        sink.push(in_a());
        sink.push(in_b());

        assert!(recorded.lock().unwrap().is_empty());
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.candidate, Some(ZoneLabel::Inside("B".into())));
        assert_eq!(snapshot.stability_counter, 1);
    }

    #[test]
    fn test_samples_update_coords_and_accuracy() {
        let (tracker, source, _) = tracker();
        tracker.start_tracking().unwrap();

        source.sink().push(in_b());

        assert_eq!(tracker.coords(), Some(GeoPoint::new(41.0005, 16.0025)));
        assert_eq!(tracker.accuracy(), Some(8.0));
    }

    #[test]
    fn test_stop_resets_state() {
        let (tracker, source, _) = tracker();
        tracker.start_tracking().unwrap();
        for _ in 0..3 {
            source.sink().push(in_a());
        }

        tracker.stop_tracking();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, TrackingStatus::Idle);
        assert_eq!(snapshot.zone, ZoneLabel::Unknown);
        assert_eq!(snapshot.zone.to_string(), UNKNOWN_ZONE_LABEL);
        assert!(snapshot.coords.is_none());
        assert!(snapshot.accuracy.is_none());
        assert!(snapshot.candidate.is_none());
        assert_eq!(snapshot.stability_counter, 0);
        assert!(source.token(0).is_cancelled());
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (tracker, source, _) = tracker();
        tracker.start_tracking().unwrap();
        source.sink().push(in_a());

        tracker.stop_tracking();
        let once = tracker.snapshot();
        tracker.stop_tracking();
        let twice = tracker.snapshot();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_stop_when_never_started() {
        let (tracker, _, _) = tracker();
        let before = tracker.snapshot();

        tracker.stop_tracking();

        assert_eq!(tracker.snapshot(), before);
    }

    #[test]
    fn test_stale_sink_ignored_after_stop() {
        let (tracker, source, recorded) = tracker();
        tracker.start_tracking().unwrap();
        let sink = source.sink();

        tracker.stop_tracking();

        assert!(!sink.is_current());
        for _ in 0..5 {
            assert!(!sink.push(in_a()));
        }
        assert!(!sink.fail("late failure"));
        assert!(recorded.lock().unwrap().is_empty());
        assert!(tracker.coords().is_none());
        assert_eq!(tracker.status(), TrackingStatus::Idle);
    }

    #[test]
    fn test_restart_cancels_previous_watch() {
        let (tracker, source, recorded) = tracker();
        tracker.start_tracking().unwrap();
        let first = source.sink();

        tracker.start_tracking().unwrap();
        let second = source.sink();

        assert!(source.token(0).is_cancelled());
        assert!(!source.token(1).is_cancelled());
        assert_ne!(first.generation(), second.generation());

        // Only the current sink is heard: no duplicate callbacks
        for _ in 0..3 {
            assert!(!first.push(in_a()));
            assert!(second.push(in_a()));
        }
        assert_eq!(*recorded.lock().unwrap(), vec![a()]);
    }

    #[test]
    fn test_restart_resets_stability() {
        let (tracker, source, _) = tracker();
        tracker.start_tracking().unwrap();
        for _ in 0..3 {
            source.sink().push(in_a());
        }
        assert_eq!(tracker.zone(), a());

        tracker.start_tracking().unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.zone, ZoneLabel::Unknown);
        assert_eq!(snapshot.stability_counter, 0);
        assert_eq!(snapshot.status, TrackingStatus::Tracking);
    }

    #[test]
    fn test_unavailable_source() {
        let (tracker, source, _) = tracker();
        source.unavailable.store(true, Ordering::SeqCst);

        let result = tracker.start_tracking();

        assert!(matches!(result, Err(TrackingError::SourceUnavailable(_))));
        assert_eq!(tracker.status(), TrackingStatus::Error);
        assert!(!tracker.is_tracking());
        assert_eq!(source.watch_count(), 0);

        // Retry once the source is back
        source.unavailable.store(false, Ordering::SeqCst);
        tracker.start_tracking().unwrap();
        assert_eq!(tracker.status(), TrackingStatus::Tracking);
    }

    #[test]
    fn test_stop_after_failed_start_returns_to_idle() {
        let (tracker, source, _) = tracker();
        source.unavailable.store(true, Ordering::SeqCst);
        let _ = tracker.start_tracking();

        tracker.stop_tracking();

        assert_eq!(tracker.status(), TrackingStatus::Idle);
    }

    #[test]
    fn test_mid_session_failure_keeps_label() {
        let (tracker, source, _) = tracker();
        tracker.start_tracking().unwrap();
        let sink = source.sink();
        for _ in 0..3 {
            sink.push(in_a());
        }

        assert!(sink.fail("permission revoked"));

        assert_eq!(tracker.status(), TrackingStatus::Error);
        assert_eq!(tracker.zone(), a());
        assert!(tracker.is_tracking());

        // A later reading resumes tracking
        sink.push(in_a());
        assert_eq!(tracker.status(), TrackingStatus::Tracking);
    }

    #[test]
    fn test_change_payload_and_broadcast() {
        let (tracker, source, _) = tracker();
        let mut rx = tracker.subscribe();
        tracker.start_tracking().unwrap();
        let sink = source.sink();

        for _ in 0..3 {
            sink.push(in_a());
        }
        for _ in 0..3 {
            sink.push(far_away());
        }

        let first = rx.try_recv().expect("first change");
        assert_eq!(first.label, a());
        assert_eq!(first.previous, ZoneLabel::Unknown);
        assert_eq!(first.sample, in_a());
        assert_eq!(first.generation, sink.generation());

        let second = rx.try_recv().expect("second change");
        assert_eq!(second.label, ZoneLabel::Unknown);
        assert_eq!(second.previous, a());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_handler_can_query_tracker() {
        let source = Arc::new(ManualSource::default());
        let seen: Arc<Mutex<Option<ZoneLabel>>> = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let tracker_slot: Arc<Mutex<Option<ZoneTracker>>> = Arc::new(Mutex::new(None));
        let handle = tracker_slot.clone();

        let tracker = ZoneTracker::with_handler(
            catalog(),
            ResolverConfig::default(),
            source.clone(),
            move |_| {
                if let Some(tracker) = handle.lock().unwrap().as_ref() {
                    *slot.lock().unwrap() = Some(tracker.zone());
                }
            },
        );
        *tracker_slot.lock().unwrap() = Some(tracker.clone());

        tracker.start_tracking().unwrap();
        for _ in 0..3 {
            source.sink().push(in_a());
        }

        assert_eq!(*seen.lock().unwrap(), Some(a()));
        tracker_slot.lock().unwrap().take();
    }

    #[test]
    fn test_pin_zone() {
        let (tracker, source, _) = tracker();
        tracker.start_tracking().unwrap();
        for _ in 0..3 {
            source.sink().push(in_a());
        }

        assert!(matches!(
            tracker.pin_zone("Cortile"),
            Err(TrackingError::UnknownZone(name)) if name == "Cortile"
        ));

        tracker.pin_zone("B").unwrap();
        assert_eq!(tracker.effective_location(), ZoneLabel::Inside("B".into()));
        assert_eq!(tracker.feed_location(), "B");
        // GPS zone still tracked underneath
        assert_eq!(tracker.zone(), a());

        tracker.stop_tracking();
        assert_eq!(tracker.snapshot().pinned_zone.as_deref(), Some("B"));

        tracker.clear_pin();
        assert_eq!(tracker.effective_location(), ZoneLabel::Unknown);
        assert_eq!(tracker.feed_location(), UNKNOWN_ZONE_LABEL);
    }

    #[test]
    fn test_dropped_tracker_detaches_sink() {
        let (tracker, source, _) = tracker();
        tracker.start_tracking().unwrap();
        let sink = source.sink();

        drop(tracker);

        assert!(!sink.push(in_a()));
        assert!(!sink.is_current());
        assert!(source.token(0).is_cancelled());
    }

    #[test]
    fn test_channel_source_requires_runtime() {
        let (source, _feed) = ChannelSource::new("gps");
        let tracker = ZoneTracker::new(catalog(), ResolverConfig::default(), Arc::new(source));

        let result = tracker.start_tracking();

        assert!(matches!(result, Err(TrackingError::SourceUnavailable(_))));
        assert_eq!(tracker.status(), TrackingStatus::Error);
    }

    #[tokio::test]
    async fn test_channel_source_end_to_end() {
        let (source, feed) = ChannelSource::new("gps");
        let tracker = ZoneTracker::new(catalog(), ResolverConfig::default(), Arc::new(source));
        let mut rx = tracker.subscribe();

        tracker.start_tracking().unwrap();
        assert_eq!(feed.watchers(), 1);

        for _ in 0..3 {
            assert!(feed.send(in_b()));
        }

        let change = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("change within timeout")
            .expect("channel open");
        assert_eq!(change.label, ZoneLabel::Inside("B".into()));

        tracker.stop_tracking();
        feed.send(in_a());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(tracker.status(), TrackingStatus::Idle);
        assert!(tracker.coords().is_none());
    }

    #[tokio::test]
    async fn test_channel_source_failure() {
        let (source, feed) = ChannelSource::new("gps");
        let tracker = ZoneTracker::new(catalog(), ResolverConfig::default(), Arc::new(source));
        tracker.start_tracking().unwrap();

        feed.fail("permission revoked");

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while tracker.status() != TrackingStatus::Error {
            assert!(tokio::time::Instant::now() < deadline, "failure not delivered");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(tracker.is_tracking());
    }
}
