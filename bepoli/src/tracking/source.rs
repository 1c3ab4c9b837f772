//! Location sources - anything that delivers samples to a tracking session.
//!
//! A source is asked to [`watch`](LocationSource::watch) with a
//! [`SampleSink`]; it pushes samples (and failures) into the sink until the
//! returned [`Watch`] is cancelled or dropped.
//!
//! # Provided Sources
//!
//! - [`ChannelSource`] - In-process feed; producers push through a [`SampleFeed`]
//! - [`ReplaySource`](super::ReplaySource) - Replays a recorded trace on a timer

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::session::SampleSink;
use super::state::LocationSample;

/// Errors reported by location sources.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// The source cannot deliver samples at all.
    #[error("Location source '{source_name}' is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },
}

/// Event pushed by a location source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A new reading.
    Sample(LocationSample),
    /// The source failed mid-session (permission revoked, receiver lost, ...).
    Failure(String),
}

/// Active subscription to a location source.
///
/// Cancelling (or dropping) the watch stops delivery. Any sample already in
/// flight is discarded by the session's generation check.
#[derive(Debug)]
pub struct Watch {
    cancellation: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Watch {
    /// Watch backed only by a cancellation token.
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            task: None,
        }
    }

    /// Watch backed by a spawned delivery task.
    pub fn with_task(cancellation: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            cancellation,
            task: Some(task),
        }
    }

    /// Returns true once the watch has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns true if the delivery task has run to completion.
    ///
    /// Watches without a task never finish on their own.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_some_and(|task| task.is_finished())
    }

    /// Stop delivery.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

/// A provider of location samples.
pub trait LocationSource: Send + Sync {
    /// Human-readable source name for logs and errors.
    fn name(&self) -> &str;

    /// Begin delivering samples to `sink`.
    ///
    /// Returns [`LocationError::Unavailable`] if the source cannot start;
    /// no samples are delivered in that case.
    fn watch(&self, sink: SampleSink) -> Result<Watch, LocationError>;
}

/// Producer half of a [`ChannelSource`].
#[derive(Debug, Clone)]
pub struct SampleFeed {
    events: broadcast::Sender<SourceEvent>,
}

impl SampleFeed {
    /// Push a sample to every active watch.
    ///
    /// Returns false if nobody is watching.
    pub fn send(&self, sample: LocationSample) -> bool {
        self.events.send(SourceEvent::Sample(sample)).is_ok()
    }

    /// Report a source failure to every active watch.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.events.send(SourceEvent::Failure(reason.into())).is_ok()
    }

    /// Number of active watches.
    pub fn watchers(&self) -> usize {
        self.events.receiver_count()
    }
}

/// In-process location source fed through a [`SampleFeed`].
///
/// Each watch subscribes to the feed and forwards events from a tokio task,
/// so watching requires a running tokio runtime. Samples sent while nobody
/// is watching are dropped, like readings from a GPS with no listener.
#[derive(Debug)]
pub struct ChannelSource {
    name: String,
    events: broadcast::Sender<SourceEvent>,
}

impl ChannelSource {
    /// Default feed capacity.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a source and its producer handle.
    pub fn new(name: impl Into<String>) -> (Self, SampleFeed) {
        Self::with_capacity(name, Self::DEFAULT_CAPACITY)
    }

    /// Create with a custom feed capacity.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> (Self, SampleFeed) {
        let (events, _) = broadcast::channel(capacity.max(1));
        let feed = SampleFeed {
            events: events.clone(),
        };
        (
            Self {
                name: name.into(),
                events,
            },
            feed,
        )
    }
}

impl LocationSource for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn watch(&self, sink: SampleSink) -> Result<Watch, LocationError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| LocationError::Unavailable {
                source_name: self.name.clone(),
                reason: e.to_string(),
            })?;

        let mut rx = self.events.subscribe();
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let name = self.name.clone();

        let task = runtime.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    event = rx.recv() => match event {
                        Ok(SourceEvent::Sample(sample)) => {
                            sink.push(sample);
                        }
                        Ok(SourceEvent::Failure(reason)) => {
                            sink.fail(reason);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(source = %name, skipped, "Location feed lagged, samples dropped");
                        }
                        Err(RecvError::Closed) => {
                            debug!(source = %name, "Location feed closed");
                            break;
                        }
                    },
                }
            }
            debug!(source = %name, generation = sink.generation(), "Location watch stopped");
        });

        Ok(Watch::with_task(cancellation, task))
    }
}
