//! Trace replay - feeds a recorded GPS trace into a session on a timer.
//!
//! Traces are plain text, one sample per line:
//!
//! ```text
//! # lat,lon[,accuracy]
//! 41.10874,16.87967,8
//! 41.10875,16.87968
//! ```
//!
//! Blank lines and `#` comments are skipped. A missing accuracy is 0.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::session::SampleSink;
use super::source::{LocationError, LocationSource, Watch};
use super::state::LocationSample;

/// Errors reading a trace.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid trace line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

/// A recorded sequence of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    samples: Vec<LocationSample>,
}

impl Trace {
    /// Parse trace text. Line numbers in errors are 1-based.
    pub fn parse(text: &str) -> Result<Self, TraceError> {
        let mut samples = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            samples.push(parse_line(line).map_err(|reason| TraceError::InvalidLine {
                line: index + 1,
                reason,
            })?);
        }

        Ok(Self { samples })
    }

    /// Read and parse a trace file.
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let text = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trace = Self::parse(&text)?;
        debug!(path = %path.display(), samples = trace.len(), "Loaded trace");
        Ok(trace)
    }

    pub fn samples(&self) -> &[LocationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<LocationSample>> for Trace {
    fn from(samples: Vec<LocationSample>) -> Self {
        Self { samples }
    }
}

fn parse_line(line: &str) -> Result<LocationSample, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(format!(
            "expected 'lat,lon[,accuracy]', found {} fields",
            fields.len()
        ));
    }

    let number = |name: &str, value: &str| -> Result<f64, String> {
        let parsed: f64 = value
            .parse()
            .map_err(|_| format!("{} '{}' is not a number", name, value))?;
        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err(format!("{} '{}' is not finite", name, value))
        }
    };

    let lat = number("latitude", fields[0])?;
    let lon = number("longitude", fields[1])?;
    let accuracy = match fields.get(2) {
        Some(value) => number("accuracy", value)?,
        None => 0.0,
    };

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {} out of range", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {} out of range", lon));
    }

    Ok(LocationSample::new(lat, lon, accuracy))
}

/// Location source that replays a trace, one sample per interval.
///
/// The first sample is delivered immediately. When the trace is exhausted
/// the watch stays open (like a GPS that stopped moving). The replay task
/// also ends early if its watch is cancelled or the session stops taking
/// samples; [`wait_finished`](Self::wait_finished) returns in every case.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    name: String,
    samples: Arc<Vec<LocationSample>>,
    interval: Duration,
    finished: Arc<Notify>,
}

impl ReplaySource {
    pub fn new(name: impl Into<String>, trace: Trace, interval: Duration) -> Self {
        Self {
            name: name.into(),
            samples: Arc::new(trace.samples),
            interval,
            finished: Arc::new(Notify::new()),
        }
    }

    /// Number of samples in the trace.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Wait until a replay task has ended, whether or not it delivered the
    /// whole trace.
    pub async fn wait_finished(&self) {
        self.finished.notified().await;
    }
}

impl LocationSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn watch(&self, sink: SampleSink) -> Result<Watch, LocationError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| LocationError::Unavailable {
                source_name: self.name.clone(),
                reason: e.to_string(),
            })?;

        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let samples = Arc::clone(&self.samples);
        let finished = Arc::clone(&self.finished);
        let interval = self.interval.max(Duration::from_millis(1));
        let name = self.name.clone();

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            let mut delivered = 0;
            for sample in samples.iter() {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(source = %name, delivered, "Replay cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !sink.push(*sample) {
                            debug!(source = %name, delivered, "Replay session ended");
                            break;
                        }
                        delivered += 1;
                    }
                }
            }

            if delivered == samples.len() {
                info!(source = %name, samples = delivered, "Replay finished");
            }
            finished.notify_one();
        });

        Ok(Watch::with_task(cancellation, task))
    }
}
