//! Zone Tracking Module
//!
//! This module runs a **tracking session**: it subscribes to a location
//! source, feeds every sample through a [`ZoneResolver`](crate::zone::ZoneResolver)
//! and reports confirmed zone changes.
//!
//! # Lifecycle
//!
//! ```text
//!   idle ──start_tracking()──▶ tracking ──source failure──▶ error
//!    ▲                            │  ▲                        │
//!    └──────stop_tracking()───────┘  └──────next sample───────┘
//! ```
//!
//! `start_tracking()` on an unavailable source goes straight to `error`.
//! `stop_tracking()` from any state returns to `idle` and is idempotent.
//!
//! Samples delivered by a watch that has been stopped or superseded are
//! discarded; see [`session`] for the generation rules.
//!
//! # Usage
//!
//! ```ignore
//! use bepoli::tracking::{ChannelSource, LocationSample, ZoneTracker};
//!
//! let (source, feed) = ChannelSource::new("gps");
//! let tracker = ZoneTracker::new(catalog, ResolverConfig::default(), Arc::new(source));
//! let mut changes = tracker.subscribe();
//!
//! tracker.start_tracking()?;
//! feed.send(LocationSample::new(41.10874, 16.87967, 8.0));
//!
//! while let Ok(change) = changes.recv().await {
//!     println!("Now in: {}", change.label);
//! }
//! ```
//!
//! # Components
//!
//! - [`state`] - Core types: `LocationSample`, `TrackingStatus`, `ZoneChange`, `TrackingSnapshot`
//! - [`source`] - `LocationSource` trait, `Watch`, and the in-process `ChannelSource`
//! - [`session`] - `ZoneTracker` and the `SampleSink` handed to sources
//! - [`replay`] - `Trace` files and the timer-driven `ReplaySource`
//! - [`logger`] - Periodic DEBUG snapshot logging

pub mod logger;
pub mod replay;
pub mod session;
pub mod source;
pub mod state;

pub use logger::{spawn_zone_logger, DEFAULT_LOG_INTERVAL};
pub use replay::{ReplaySource, Trace, TraceError};
pub use session::{SampleSink, TrackingError, ZoneChangeHandler, ZoneTracker};
pub use source::{ChannelSource, LocationError, LocationSource, SampleFeed, SourceEvent, Watch};
pub use state::{LocationSample, TrackingSnapshot, TrackingStatus, ZoneChange};
