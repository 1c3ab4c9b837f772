//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`classify`] - Classify a single coordinate
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`track`] - Replay a recorded trace through a tracking session
//! - [`zones`] - List catalog zones

pub mod classify;
pub mod config;
pub mod track;
pub mod zones;
