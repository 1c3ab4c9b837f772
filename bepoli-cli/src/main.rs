//! BePoli CLI - Command-line interface
//!
//! This binary provides a command-line interface to the BePoli library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use bepoli::config::ConfigKey;
use clap::{Parser, Subcommand};

use commands::classify::ClassifyArgs;
use commands::config::ConfigCommands;
use commands::track::TrackArgs;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "bepoli")]
#[command(version = bepoli::VERSION)]
#[command(about = "Resolve campus zones from GPS positions", long_about = None)]
struct Cli {
    /// Zone catalog JSON file (overrides zones.catalog in config.ini)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Enable debug logging and echo logs to stdout
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the zones in the catalog
    Zones,

    /// Classify a single coordinate without debouncing
    Classify {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Proximity threshold for "near" in kilometers (default: from config)
        #[arg(long, allow_hyphen_values = true, value_parser = parse_near_threshold_km)]
        near_threshold_km: Option<f64>,
    },

    /// Replay a recorded GPS trace through a tracking session
    Track {
        /// Trace file with one 'lat,lon[,accuracy]' sample per line
        trace: PathBuf,

        /// Delay between samples in milliseconds (default: from config)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,

        /// Consecutive agreeing samples required to change zone (default: from config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        stability_threshold: Option<u32>,

        /// Proximity threshold for "near" in kilometers (default: from config)
        #[arg(long, allow_hyphen_values = true, value_parser = parse_near_threshold_km)]
        near_threshold_km: Option<f64>,

        /// Pin a zone as the effective location regardless of GPS
        #[arg(long)]
        pin: Option<String>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Validate `--near-threshold-km` with the rule used for `zones.near_threshold_km`.
fn parse_near_threshold_km(value: &str) -> Result<f64, String> {
    ConfigKey::ZonesNearThresholdKm
        .validate(value)
        .map_err(|e| e.to_string())?;
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    let options = GlobalOptions {
        catalog: cli.catalog,
        debug: cli.debug,
    };

    let result = match cli.command {
        Commands::Zones => commands::zones::run(options),
        Commands::Classify {
            lat,
            lon,
            near_threshold_km,
        } => commands::classify::run(
            options,
            ClassifyArgs {
                lat,
                lon,
                near_threshold_km,
            },
        ),
        Commands::Track {
            trace,
            interval_ms,
            stability_threshold,
            near_threshold_km,
            pin,
        } => commands::track::run(
            options,
            TrackArgs {
                trace,
                interval_ms,
                stability_threshold,
                near_threshold_km,
                pin,
            },
        ),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
