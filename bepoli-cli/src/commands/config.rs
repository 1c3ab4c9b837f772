//! `bepoli config` - inspect and edit the user configuration.
//!
//! `list` prints every key and then the zone resolution those keys add up
//! to, so the effect of a change is visible without replaying a trace.

use bepoli::config::{config_file_path, ConfigFile, ConfigKey};
use clap::Subcommand;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get {
        /// Key as section.key (e.g., zones.near_threshold_km)
        key: String,
    },

    /// Change one value and save config.ini
    Set {
        /// Key as section.key (e.g., zones.stability_threshold)
        key: String,

        /// New value; empty clears zones.catalog
        value: String,
    },

    /// Print all values and the resulting zone resolution
    List,

    /// Print the path of config.ini
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = lookup(&key)?;
            println!("{}", shown(key.get(&ConfigFile::load()?)));
        }
        ConfigCommands::Set { key, value } => set(lookup(&key)?, &value)?,
        ConfigCommands::List => list(&ConfigFile::load()?),
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn lookup(key: &str) -> Result<ConfigKey, CliError> {
    key.parse::<ConfigKey>().map_err(|e| {
        let known: Vec<_> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!("{}. Known keys: {}", e, known.join(", ")))
    })
}

fn shown(value: String) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value
    }
}

fn set(key: ConfigKey, value: &str) -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;
    let previous = key.get(&config);
    key.set(&mut config, value)?;
    config.save()?;

    println!(
        "Set {} = {} (was {})",
        key.name(),
        shown(key.get(&config)),
        shown(previous)
    );
    Ok(())
}

fn list(config: &ConfigFile) {
    for section in ConfigKey::all().chunk_by(|a, b| a.section() == b.section()) {
        println!("[{}]", section[0].section());
        for key in section {
            println!("  {} = {}", key.key_name(), shown(key.get(config)));
        }
        println!();
    }

    let zones = &config.zones;
    let source = zones.catalog_source();
    let catalog = match source.load() {
        Ok(catalog) => format!("{} ({} zone(s))", source, catalog.len()),
        Err(e) => format!("{} (unusable: {})", source, e),
    };
    let near = if zones.near_threshold_km > 0.0 {
        format!("within {:.0} m of a zone edge", zones.near_threshold_km * 1000.0)
    } else {
        "off".to_string()
    };

    println!("Zone resolution");
    println!("  Catalog:  {}", catalog);
    println!(
        "  Confirm:  after {} agreeing sample(s)",
        zones.stability_threshold
    );
    println!("  Near:     {}", near);
    println!("  Replay:   one sample every {} ms", config.replay.interval_ms);
}
