//! Zones command - list the zones of the active catalog.

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Run the zones command.
pub fn run(options: GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("zones");
    let catalog = runner.load_catalog()?;

    if catalog.is_empty() {
        println!("No zones in catalog.");
        return Ok(());
    }

    println!("{} zone(s)", catalog.len());
    println!();
    for zone in catalog.iter() {
        println!("  {:<32} {} vertices", zone.name(), zone.boundary().len());
    }

    Ok(())
}
