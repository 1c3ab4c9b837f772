//! Classify command - report the raw label for a single coordinate.

use bepoli::geo::GeoPoint;
use bepoli::zone::{classify, measure};

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the classify command.
pub struct ClassifyArgs {
    pub lat: f64,
    pub lon: f64,
    pub near_threshold_km: Option<f64>,
}

/// Run the classify command.
pub fn run(options: GlobalOptions, args: ClassifyArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("classify");
    let catalog = runner.load_catalog()?;

    let near_threshold_km = args
        .near_threshold_km
        .unwrap_or(runner.resolver_config().near_threshold_km);
    let point = GeoPoint::new(args.lat, args.lon);
    let result = classify(&catalog, point, near_threshold_km);

    println!("Position: {}", point);
    println!("Label:    {}", result.label);
    if let Some(km) = result.edge_distance_km {
        println!("Edge:     {:.1} m", km * 1000.0);
    }

    let measurements = measure(&catalog, point);
    if !measurements.is_empty() {
        println!();
        println!("  {:<32} {:<7} {:>12}", "Zone", "Inside", "Edge (m)");
        for m in measurements {
            println!(
                "  {:<32} {:<7} {:>12.1}",
                m.zone.name(),
                if m.inside { "yes" } else { "no" },
                m.edge_distance_km * 1000.0
            );
        }
    }

    Ok(())
}
