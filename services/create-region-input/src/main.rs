//! Region input builder.
//!
//! Writes the synthetic fire, vegetation, drainage and run-mask grids, the
//! CO2 series and the projected climate file for one square study region.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use create_region_input::{parse_level, Args};
use region_input::ProcessRunner;

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = build(&args) {
        error!(error = %format!("{:#}", e), "Region input build failed");
        std::process::exit(1);
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true);

    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn build(args: &Args) -> Result<()> {
    let config = args
        .resolve_config()
        .context("Failed to load configuration")?;

    info!(
        location = %config.location,
        size_x = config.size_x,
        size_y = config.size_y,
        tifs = %config.tif_dir.display(),
        start_year = config.start_year,
        years = config.years,
        "Starting region input build"
    );

    let mut rng = args.rng();
    let summary = region_input::run(&config, &ProcessRunner, &mut rng).with_context(|| {
        format!(
            "Failed to build inputs in {}",
            config.output_dir().display()
        )
    })?;

    info!(
        output_dir = %summary.output_dir.display(),
        files = summary.files.len(),
        slices = summary.ingest.as_ref().map(|s| s.slices_written).unwrap_or(0),
        "Done"
    );
    Ok(())
}
