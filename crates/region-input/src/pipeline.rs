//! End-to-end build of one region's input files.

use std::fs;
use std::path::PathBuf;

use rand::Rng;
use tracing::info;

use crate::climate;
use crate::co2;
use crate::config::RegionConfig;
use crate::error::Result;
use crate::ingest::{self, IngestSummary};
use crate::synthetic;
use crate::tools::ToolRunner;

pub const FIRE_FILE: &str = "script-new-fire-dataset.nc";
pub const VEG_FILE: &str = "script-new-veg-dataset.nc";
pub const DRAINAGE_FILE: &str = "script-new-drainage-dataset.nc";
pub const RUN_MASK_FILE: &str = "script-run-mask.nc";
pub const CO2_FILE: &str = "script-new-co2-dataset.nc";
pub const CLIMATE_FILE: &str = "script-projected-climate-dataset.nc";

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub ingest: Option<IngestSummary>,
}

/// Build every input file for the configured region.
///
/// Steps run strictly in order and the first failure aborts the run.
/// Existing files are overwritten.
pub fn run<R: Rng + ?Sized>(
    config: &RegionConfig,
    runner: &dyn ToolRunner,
    rng: &mut R,
) -> Result<RunSummary> {
    config.validate()?;

    let output_dir = config.output_dir();
    info!(output_dir = %output_dir.display(), "Will be (over)writing files");
    fs::create_dir_all(&output_dir)?;

    let extent = config.extent();
    let path = |name: &str| output_dir.join(name);
    let mut files = Vec::new();

    synthetic::make_fire_dataset(&path(FIRE_FILE), extent, rng)?;
    files.push(path(FIRE_FILE));

    synthetic::make_veg_classification(&path(VEG_FILE), extent, rng)?;
    files.push(path(VEG_FILE));

    synthetic::make_drainage_classification(&path(DRAINAGE_FILE), extent, rng)?;
    files.push(path(DRAINAGE_FILE));

    synthetic::make_run_mask(&path(RUN_MASK_FILE), extent)?;
    files.push(path(RUN_MASK_FILE));

    co2::make_co2_dataset(&path(CO2_FILE))?;
    files.push(path(CO2_FILE));

    let container = path(CLIMATE_FILE);
    climate::create_climate_container(&container, extent)?;
    files.push(container.clone());

    if config.skip_climate {
        info!("Skipping lat/lon copy-in and raster ingestion");
        return Ok(RunSummary {
            output_dir,
            files,
            ingest: None,
        });
    }

    if config.prepare_lonlat {
        ingest::prepare_lonlat_reference(config, runner)?;
    }
    climate::copy_lonlat(&config.lonlat_reference, &container)?;

    let summary = ingest::ingest_rasters(config, &container, runner)?;

    Ok(RunSummary {
        output_dir,
        files,
        ingest: Some(summary),
    })
}
