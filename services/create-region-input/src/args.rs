//! Command-line arguments and their merge onto [`RegionConfig`].

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use region_input::RegionConfig;
use tracing::Level;

/// Build the synthetic and climate input files for one region.
///
/// Values are resolved in order: built-in defaults, then `--config`, then
/// the individual flags below.
#[derive(Parser, Debug, Clone)]
#[command(name = "create-region-input")]
#[command(about = "Build NetCDF model input files for a square study region")]
pub struct Args {
    /// Grid size in pixels (square) [default: 10]
    #[arg(long)]
    pub dim: Option<usize>,

    /// Directory holding the per-variable GeoTIFF directories [default: ../../snap-data]
    #[arg(long, env = "REGION_INPUT_TIFS")]
    pub tifs: Option<PathBuf>,

    /// Root of the output directory tree [default: .]
    #[arg(long, env = "REGION_INPUT_OUTDIR")]
    pub outdir: Option<PathBuf>,

    /// Location label for the output directory name [default: Toolik]
    #[arg(long)]
    pub loc: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// First year of climate data [default: 2001]
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Number of years of climate data to ingest [default: 99]
    #[arg(long)]
    pub years: Option<usize>,

    /// File providing lat/lon for the study area [default: temp_subset_with_lonlat.nc]
    #[arg(long)]
    pub lonlat_ref: Option<PathBuf>,

    /// Directory for per-month temporaries [default: the output directory]
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Raster conversion program [default: gdal_translate]
    #[arg(long, env = "GDAL_TRANSLATE")]
    pub gdal_translate: Option<String>,

    /// Build the lat/lon reference from the first temperature raster
    #[arg(long)]
    pub prepare_lonlat: bool,

    /// Only write the synthetic files and the empty climate container
    #[arg(long)]
    pub skip_climate: bool,

    /// Seed for the synthetic data generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Merge defaults, the optional YAML file and the flags into one config.
    pub fn resolve_config(&self) -> region_input::Result<RegionConfig> {
        let mut config = match &self.config {
            Some(path) => RegionConfig::from_yaml(path)?,
            None => RegionConfig::default(),
        };

        if let Some(dim) = self.dim {
            config = config.with_dim(dim);
        }
        if let Some(tifs) = &self.tifs {
            config.tif_dir = tifs.clone();
        }
        if let Some(outdir) = &self.outdir {
            config.out_root = outdir.clone();
        }
        if let Some(loc) = &self.loc {
            config.location = loc.clone();
        }
        if let Some(start_year) = self.start_year {
            config.start_year = start_year;
        }
        if let Some(years) = self.years {
            config.years = years;
        }
        if let Some(lonlat_ref) = &self.lonlat_ref {
            config.lonlat_reference = lonlat_ref.clone();
        }
        if let Some(work_dir) = &self.work_dir {
            config.work_dir = Some(work_dir.clone());
        }
        if let Some(program) = &self.gdal_translate {
            config.translate_program = program.clone();
        }
        config.prepare_lonlat |= self.prepare_lonlat;
        config.skip_climate |= self.skip_climate;

        Ok(config)
    }

    /// Generator for the synthetic fill, reproducible when `--seed` is given.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Map a `--log-level` value to a tracing level. Unknown values fall back
/// to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
