//! Run configuration.
//!
//! A single [`RegionConfig`] is threaded through every builder and the
//! ingestion loop. Values come from built-in defaults, an optional YAML
//! file, and finally command-line overrides applied by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RegionInputError, Result};
use crate::grid::GridExtent;

/// Fixed pixel window used to cut the study area out of the full-extent
/// rasters (`gdal_translate -srcwin`).
///
/// The default offsets were derived by hand for the Toolik validation site
/// on the 1 km Alaska Albers grid. They are not general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubsetWindow {
    pub x_off: usize,
    pub y_off: usize,
    pub width: usize,
    pub height: usize,
}

/// Toolik column offset into the source rasters.
pub const TOOLIK_X_OFFSET: usize = 915;
/// Toolik row offset into the source rasters.
pub const TOOLIK_Y_OFFSET: usize = 292;

impl Default for SubsetWindow {
    fn default() -> Self {
        Self {
            x_off: TOOLIK_X_OFFSET,
            y_off: TOOLIK_Y_OFFSET,
            width: 10,
            height: 10,
        }
    }
}

impl SubsetWindow {
    /// Arguments for `gdal_translate -srcwin`.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-srcwin".to_string(),
            self.x_off.to_string(),
            self.y_off.to_string(),
            self.width.to_string(),
            self.height.to_string(),
        ]
    }
}

/// Top-level configuration for one region build.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Number of grid rows
    pub size_y: usize,
    /// Number of grid columns
    pub size_x: usize,
    /// Directory holding one sub-directory of GeoTIFFs per source variable
    pub tif_dir: PathBuf,
    /// Root under which the `<loc>_<x>x<y>` output directory is created
    pub out_root: PathBuf,
    /// Location label used for the output directory name
    pub location: String,
    /// First calendar year of the climate record
    pub start_year: i32,
    /// Number of years to ingest
    pub years: usize,
    /// Window cut from each full-extent raster
    pub subset_window: SubsetWindow,
    /// Pre-built file holding `lat`/`lon` for the study area
    pub lonlat_reference: PathBuf,
    /// Where per-month temporaries are written (defaults to the output directory)
    pub work_dir: Option<PathBuf>,
    /// Raster conversion program
    pub translate_program: String,
    /// Build `lonlat_reference` with the conversion tool before copying it in
    pub prepare_lonlat: bool,
    /// Stop after the empty climate container is created
    pub skip_climate: bool,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            size_y: 10,
            size_x: 10,
            tif_dir: PathBuf::from("../../snap-data"),
            out_root: PathBuf::from("."),
            location: "Toolik".to_string(),
            start_year: 2001,
            years: 99,
            subset_window: SubsetWindow::default(),
            lonlat_reference: PathBuf::from("temp_subset_with_lonlat.nc"),
            work_dir: None,
            translate_program: "gdal_translate".to_string(),
            prepare_lonlat: false,
            skip_climate: false,
        }
    }
}

impl RegionConfig {
    /// Load configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Square grid of `dim` x `dim` cells. The subset window keeps its
    /// offsets and takes the grid size.
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.size_y = dim;
        self.size_x = dim;
        self.subset_window.width = dim;
        self.subset_window.height = dim;
        self
    }

    pub fn extent(&self) -> GridExtent {
        GridExtent::new(self.size_y, self.size_x)
    }

    /// Output directory, named like `Toolik_10x10`.
    pub fn output_dir(&self) -> PathBuf {
        self.out_root
            .join(format!("{}_{}x{}", self.location, self.size_x, self.size_y))
    }

    /// Directory for the transient per-month conversion files.
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(|| self.output_dir())
    }

    /// Reject configurations that cannot produce a usable dataset.
    pub fn validate(&self) -> Result<()> {
        if self.size_y == 0 || self.size_x == 0 {
            return Err(RegionInputError::InvalidConfig(format!(
                "grid extent must be non-zero, got {}x{}",
                self.size_x, self.size_y
            )));
        }
        if self.location.trim().is_empty() {
            return Err(RegionInputError::InvalidConfig(
                "location label is empty".to_string(),
            ));
        }
        if !self.skip_climate && self.years == 0 {
            return Err(RegionInputError::InvalidConfig(
                "at least one year of climate data is required".to_string(),
            ));
        }
        if !self.skip_climate
            && (self.subset_window.width != self.size_x
                || self.subset_window.height != self.size_y)
        {
            return Err(RegionInputError::InvalidConfig(format!(
                "subset window {}x{} does not match grid {}x{}",
                self.subset_window.width,
                self.subset_window.height,
                self.size_x,
                self.size_y
            )));
        }
        Ok(())
    }
}
