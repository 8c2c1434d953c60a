//! Input dataset preparation for a gridded ecosystem model.
//!
//! Builds the NetCDF files a model run for one region needs:
//!
//! - synthetic fire, vegetation, drainage and run-mask grids
//! - the annual CO2 reference series
//! - a projected climate container filled month by month from GeoTIFF
//!   rasters, converted and subset with `gdal_translate`
//!
//! All configuration travels in a [`RegionConfig`]; external tools are
//! reached only through the [`ToolRunner`] trait.

pub mod climate;
pub mod co2;
pub mod config;
pub mod error;
pub mod grid;
pub mod ingest;
pub mod pipeline;
pub mod synthetic;
pub mod tools;

// Re-exports
pub use climate::{copy_lonlat, create_climate_container, DriverVariable};
pub use co2::make_co2_dataset;
pub use config::{RegionConfig, SubsetWindow};
pub use error::{RegionInputError, Result};
pub use grid::GridExtent;
pub use ingest::{ingest_rasters, prepare_lonlat_reference, time_index, IngestSummary, MonthSteps};
pub use pipeline::{run, RunSummary};
pub use synthetic::{
    make_drainage_classification, make_fire_dataset, make_run_mask, make_veg_classification,
    FireHistory,
};
pub use tools::{ProcessRunner, ToolRunner, Translate};
