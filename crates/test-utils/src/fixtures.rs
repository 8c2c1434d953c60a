//! Common test fixtures for region-input tests.

use std::path::{Path, PathBuf};

use region_input::RegionConfig;
use tempfile::TempDir;

use crate::generators::lonlat_at;

/// Location label used by fixture configs.
pub const TEST_LOCATION: &str = "Toolik";

/// Fresh temporary directory to use as an output root.
pub fn temp_output_root() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Config writing under `root`, reading rasters from a fake `tifs` dir and
/// taking lat/lon from `root/lonlat.nc`.
///
/// The subset window starts at pixel (0,0) so it lines up with the lat/lon
/// written by [`write_reference_lonlat`].
pub fn test_config(root: &Path, dim: usize, years: usize) -> RegionConfig {
    let mut config = RegionConfig {
        out_root: root.to_path_buf(),
        tif_dir: root.join("tifs"),
        location: TEST_LOCATION.to_string(),
        years,
        lonlat_reference: root.join("lonlat.nc"),
        ..RegionConfig::default()
    }
    .with_dim(dim);
    config.subset_window.x_off = 0;
    config.subset_window.y_off = 0;
    config
}

/// Write a lat/lon reference file of `rows` x `cols` with dims `y`/`x`, as
/// `gdal_translate -co WRITE_LONLAT=YES` would. Returns the values written
/// (row-major `(lat, lon)`).
pub fn write_reference_lonlat(path: &Path, rows: usize, cols: usize) -> (Vec<f32>, Vec<f32>) {
    let mut lat = Vec::with_capacity(rows * cols);
    let mut lon = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let (la, lo) = lonlat_at(row, col);
            lat.push(la);
            lon.push(lo);
        }
    }

    let mut file = netcdf::create(path).expect("failed to create reference file");
    file.add_dimension("y", rows).unwrap();
    file.add_dimension("x", cols).unwrap();
    file.add_variable::<f32>("lat", &["y", "x"])
        .unwrap()
        .put_values(&lat, ..)
        .unwrap();
    file.add_variable::<f32>("lon", &["y", "x"])
        .unwrap()
        .put_values(&lon, ..)
        .unwrap();

    (lat, lon)
}

/// All six files a full run leaves in the output directory.
pub fn expected_output_files(output_dir: &Path) -> Vec<PathBuf> {
    [
        "script-new-fire-dataset.nc",
        "script-new-veg-dataset.nc",
        "script-new-drainage-dataset.nc",
        "script-run-mask.nc",
        "script-new-co2-dataset.nc",
        "script-projected-climate-dataset.nc",
    ]
    .iter()
    .map(|name| output_dir.join(name))
    .collect()
}
