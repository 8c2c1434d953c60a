//! Projected climate container.
//!
//! The container is created empty: `Y`/`X` coordinates are filled, `lat`
//! and `lon` are copied in later from a reference file, and the four
//! monthly driver variables grow along the unlimited `time` axis during
//! raster ingestion.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{RegionInputError, Result};
use crate::grid::{self, GridExtent, DIM_TIME, DIM_X, DIM_Y};

/// Monthly climate driver stored in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverVariable {
    /// Mean air temperature
    AirTemperature,
    /// Mean incoming shortwave radiation
    ShortwaveIrradiance,
    /// Total precipitation
    Precipitation,
    /// Mean vapor pressure
    VaporPressure,
}

impl DriverVariable {
    /// Ingestion order.
    pub const ALL: [DriverVariable; 4] = [
        DriverVariable::AirTemperature,
        DriverVariable::ShortwaveIrradiance,
        DriverVariable::Precipitation,
        DriverVariable::VaporPressure,
    ];

    /// Variable name in the container.
    pub fn name(&self) -> &'static str {
        match self {
            DriverVariable::AirTemperature => "tair",
            DriverVariable::ShortwaveIrradiance => "nirr",
            DriverVariable::Precipitation => "precip",
            DriverVariable::VaporPressure => "vapor_press",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            DriverVariable::AirTemperature => "degC",
            DriverVariable::ShortwaveIrradiance => "MJ m-2 d-1",
            DriverVariable::Precipitation => "mm",
            DriverVariable::VaporPressure => "hPa",
        }
    }

    /// Short tag used in temporary file names.
    pub fn temp_tag(&self) -> &'static str {
        match self {
            DriverVariable::AirTemperature => "tair",
            DriverVariable::ShortwaveIrradiance => "rsds",
            DriverVariable::Precipitation => "pr",
            DriverVariable::VaporPressure => "vapo",
        }
    }

    /// File-name stem of the source GeoTIFF series (CCCma CGCM3.1, SRES A1B).
    pub fn source_prefix(&self) -> &'static str {
        match self {
            DriverVariable::AirTemperature => "tas_mean_C_iem_cccma_cgcm3_1_sresa1b",
            DriverVariable::ShortwaveIrradiance => "rsds_mean_MJ-m2-d1_iem_cccma_cgcm3_1_sresa1b",
            DriverVariable::Precipitation => "pr_total_mm_iem_cccma_cgcm3_1_sresa1b",
            DriverVariable::VaporPressure => "vap_mean_hPa_iem_cccma_cgcm3_1_sresa1b",
        }
    }

    /// Source GeoTIFF for one month, e.g.
    /// `<tif_dir>/tas_mean_..._2001_2100/tas_mean_..._01_2001.tif`.
    pub fn source_path(&self, tif_dir: &Path, year: i32, month: u32) -> PathBuf {
        let prefix = self.source_prefix();
        tif_dir
            .join(format!("{}_2001_2100", prefix))
            .join(format!("{}_{:02}_{:04}.tif", prefix, month, year))
    }
}

/// Create the empty climate container.
pub fn create_climate_container(path: &Path, extent: GridExtent) -> Result<()> {
    info!(path = %path.display(), "Creating an empty climate file");

    let mut file = grid::create_grid_file(path, extent)?;
    file.add_unlimited_dimension(DIM_TIME)?;

    let mut y = file.add_variable::<i32>(DIM_Y, &[DIM_Y])?;
    y.put_values(&(0..extent.size_y as i32).collect::<Vec<_>>(), ..)?;
    let mut x = file.add_variable::<i32>(DIM_X, &[DIM_X])?;
    x.put_values(&(0..extent.size_x as i32).collect::<Vec<_>>(), ..)?;

    let mut lat = file.add_variable::<f32>("lat", &[DIM_Y, DIM_X])?;
    lat.put_attribute("standard_name", "latitude")?;
    lat.put_attribute("units", "degrees_north")?;
    let mut lon = file.add_variable::<f32>("lon", &[DIM_Y, DIM_X])?;
    lon.put_attribute("standard_name", "longitude")?;
    lon.put_attribute("units", "degrees_east")?;

    for driver in DriverVariable::ALL {
        let mut var = file.add_variable::<f32>(driver.name(), &[DIM_TIME, DIM_Y, DIM_X])?;
        var.put_attribute("units", driver.units())?;
        var.put_attribute("coordinates", "lat lon")?;
    }
    Ok(())
}

/// Copy `lat`/`lon` from an externally produced reference file into the
/// container.
///
/// The reference is normally made by hand with
/// `gdal_translate -co WRITE_LONLAT=YES` (see
/// [`prepare_lonlat_reference`](crate::ingest::prepare_lonlat_reference)).
/// Its arrays must have the container's `Y`/`X` extent.
pub fn copy_lonlat(reference: &Path, container: &Path) -> Result<()> {
    info!(
        reference = %reference.display(),
        container = %container.display(),
        "Copying lat/lon into climate file"
    );

    if !reference.exists() {
        warn!(reference = %reference.display(), "lat/lon reference file is missing");
        return Err(RegionInputError::MissingData(format!(
            "lat/lon reference file {}",
            reference.display()
        )));
    }

    let source = netcdf::open(reference)?;
    let mut target = netcdf::append(container)?;
    let extent = grid::file_extent(&target)?;

    for name in ["lat", "lon"] {
        let values = read_reference_grid(&source, name, extent)?;
        let mut var = target
            .variable_mut(name)
            .ok_or_else(|| RegionInputError::MissingData(format!("{} variable", name)))?;
        var.put_values(&values, ..)?;
    }
    Ok(())
}

fn read_reference_grid(file: &netcdf::File, name: &str, extent: GridExtent) -> Result<Vec<f32>> {
    let var = file
        .variable(name)
        .ok_or_else(|| RegionInputError::MissingData(format!("{} variable in reference", name)))?;
    let shape = grid::variable_shape(&var);
    if shape != extent.shape() {
        return Err(RegionInputError::ShapeMismatch {
            variable: name.to_string(),
            expected: extent.shape(),
            actual: shape,
        });
    }
    grid::read_f32_values(&var)
}

/// Read a 2-D `f32` variable from the container (`lat`, `lon`).
pub fn read_spatial_reference(container: &Path, name: &str) -> Result<Vec<f32>> {
    let file = netcdf::open(container)?;
    let extent = grid::file_extent(&file)?;
    read_reference_grid(&file, name, extent)
}

/// Read one monthly slice of a driver variable.
pub fn read_driver_slice(
    container: &Path,
    driver: DriverVariable,
    time_index: usize,
) -> Result<Vec<f32>> {
    let file = netcdf::open(container)?;
    let var = file
        .variable(driver.name())
        .ok_or_else(|| RegionInputError::MissingData(format!("{} variable", driver.name())))?;
    Ok(var.get_values((time_index, .., ..))?)
}

/// Current length of the container's time axis.
pub fn time_len(container: &Path) -> Result<usize> {
    let file = netcdf::open(container)?;
    let dim = file
        .dimension(DIM_TIME)
        .ok_or_else(|| RegionInputError::MissingData(format!("{} dimension", DIM_TIME)))?;
    Ok(dim.len())
}
