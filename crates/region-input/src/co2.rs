//! Annual atmospheric CO2 reference series.
//!
//! The concentrations were transcribed from the legacy sample dataset and
//! are written unchanged into a file with an unlimited `year` axis.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{RegionInputError, Result};
use crate::grid;

/// Year dimension and coordinate variable name.
pub const DIM_YEAR: &str = "year";

/// Number of years in the reference series.
pub const CO2_SERIES_LEN: usize = 109;

/// Calendar years 1901..=2009.
pub const CO2_YEARS: [i32; CO2_SERIES_LEN] = {
    let mut years = [0; CO2_SERIES_LEN];
    let mut i = 0;
    while i < CO2_SERIES_LEN {
        years[i] = 1901 + i as i32;
        i += 1;
    }
    years
};

/// Annual mean CO2 concentration (ppmv), aligned with [`CO2_YEARS`].
#[rustfmt::skip]
pub const CO2_PPMV: [f32; CO2_SERIES_LEN] = [
    296.311, 296.661, 297.04, 297.441, 297.86, 298.29, 298.726, 299.163,
    299.595, 300.016, 300.421, 300.804, 301.162, 301.501, 301.829, 302.154,
    302.48, 302.808, 303.142, 303.482, 303.833, 304.195, 304.573, 304.966,
    305.378, 305.806, 306.247, 306.698, 307.154, 307.614, 308.074, 308.531,
    308.979, 309.401, 309.781, 310.107, 310.369, 310.559, 310.667, 310.697,
    310.664, 310.594, 310.51, 310.438, 310.401, 310.41, 310.475, 310.605,
    310.807, 311.077, 311.41, 311.802, 312.245, 312.736, 313.27, 313.842,
    314.448, 315.084, 315.665, 316.535, 317.195, 317.885, 318.495, 318.935,
    319.58, 320.895, 321.56, 322.34, 323.7, 324.835, 325.555, 326.55,
    328.455, 329.215, 330.165, 331.215, 332.79, 334.44, 335.78, 337.655,
    338.925, 340.065, 341.79, 343.33, 344.67, 346.075, 347.845, 350.055,
    351.52, 352.785, 354.21, 355.225, 356.055, 357.55, 359.62, 361.69,
    363.76, 365.83, 367.9, 368.0, 370.1, 372.2, 373.6943, 375.3507, 377.0071,
    378.6636, 380.5236, 382.3536, 384.1336,
];

/// Write the CO2 reference series.
pub fn make_co2_dataset(path: &Path) -> Result<()> {
    info!(path = %path.display(), "Creating a co2 file");

    let mut file = netcdf::create(path)?;
    grid::add_global_attributes(&mut file)?;
    file.add_unlimited_dimension(DIM_YEAR)?;

    warn!("Hard-coding the values from the legacy co2 dataset");

    // The axis is unlimited and still empty, so the extent must be explicit.
    let extent = 0..CO2_SERIES_LEN;

    let mut year = file.add_variable::<i32>(DIM_YEAR, &[DIM_YEAR])?;
    year.put_attribute("long_name", "calendar year")?;
    year.put_values(&CO2_YEARS, (extent.clone(),))?;

    let mut co2 = file.add_variable::<f32>("co2", &[DIM_YEAR])?;
    co2.put_attribute("long_name", "atmospheric CO2 concentration")?;
    co2.put_attribute("units", "ppmv")?;
    co2.put_values(&CO2_PPMV, (extent,))?;

    Ok(())
}

/// Read the `year` coordinate and `co2` series back.
pub fn read_co2_dataset(path: &Path) -> Result<(Vec<i32>, Vec<f32>)> {
    let file = netcdf::open(path)?;
    let year = file
        .variable(DIM_YEAR)
        .ok_or_else(|| RegionInputError::MissingData(format!("{} variable", DIM_YEAR)))?;
    let co2 = file
        .variable("co2")
        .ok_or_else(|| RegionInputError::MissingData("co2 variable".to_string()))?;
    Ok((year.get_values(..)?, co2.get_values(..)?))
}
