//! Shared primitives for `(Y, X)` grid files.
//!
//! Every dataset produced here is a NetCDF-4 file with row dimension `Y`
//! and column dimension `X`. Grid values are held row-major in memory.

use std::path::Path;

use chrono::Utc;
use tracing::debug;

use crate::error::{RegionInputError, Result};

/// Row dimension name.
pub const DIM_Y: &str = "Y";
/// Column dimension name.
pub const DIM_X: &str = "X";
/// Unlimited time dimension of the climate container.
pub const DIM_TIME: &str = "time";

/// Row/column extent of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridExtent {
    pub size_y: usize,
    pub size_x: usize,
}

impl Default for GridExtent {
    fn default() -> Self {
        Self::square(10)
    }
}

impl GridExtent {
    pub fn new(size_y: usize, size_x: usize) -> Self {
        Self { size_y, size_x }
    }

    pub fn square(dim: usize) -> Self {
        Self::new(dim, dim)
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.size_y * self.size_x
    }

    /// Row-major offset of cell `(y, x)`.
    pub fn index(&self, y: usize, x: usize) -> usize {
        y * self.size_x + x
    }

    pub fn shape(&self) -> Vec<usize> {
        vec![self.size_y, self.size_x]
    }
}

/// Create (or overwrite) a NetCDF-4 file with `Y` and `X` declared.
///
/// Both sizes must be non-zero: a zero-length dimension would be created
/// as unlimited.
pub fn create_grid_file(path: &Path, extent: GridExtent) -> Result<netcdf::FileMut> {
    if extent.cells() == 0 {
        return Err(RegionInputError::InvalidConfig(format!(
            "grid extent must be non-zero, got {}x{}",
            extent.size_x, extent.size_y
        )));
    }
    let mut file = netcdf::create(path)?;
    add_global_attributes(&mut file)?;
    file.add_dimension(DIM_Y, extent.size_y)?;
    file.add_dimension(DIM_X, extent.size_x)?;
    debug!(path = %path.display(), size_y = extent.size_y, size_x = extent.size_x, "Created grid file");
    Ok(file)
}

/// CF and provenance attributes written on every new file.
pub(crate) fn add_global_attributes(file: &mut netcdf::FileMut) -> Result<()> {
    file.add_attribute("Conventions", "CF-1.6")?;
    file.add_attribute(
        "history",
        format!("{} created by region-input", Utc::now().format("%Y-%m-%dT%H:%M:%SZ")),
    )?;
    Ok(())
}

/// Declare an `i32` variable over `(Y, X)` and write row-major values.
pub fn write_int_grid(
    file: &mut netcdf::FileMut,
    name: &str,
    extent: GridExtent,
    values: &[i32],
) -> Result<()> {
    if values.len() != extent.cells() {
        return Err(RegionInputError::ShapeMismatch {
            variable: name.to_string(),
            expected: extent.shape(),
            actual: vec![values.len()],
        });
    }
    let mut var = file.add_variable::<i32>(name, &[DIM_Y, DIM_X])?;
    var.put_values(values, ..)?;
    Ok(())
}

/// Lengths of a variable's dimensions, in declaration order.
pub fn variable_shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Read a whole variable as `f32`. Double data (GDAL's `lat`/`lon`) is
/// narrowed by the library on read.
pub fn read_f32_values(var: &netcdf::Variable) -> Result<Vec<f32>> {
    Ok(var.get_values::<f32, _>(..)?)
}

/// Read the `Y`/`X` extent declared by an open file.
pub fn file_extent(file: &netcdf::File) -> Result<GridExtent> {
    let size_y = file
        .dimension(DIM_Y)
        .ok_or_else(|| RegionInputError::MissingData(format!("{} dimension", DIM_Y)))?
        .len();
    let size_x = file
        .dimension(DIM_X)
        .ok_or_else(|| RegionInputError::MissingData(format!("{} dimension", DIM_X)))?
        .len();
    Ok(GridExtent::new(size_y, size_x))
}

/// Read an `i32` `(Y, X)` variable back from disk.
pub fn read_int_grid(path: &Path, name: &str) -> Result<(GridExtent, Vec<i32>)> {
    let file = netcdf::open(path)?;
    let extent = file_extent(&file)?;
    let var = file
        .variable(name)
        .ok_or_else(|| RegionInputError::MissingData(format!("{} variable", name)))?;

    let shape = variable_shape(&var);
    if shape != extent.shape() {
        return Err(RegionInputError::ShapeMismatch {
            variable: name.to_string(),
            expected: extent.shape(),
            actual: shape,
        });
    }

    let values: Vec<i32> = var.get_values(..)?;
    Ok((extent, values))
}
