//! Monthly raster ingestion into the climate container.
//!
//! For every month of the configured period each driver's GeoTIFF is
//! converted to NetCDF, cut down to the study window, and its `Band1`
//! written into the container at that month's time slice. Slices are
//! written in chronological order. A failure aborts the loop and leaves the
//! container filled up to the last completed month; a rerun starts over at
//! slice 0.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::climate::DriverVariable;
use crate::config::RegionConfig;
use crate::error::{RegionInputError, Result};
use crate::grid::{self, GridExtent};
use crate::tools::{ToolRunner, Translate};

/// Single raster band written by the GDAL NetCDF driver.
pub const BAND_VARIABLE: &str = "Band1";

/// Months per year of the time axis.
pub const MONTHS_PER_YEAR: usize = 12;

/// Zero-based slot on the time axis for a (year, month) pair, both given
/// as zero-based offsets from the start of the record.
pub fn time_index(year_index: usize, month_index: usize) -> usize {
    year_index * MONTHS_PER_YEAR + month_index
}

/// One month of the ingestion period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthStep {
    pub year: i32,
    /// Calendar month, 1-based
    pub month: u32,
    pub time_index: usize,
}

/// Chronological iterator over `years` years of months from `start_year`.
#[derive(Debug, Clone)]
pub struct MonthSteps {
    start_year: i32,
    total: usize,
    next: usize,
}

impl MonthSteps {
    pub fn new(start_year: i32, years: usize) -> Self {
        Self {
            start_year,
            total: years * MONTHS_PER_YEAR,
            next: 0,
        }
    }
}

impl Iterator for MonthSteps {
    type Item = MonthStep;

    fn next(&mut self) -> Option<MonthStep> {
        if self.next >= self.total {
            return None;
        }
        let year_index = self.next / MONTHS_PER_YEAR;
        let month_index = self.next % MONTHS_PER_YEAR;
        self.next += 1;
        Some(MonthStep {
            year: self.start_year + year_index as i32,
            month: month_index as u32 + 1,
            time_index: time_index(year_index, month_index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthSteps {}

/// Full-extent conversion output for a driver.
pub fn temporary_path(work_dir: &Path, driver: DriverVariable) -> PathBuf {
    work_dir.join(format!("script-temporary_{}.nc", driver.temp_tag()))
}

/// Subset output for a driver.
pub fn subset_path(work_dir: &Path, driver: DriverVariable) -> PathBuf {
    work_dir.join(format!("script-temporary_{}2.nc", driver.temp_tag()))
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub slices_written: usize,
    pub last_time_index: Option<usize>,
}

/// Run the conversion/subset/write loop for every month in the config.
pub fn ingest_rasters(
    config: &RegionConfig,
    container: &Path,
    runner: &dyn ToolRunner,
) -> Result<IngestSummary> {
    let work_dir = config.work_dir();
    fs::create_dir_all(&work_dir)?;

    let mut file = netcdf::append(container)?;
    let extent = grid::file_extent(&file)?;

    let steps = MonthSteps::new(config.start_year, config.years);
    info!(
        start_year = config.start_year,
        years = config.years,
        slices = steps.len(),
        container = %container.display(),
        "Populating climate file from rasters"
    );

    let mut summary = IngestSummary {
        slices_written: 0,
        last_time_index: None,
    };

    for step in steps {
        info!(year = step.year, month = step.month, time_index = step.time_index, "Ingesting month");

        debug!("Converting tif --> netcdf");
        for driver in DriverVariable::ALL {
            let source = driver.source_path(&config.tif_dir, step.year, step.month);
            Translate::new(source, temporary_path(&work_dir, driver))
                .run(runner, &config.translate_program)?;
        }

        debug!("Subsetting");
        for driver in DriverVariable::ALL {
            Translate::new(temporary_path(&work_dir, driver), subset_path(&work_dir, driver))
                .window(config.subset_window)
                .run(runner, &config.translate_program)?;
        }

        debug!("Writing subset data to climate file");
        for driver in DriverVariable::ALL {
            let values = read_band(&subset_path(&work_dir, driver), extent)?;
            let mut var = file.variable_mut(driver.name()).ok_or_else(|| {
                RegionInputError::MissingData(format!("{} variable", driver.name()))
            })?;
            var.put_values(&values, (step.time_index, .., ..))?;
        }

        summary.slices_written += 1;
        summary.last_time_index = Some(step.time_index);
    }

    info!(slices = summary.slices_written, "Done appending");
    cleanup_temporaries(&work_dir)?;
    Ok(summary)
}

/// Read `Band1` of a subset file, checking it covers the grid exactly.
pub fn read_band(path: &Path, extent: GridExtent) -> Result<Vec<f32>> {
    let file = netcdf::open(path)?;
    let var = file.variable(BAND_VARIABLE).ok_or_else(|| {
        RegionInputError::MissingData(format!("{} in {}", BAND_VARIABLE, path.display()))
    })?;

    let shape = grid::variable_shape(&var);
    if shape != extent.shape() {
        return Err(RegionInputError::ShapeMismatch {
            variable: BAND_VARIABLE.to_string(),
            expected: extent.shape(),
            actual: shape,
        });
    }
    grid::read_f32_values(&var)
}

/// Remove the per-month conversion files.
pub fn cleanup_temporaries(work_dir: &Path) -> Result<()> {
    for driver in DriverVariable::ALL {
        for path in [temporary_path(work_dir, driver), subset_path(work_dir, driver)] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}

/// Build the lat/lon reference file with the conversion tool.
///
/// Converts the first air temperature raster of the record with
/// `WRITE_LONLAT=YES`, then cuts the study window out of it bottom-up, the
/// same orientation the monthly subsets use.
pub fn prepare_lonlat_reference(config: &RegionConfig, runner: &dyn ToolRunner) -> Result<PathBuf> {
    let work_dir = config.work_dir();
    fs::create_dir_all(&work_dir)?;

    let source = DriverVariable::AirTemperature.source_path(&config.tif_dir, config.start_year, 1);
    let full = work_dir.join("script-temporary_with_lonlat.nc");

    info!(source = %source.display(), "Converting raster with lat/lon fields");
    Translate::new(source, &full)
        .with_lonlat()
        .run(runner, &config.translate_program)?;

    info!(reference = %config.lonlat_reference.display(), "Subsetting lat/lon reference");
    let reference = Translate::new(&full, &config.lonlat_reference)
        .with_lonlat()
        .creation_option("GDAL_NETCDF_BOTTOMUP=YES")
        .window(config.subset_window)
        .run(runner, &config.translate_program)?;

    fs::remove_file(&full)?;
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_index_formula() {
        assert_eq!(time_index(0, 0), 0);
        assert_eq!(time_index(0, 11), 11);
        assert_eq!(time_index(1, 0), 12);
        assert_eq!(time_index(98, 11), 1187);
    }

    #[test]
    fn test_month_steps_chronological() {
        let steps: Vec<_> = MonthSteps::new(2001, 2).collect();
        assert_eq!(steps.len(), 24);
        assert_eq!(steps[0], MonthStep { year: 2001, month: 1, time_index: 0 });
        assert_eq!(steps[11], MonthStep { year: 2001, month: 12, time_index: 11 });
        assert_eq!(steps[12], MonthStep { year: 2002, month: 1, time_index: 12 });
        assert_eq!(steps[23], MonthStep { year: 2002, month: 12, time_index: 23 });

        for pair in steps.windows(2) {
            assert_eq!(pair[1].time_index, pair[0].time_index + 1);
            if pair[0].year == pair[1].year {
                assert_eq!(pair[1].month, pair[0].month + 1);
            }
        }
    }

    #[test]
    fn test_month_steps_empty_and_len() {
        assert_eq!(MonthSteps::new(2001, 0).count(), 0);
        let mut steps = MonthSteps::new(2001, 99);
        assert_eq!(steps.len(), 1188);
        steps.next();
        assert_eq!(steps.len(), 1187);
    }

    #[test]
    fn test_temporary_names() {
        let dir = Path::new("work");
        assert_eq!(
            temporary_path(dir, DriverVariable::Precipitation),
            PathBuf::from("work/script-temporary_pr.nc")
        );
        assert_eq!(
            subset_path(dir, DriverVariable::ShortwaveIrradiance),
            PathBuf::from("work/script-temporary_rsds2.nc")
        );
    }

    #[test]
    fn test_cleanup_ignores_absent_files() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = temporary_path(dir.path(), DriverVariable::AirTemperature);
        fs::write(&tmp, b"x").unwrap();
        cleanup_temporaries(dir.path()).unwrap();
        assert!(!tmp.exists());
    }
}
