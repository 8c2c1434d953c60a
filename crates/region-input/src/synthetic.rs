//! Synthetic template datasets.
//!
//! These builders fill fire, vegetation, drainage and run-mask grids with
//! placeholder values. The numbers are not meant to be realistic; they give
//! the downstream model structurally valid inputs. Cell `(0,0)` is always
//! overwritten with the value observed at the Toolik test site so model
//! runs on that pixel can be checked against known output.

use std::ops::Range;
use std::path::Path;

use rand::Rng;
use tracing::{info, warn};

use crate::error::{RegionInputError, Result};
use crate::grid::{self, GridExtent, DIM_X, DIM_Y};

/// Placeholder classes are drawn from this range.
pub const FILL_RANGE: Range<i32> = 1..7;

/// Toolik fire return interval at `(0,0)`.
pub const TOOLIK_FRI: i32 = 1000;
/// Toolik vegetation class at `(0,0)`.
pub const TOOLIK_VEG_CLASS: i32 = 4;
/// Toolik drainage class at `(0,0)`.
pub const TOOLIK_DRAINAGE_CLASS: i32 = 0;

/// Fire years are drawn from this range.
pub const FIRE_YEAR_RANGE: Range<i32> = 1900..2006;
/// Fire sizes are drawn from this range.
pub const FIRE_SIZE_RANGE: Range<i32> = 0..100;
/// A cell holds fewer than this many fire events.
pub const MAX_FIRE_EVENTS: usize = 10;

/// Dimension holding every fire event of every cell, cell by cell.
pub const DIM_FIRE_EVENT: &str = "fire_event";

/// Per-cell fire events, row-major. `years[i]` and `sizes[i]` always have
/// the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireHistory {
    extent: GridExtent,
    years: Vec<Vec<i32>>,
    sizes: Vec<Vec<i32>>,
}

impl FireHistory {
    /// Random history: each cell gets up to nine fires with ascending years.
    pub fn random<R: Rng + ?Sized>(extent: GridExtent, rng: &mut R) -> Self {
        let mut years = Vec::with_capacity(extent.cells());
        let mut sizes = Vec::with_capacity(extent.cells());

        for _ in 0..extent.cells() {
            let count = rng.gen_range(0..MAX_FIRE_EVENTS);
            let mut cell_years: Vec<i32> = (0..count)
                .map(|_| rng.gen_range(FIRE_YEAR_RANGE))
                .collect();
            cell_years.sort_unstable();
            let cell_sizes: Vec<i32> = (0..count)
                .map(|_| rng.gen_range(FIRE_SIZE_RANGE))
                .collect();
            years.push(cell_years);
            sizes.push(cell_sizes);
        }

        Self { extent, years, sizes }
    }

    /// Build from explicit per-cell sequences.
    pub fn from_cells(
        extent: GridExtent,
        years: Vec<Vec<i32>>,
        sizes: Vec<Vec<i32>>,
    ) -> Result<Self> {
        if years.len() != extent.cells() || sizes.len() != extent.cells() {
            return Err(RegionInputError::ShapeMismatch {
                variable: "fire_years".to_string(),
                expected: extent.shape(),
                actual: vec![years.len(), sizes.len()],
            });
        }
        if let Some(i) = (0..years.len()).find(|&i| years[i].len() != sizes[i].len()) {
            return Err(RegionInputError::ShapeMismatch {
                variable: "fire_sizes".to_string(),
                expected: vec![years[i].len()],
                actual: vec![sizes[i].len()],
            });
        }
        Ok(Self { extent, years, sizes })
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn years(&self, y: usize, x: usize) -> &[i32] {
        &self.years[self.extent.index(y, x)]
    }

    pub fn sizes(&self, y: usize, x: usize) -> &[i32] {
        &self.sizes[self.extent.index(y, x)]
    }

    /// Number of fire events per cell, row-major.
    pub fn counts(&self) -> Vec<i32> {
        self.years.iter().map(|cell| cell.len() as i32).collect()
    }

    pub fn total_events(&self) -> usize {
        self.years.iter().map(Vec::len).sum()
    }

    fn flat_years(&self) -> Vec<i32> {
        self.years.iter().flatten().copied().collect()
    }

    fn flat_sizes(&self) -> Vec<i32> {
        self.sizes.iter().flatten().copied().collect()
    }
}

fn random_classes<R: Rng + ?Sized>(extent: GridExtent, rng: &mut R) -> Vec<i32> {
    (0..extent.cells())
        .map(|_| rng.gen_range(FILL_RANGE))
        .collect()
}

/// Fire classification file: `fri` plus ragged fire years and sizes.
///
/// The ragged sequences are stored as a CF contiguous ragged array:
/// `fire_count(Y, X)` gives each cell's event count and the events follow
/// one another along `fire_event` in row-major cell order.
pub fn make_fire_dataset<R: Rng + ?Sized>(
    path: &Path,
    extent: GridExtent,
    rng: &mut R,
) -> Result<FireHistory> {
    info!(
        path = %path.display(),
        "Creating a fire classification file, {} by {} pixels",
        extent.size_y,
        extent.size_x
    );

    let mut file = grid::create_grid_file(path, extent)?;

    warn!("Filling FRI with random data");
    let mut fri = random_classes(extent, rng);
    warn!("Setting FRI for pixel 0,0 to {}", TOOLIK_FRI);
    fri[0] = TOOLIK_FRI;
    grid::write_int_grid(&mut file, "fri", extent, &fri)?;

    warn!("Filling fire_years and fire_sizes with random data");
    let history = FireHistory::random(extent, rng);
    log_sample_cells(&history);

    write_fire_history(&mut file, &history)?;
    Ok(history)
}

fn log_sample_cells(history: &FireHistory) {
    let extent = history.extent();
    if extent.cells() == 0 {
        return;
    }
    let last = (extent.size_y - 1, extent.size_x - 1);
    for (y, x) in [(0, 0), (0, 1usize.min(extent.size_x - 1)), last] {
        info!(
            y,
            x,
            years = ?history.years(y, x),
            sizes = ?history.sizes(y, x),
            "Sample fire cell"
        );
    }
}

fn write_fire_history(file: &mut netcdf::FileMut, history: &FireHistory) -> Result<()> {
    let events = history.total_events();
    file.add_dimension(DIM_FIRE_EVENT, events)?;

    let mut count = file.add_variable::<i32>("fire_count", &[DIM_Y, DIM_X])?;
    count.put_attribute("long_name", "number of fire events in cell")?;
    count.put_attribute("sample_dimension", DIM_FIRE_EVENT)?;
    count.put_values(&history.counts(), ..)?;

    // Zero-length variables are declared but cannot take a write.
    let mut years = file.add_variable::<i32>("fire_years", &[DIM_FIRE_EVENT])?;
    years.put_attribute("long_name", "year of fire event")?;
    if events > 0 {
        years.put_values(&history.flat_years(), ..)?;
    }

    let mut sizes = file.add_variable::<i32>("fire_sizes", &[DIM_FIRE_EVENT])?;
    sizes.put_attribute("long_name", "size of fire event")?;
    if events > 0 {
        sizes.put_values(&history.flat_sizes(), ..)?;
    }
    Ok(())
}

/// Rebuild the per-cell fire history from a fire classification file.
pub fn read_fire_history(path: &Path) -> Result<FireHistory> {
    let file = netcdf::open(path)?;
    let extent = grid::file_extent(&file)?;

    let counts: Vec<i32> = read_i32(&file, "fire_count")?;
    let total: usize = counts.iter().map(|&c| c as usize).sum();
    let (flat_years, flat_sizes) = if total == 0 {
        (Vec::new(), Vec::new())
    } else {
        (read_i32(&file, "fire_years")?, read_i32(&file, "fire_sizes")?)
    };

    if flat_years.len() != total || flat_sizes.len() != total {
        return Err(RegionInputError::ShapeMismatch {
            variable: DIM_FIRE_EVENT.to_string(),
            expected: vec![total],
            actual: vec![flat_years.len(), flat_sizes.len()],
        });
    }

    let mut years = Vec::with_capacity(counts.len());
    let mut sizes = Vec::with_capacity(counts.len());
    let mut start = 0;
    for &count in &counts {
        let end = start + count as usize;
        years.push(flat_years[start..end].to_vec());
        sizes.push(flat_sizes[start..end].to_vec());
        start = end;
    }

    FireHistory::from_cells(extent, years, sizes)
}

fn read_i32(file: &netcdf::File, name: &str) -> Result<Vec<i32>> {
    let var = file
        .variable(name)
        .ok_or_else(|| RegionInputError::MissingData(format!("{} variable", name)))?;
    Ok(var.get_values(..)?)
}

/// Vegetation classification file (`veg_class`).
pub fn make_veg_classification<R: Rng + ?Sized>(
    path: &Path,
    extent: GridExtent,
    rng: &mut R,
) -> Result<()> {
    info!(
        path = %path.display(),
        "Creating a vegetation classification file, {} by {} pixels",
        extent.size_y,
        extent.size_x
    );
    let mut file = grid::create_grid_file(path, extent)?;

    warn!("Filling veg_class with random data");
    let mut values = random_classes(extent, rng);
    warn!("Setting pixel 0,0 to {}", TOOLIK_VEG_CLASS);
    values[0] = TOOLIK_VEG_CLASS;

    grid::write_int_grid(&mut file, "veg_class", extent, &values)
}

/// Drainage classification file (`drainage_class`).
pub fn make_drainage_classification<R: Rng + ?Sized>(
    path: &Path,
    extent: GridExtent,
    rng: &mut R,
) -> Result<()> {
    info!(
        path = %path.display(),
        "Creating a drainage classification file, {} by {} pixels",
        extent.size_y,
        extent.size_x
    );
    let mut file = grid::create_grid_file(path, extent)?;

    warn!("Filling drainage_class with random data");
    let mut values = random_classes(extent, rng);
    warn!("Setting pixel 0,0 to {}", TOOLIK_DRAINAGE_CLASS);
    values[0] = TOOLIK_DRAINAGE_CLASS;

    grid::write_int_grid(&mut file, "drainage_class", extent, &values)
}

/// Run mask (`run`): only pixel `(0,0)` is enabled.
pub fn make_run_mask(path: &Path, extent: GridExtent) -> Result<()> {
    info!(
        path = %path.display(),
        "Creating a run_mask file, {} by {} pixels",
        extent.size_y,
        extent.size_x
    );
    let mut file = grid::create_grid_file(path, extent)?;

    warn!("Turning off all pixels except 0,0");
    let mut values = vec![0; extent.cells()];
    values[0] = 1;

    grid::write_int_grid(&mut file, "run", extent, &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_history_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let extent = GridExtent::new(6, 4);
        let history = FireHistory::random(extent, &mut rng);

        for y in 0..extent.size_y {
            for x in 0..extent.size_x {
                let years = history.years(y, x);
                let sizes = history.sizes(y, x);
                assert_eq!(years.len(), sizes.len());
                assert!(years.len() < MAX_FIRE_EVENTS);
                assert!(years.windows(2).all(|w| w[0] <= w[1]), "years not sorted: {:?}", years);
                assert!(years.iter().all(|yr| FIRE_YEAR_RANGE.contains(yr)));
                assert!(sizes.iter().all(|s| FIRE_SIZE_RANGE.contains(s)));
            }
        }
        assert_eq!(
            history.counts().iter().map(|&c| c as usize).sum::<usize>(),
            history.total_events()
        );
    }

    #[test]
    fn test_from_cells_rejects_unequal_lengths() {
        let extent = GridExtent::new(1, 2);
        let err = FireHistory::from_cells(
            extent,
            vec![vec![1950], vec![1960, 1970]],
            vec![vec![5], vec![10]],
        )
        .unwrap_err();
        assert!(matches!(err, RegionInputError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_fire_history_survives_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fire.nc");
        let mut rng = StdRng::seed_from_u64(11);
        let extent = GridExtent::new(4, 3);

        let written = make_fire_dataset(&path, extent, &mut rng).unwrap();
        let read = read_fire_history(&path).unwrap();
        assert_eq!(read, written);

        let (_, fri) = grid::read_int_grid(&path, "fri").unwrap();
        assert_eq!(fri[0], TOOLIK_FRI);
        assert!(fri[1..].iter().all(|v| FILL_RANGE.contains(v)));
    }

    #[test]
    fn test_empty_fire_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fire.nc");
        let extent = GridExtent::new(1, 2);
        let history =
            FireHistory::from_cells(extent, vec![vec![], vec![]], vec![vec![], vec![]]).unwrap();

        let mut file = grid::create_grid_file(&path, extent).unwrap();
        write_fire_history(&mut file, &history).unwrap();
        drop(file);

        assert_eq!(read_fire_history(&path).unwrap(), history);
    }

    #[test]
    fn test_empty_extent_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let extent = GridExtent::new(0, 5);

        let results = [
            make_fire_dataset(&dir.path().join("fire.nc"), extent, &mut rng).map(|_| ()),
            make_veg_classification(&dir.path().join("veg.nc"), extent, &mut rng),
            make_drainage_classification(&dir.path().join("drainage.nc"), extent, &mut rng),
            make_run_mask(&dir.path().join("mask.nc"), extent),
        ];
        for result in results {
            assert!(matches!(result, Err(RegionInputError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_single_cell_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.nc");
        make_run_mask(&path, GridExtent::square(1)).unwrap();
        let (_, values) = grid::read_int_grid(&path, "run").unwrap();
        assert_eq!(values, vec![1]);
    }
}
