//! Raster generators standing in for `gdal_translate`.
//!
//! [`FakeTranslate`] implements [`ToolRunner`] without GDAL. A full-extent
//! conversion fills `Band1` with [`pixel_value`]s built on a base encoding
//! the source variable, year and month (see [`raster_value`]), and a
//! `-srcwin` subset copies the requested window out of its input.

use std::cell::RefCell;
use std::path::Path;

use region_input::{RegionInputError, Result, SubsetWindow, ToolRunner};

/// Rows/columns of a fake full-extent raster.
pub const FULL_EXTENT: (usize, usize) = (16, 16);

/// Latitude of row 0 in generated lat/lon fields.
pub const BASE_LAT: f32 = 68.0;
/// Longitude of column 0 in generated lat/lon fields.
pub const BASE_LON: f32 = -150.0;
/// Spacing of generated lat/lon fields, degrees.
pub const LONLAT_STEP: f32 = 0.01;

/// Numeric code of a source series, keyed by the leading token of its
/// file name (`tas`, `rsds`, `pr`, `vap`).
pub fn variable_code(token: &str) -> Option<u32> {
    match token {
        "tas" => Some(1),
        "rsds" => Some(2),
        "pr" => Some(3),
        "vap" => Some(4),
        _ => None,
    }
}

/// Uniform value of the fake raster for one source file.
///
/// `code * 1_000_000 + year * 100 + month`, exact in `f32`.
pub fn raster_value(code: u32, year: i32, month: u32) -> f32 {
    (code as i64 * 1_000_000 + year as i64 * 100 + month as i64) as f32
}

/// Value of pixel `(row, col)` of a full raster with base `base`.
///
/// Exact in `f32` for every base and pixel of [`FULL_EXTENT`].
pub fn pixel_value(base: f32, row: usize, col: usize) -> f32 {
    base + (row * 100 + col) as f32
}

/// Row-major values a `-srcwin` subset of the full raster with base `base`
/// holds.
pub fn expected_window(base: f32, window: &SubsetWindow) -> Vec<f32> {
    let mut values = Vec::with_capacity(window.width * window.height);
    for row in window.y_off..window.y_off + window.height {
        for col in window.x_off..window.x_off + window.width {
            values.push(pixel_value(base, row, col));
        }
    }
    values
}

/// Parse `<token>_..._<MM>_<YYYY>.tif` into its raster base value.
pub fn value_for_source(path: &Path) -> Option<f32> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    let code = variable_code(parts[0])?;
    let month: u32 = parts[parts.len() - 2].parse().ok()?;
    let year: i32 = parts[parts.len() - 1].parse().ok()?;
    Some(raster_value(code, year, month))
}

/// Latitude/longitude of pixel `(row, col)` in the fake full raster.
pub fn lonlat_at(row: usize, col: usize) -> (f32, f32) {
    (
        BASE_LAT + row as f32 * LONLAT_STEP,
        BASE_LON + col as f32 * LONLAT_STEP,
    )
}

/// Write a GDAL-like NetCDF raster: dims `y`/`x`, row-major `Band1`, and
/// optionally 2-D `lat`/`lon` starting at pixel `origin` of the full raster.
pub fn write_band_file(
    path: &Path,
    shape: (usize, usize),
    band_values: &[f32],
    lonlat_origin: Option<(usize, usize)>,
) -> std::result::Result<(), netcdf::Error> {
    let (rows, cols) = shape;
    let mut file = netcdf::create(path)?;
    file.add_dimension("y", rows)?;
    file.add_dimension("x", cols)?;

    let mut band = file.add_variable::<f32>("Band1", &["y", "x"])?;
    band.put_values(band_values, ..)?;

    if let Some((row0, col0)) = lonlat_origin {
        let mut lat = Vec::with_capacity(rows * cols);
        let mut lon = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let (la, lo) = lonlat_at(row0 + row, col0 + col);
                lat.push(la);
                lon.push(lo);
            }
        }
        let mut lat_var = file.add_variable::<f32>("lat", &["y", "x"])?;
        lat_var.put_values(&lat, ..)?;
        let mut lon_var = file.add_variable::<f32>("lon", &["y", "x"])?;
        lon_var.put_values(&lon, ..)?;
    }
    Ok(())
}

/// Full-extent `Band1` of a raster with base `base`, row-major.
pub fn full_raster(base: f32) -> Vec<f32> {
    let (rows, cols) = FULL_EXTENT;
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| pixel_value(base, row, col)))
        .collect()
}

/// `Band1` of `path` with its `(rows, cols)` shape.
fn read_band(path: &Path) -> std::result::Result<((usize, usize), Vec<f32>), String> {
    let file = netcdf::open(path).map_err(|e| e.to_string())?;
    let band = file
        .variable("Band1")
        .ok_or_else(|| format!("no Band1 in {}", path.display()))?;
    let dims = band.dimensions();
    if dims.len() != 2 {
        return Err(format!("Band1 in {} is not 2-D", path.display()));
    }
    let shape = (dims[0].len(), dims[1].len());
    let values: Vec<f32> = band.get_values(..).map_err(|e| e.to_string())?;
    Ok((shape, values))
}

/// Cut `height` x `width` pixels at `(y_off, x_off)` out of a row-major band.
fn cut_window(
    shape: (usize, usize),
    values: &[f32],
    (x_off, y_off, width, height): (usize, usize, usize, usize),
) -> std::result::Result<Vec<f32>, String> {
    let (rows, cols) = shape;
    if y_off + height > rows || x_off + width > cols {
        return Err(format!(
            "-srcwin {} {} {} {} falls outside the {}x{} raster",
            x_off, y_off, width, height, cols, rows
        ));
    }
    let mut window = Vec::with_capacity(width * height);
    for row in y_off..y_off + height {
        let start = row * cols + x_off;
        window.extend_from_slice(&values[start..start + width]);
    }
    Ok(window)
}

/// In-process replacement for `gdal_translate`.
#[derive(Debug, Default)]
pub struct FakeTranslate {
    calls: RefCell<Vec<Vec<String>>>,
    fail_on_call: Option<usize>,
}

impl FakeTranslate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th invocation (zero-based) and every later one.
    pub fn failing_on_call(n: usize) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on_call: Some(n),
        }
    }

    /// Argument lists of every invocation so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn translate(args: &[String]) -> std::result::Result<(), String> {
        if args.len() < 2 {
            return Err("missing input/output".to_string());
        }
        let output = Path::new(&args[args.len() - 1]);
        let input = Path::new(&args[args.len() - 2]);
        let lonlat = args.iter().any(|a| a == "WRITE_LONLAT=YES");

        let window = match args.iter().position(|a| a == "-srcwin") {
            Some(pos) => {
                let nums: Vec<usize> = args
                    .get(pos + 1..pos + 5)
                    .ok_or("incomplete -srcwin")?
                    .iter()
                    .map(|s| s.parse::<usize>().map_err(|e| e.to_string()))
                    .collect::<std::result::Result<_, _>>()?;
                Some((nums[0], nums[1], nums[2], nums[3]))
            }
            None => None,
        };

        match window {
            Some((x_off, y_off, width, height)) => {
                if !input.exists() {
                    return Err(format!("{}: No such file or directory", input.display()));
                }
                let (shape, values) = read_band(input)?;
                let window = cut_window(shape, &values, (x_off, y_off, width, height))?;
                let origin = lonlat.then_some((y_off, x_off));
                write_band_file(output, (height, width), &window, origin)
                    .map_err(|e| e.to_string())
            }
            None => {
                let base = value_for_source(input)
                    .ok_or_else(|| format!("unrecognised source raster {}", input.display()))?;
                let origin = lonlat.then_some((0, 0));
                write_band_file(output, FULL_EXTENT, &full_raster(base), origin)
                    .map_err(|e| e.to_string())
            }
        }
    }
}

impl ToolRunner for FakeTranslate {
    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        let call = {
            let mut calls = self.calls.borrow_mut();
            calls.push(args.to_vec());
            calls.len() - 1
        };

        let fail = |reason: String| RegionInputError::Command {
            program: program.to_string(),
            args: args.to_vec(),
            reason,
        };

        if self.fail_on_call.is_some_and(|n| call >= n) {
            return Err(fail("exit status: 1".to_string()));
        }
        Self::translate(args).map_err(fail)
    }
}
