//! Integration tests for the climate container, lat/lon copy-in and the
//! monthly raster ingestion loop, run against the fake `gdal_translate`.

use region_input::climate::{read_driver_slice, read_spatial_reference, time_len};
use region_input::ingest::{subset_path, temporary_path};
use region_input::{
    copy_lonlat, create_climate_container, ingest_rasters, prepare_lonlat_reference,
    DriverVariable, GridExtent, RegionConfig, RegionInputError, SubsetWindow,
};
use test_utils::{
    expected_window, lonlat_at, raster_value, temp_output_root, test_config,
    write_reference_lonlat, FakeTranslate,
};

fn driver_code(driver: DriverVariable) -> u32 {
    match driver {
        DriverVariable::AirTemperature => 1,
        DriverVariable::ShortwaveIrradiance => 2,
        DriverVariable::Precipitation => 3,
        DriverVariable::VaporPressure => 4,
    }
}

// =============================================================================
// Lat/lon copy-in
// =============================================================================

#[test]
fn test_copy_lonlat_matches_reference() {
    let root = temp_output_root();
    let container = root.path().join("climate.nc");
    let reference = root.path().join("lonlat.nc");

    create_climate_container(&container, GridExtent::new(3, 4)).unwrap();
    let (lat, lon) = write_reference_lonlat(&reference, 3, 4);

    copy_lonlat(&reference, &container).unwrap();

    assert_eq!(read_spatial_reference(&container, "lat").unwrap(), lat);
    assert_eq!(read_spatial_reference(&container, "lon").unwrap(), lon);
    assert_eq!(time_len(&container).unwrap(), 0);
}

#[test]
fn test_copy_lonlat_rejects_wrong_extent() {
    let root = temp_output_root();
    let container = root.path().join("climate.nc");
    let reference = root.path().join("lonlat.nc");

    create_climate_container(&container, GridExtent::square(10)).unwrap();
    write_reference_lonlat(&reference, 10, 9);

    let err = copy_lonlat(&reference, &container).unwrap_err();
    match err {
        RegionInputError::ShapeMismatch { expected, actual, .. } => {
            assert_eq!(expected, vec![10, 10]);
            assert_eq!(actual, vec![10, 9]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

// =============================================================================
// Raster ingestion
// =============================================================================

#[test]
fn test_ingest_one_year_of_months() {
    let root = temp_output_root();
    let config = test_config(root.path(), 3, 1);
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    let fake = FakeTranslate::new();
    let summary = ingest_rasters(&config, &container, &fake).unwrap();

    assert_eq!(summary.slices_written, 12);
    assert_eq!(summary.last_time_index, Some(11));
    assert_eq!(time_len(&container).unwrap(), 12);
    // 4 conversions + 4 subsets per month
    assert_eq!(fake.call_count(), 12 * 8);

    for month in 1..=12u32 {
        let index = (month - 1) as usize;
        for driver in DriverVariable::ALL {
            let slice = read_driver_slice(&container, driver, index).unwrap();
            let base = raster_value(driver_code(driver), 2001, month);
            assert_eq!(slice, expected_window(base, &config.subset_window));
        }
    }
}

#[test]
fn test_ingest_non_square_window_lands_in_place() {
    let root = temp_output_root();
    let window = SubsetWindow {
        x_off: 4,
        y_off: 1,
        width: 3,
        height: 2,
    };
    let config = RegionConfig {
        size_y: 2,
        size_x: 3,
        subset_window: window,
        ..test_config(root.path(), 2, 1)
    };
    assert!(config.validate().is_ok());
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    ingest_rasters(&config, &container, &FakeTranslate::new()).unwrap();

    for (index, month) in [(0, 1), (6, 7), (11, 12)] {
        for driver in DriverVariable::ALL {
            let base = raster_value(driver_code(driver), 2001, month);
            let slice = read_driver_slice(&container, driver, index).unwrap();
            // Row-major (Y, X): the top window row first, then the next
            let expected = expected_window(base, &window);
            assert_eq!(slice, expected, "{} month {}", driver.name(), month);
            assert_eq!(slice[0], base + 104.0);
            assert_eq!(slice[2], base + 106.0);
            assert_eq!(slice[3], base + 204.0);
        }
    }
}

#[test]
fn test_ingest_spans_years_in_order() {
    let root = temp_output_root();
    let mut config = test_config(root.path(), 2, 2);
    config.start_year = 2050;
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    let summary = ingest_rasters(&config, &container, &FakeTranslate::new()).unwrap();
    assert_eq!(summary.slices_written, 24);

    let dec = read_driver_slice(&container, DriverVariable::Precipitation, 11).unwrap();
    let jan = read_driver_slice(&container, DriverVariable::Precipitation, 12).unwrap();
    let window = &config.subset_window;
    assert_eq!(dec, expected_window(raster_value(3, 2050, 12), window));
    assert_eq!(jan, expected_window(raster_value(3, 2051, 1), window));
}

#[test]
fn test_ingest_invocation_order() {
    let root = temp_output_root();
    let config = test_config(root.path(), 2, 1);
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    let fake = FakeTranslate::new();
    ingest_rasters(&config, &container, &fake).unwrap();
    let calls = fake.calls();
    let work_dir = config.work_dir();

    // First month: four conversions, then four subsets
    for (i, driver) in DriverVariable::ALL.iter().enumerate() {
        let convert = &calls[i];
        assert_eq!(&convert[..2], &["-of".to_string(), "netCDF".to_string()]);
        assert!(!convert.contains(&"-srcwin".to_string()));
        assert!(convert[2].ends_with(&format!("{}_01_2001.tif", driver.source_prefix())));
        assert_eq!(convert[3], temporary_path(&work_dir, *driver).display().to_string());

        let subset = &calls[4 + i];
        assert_eq!(&subset[2..7], &["-srcwin", "0", "0", "2", "2"]);
        assert_eq!(subset[7], temporary_path(&work_dir, *driver).display().to_string());
        assert_eq!(subset[8], subset_path(&work_dir, *driver).display().to_string());
    }
    assert!(calls[8][2].ends_with("tas_mean_C_iem_cccma_cgcm3_1_sresa1b_02_2001.tif"));
}

#[test]
fn test_ingest_removes_temporaries() {
    let root = temp_output_root();
    let config = test_config(root.path(), 2, 1);
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    ingest_rasters(&config, &container, &FakeTranslate::new()).unwrap();

    for driver in DriverVariable::ALL {
        assert!(!temporary_path(&config.work_dir(), driver).exists());
        assert!(!subset_path(&config.work_dir(), driver).exists());
    }
}

#[test]
fn test_failure_keeps_completed_months() {
    let root = temp_output_root();
    let config = test_config(root.path(), 2, 1);
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    // Three full months take 24 calls; the 25th fails.
    let fake = FakeTranslate::failing_on_call(24);
    let err = ingest_rasters(&config, &container, &fake).unwrap_err();
    assert!(matches!(err, RegionInputError::Command { .. }));
    assert_eq!(fake.call_count(), 25);

    assert_eq!(time_len(&container).unwrap(), 3);
    let march = read_driver_slice(&container, DriverVariable::VaporPressure, 2).unwrap();
    assert_eq!(march, expected_window(raster_value(4, 2001, 3), &config.subset_window));
}

#[test]
fn test_rerun_restarts_at_first_slice() {
    let root = temp_output_root();
    let config = test_config(root.path(), 2, 1);
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    ingest_rasters(&config, &container, &FakeTranslate::new()).unwrap();
    ingest_rasters(&config, &container, &FakeTranslate::new()).unwrap();

    assert_eq!(time_len(&container).unwrap(), 12);
}

#[test]
fn test_subset_shape_mismatch_is_fatal() {
    let root = temp_output_root();
    let mut config = test_config(root.path(), 3, 1);
    config.subset_window.width = 2;
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    let err = ingest_rasters(&config, &container, &FakeTranslate::new()).unwrap_err();
    assert!(matches!(err, RegionInputError::ShapeMismatch { .. }));
    assert_eq!(time_len(&container).unwrap(), 0);
}

// =============================================================================
// Lat/lon reference preparation
// =============================================================================

#[test]
fn test_prepare_lonlat_reference_then_copy() {
    let root = temp_output_root();
    let mut config = test_config(root.path(), 2, 1);
    config.subset_window.x_off = 1;
    config.subset_window.y_off = 2;
    let container = root.path().join("climate.nc");
    create_climate_container(&container, config.extent()).unwrap();

    let fake = FakeTranslate::new();
    let reference = prepare_lonlat_reference(&config, &fake).unwrap();
    assert_eq!(reference, config.lonlat_reference);

    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains(&"WRITE_LONLAT=YES".to_string()));
    assert!(calls[1].contains(&"GDAL_NETCDF_BOTTOMUP=YES".to_string()));
    assert!(!config.work_dir().join("script-temporary_with_lonlat.nc").exists());

    copy_lonlat(&reference, &container).unwrap();
    let lat = read_spatial_reference(&container, "lat").unwrap();
    let lon = read_spatial_reference(&container, "lon").unwrap();
    let (lat0, lon0) = lonlat_at(2, 1);
    assert_eq!(lat[0], lat0);
    assert_eq!(lon[0], lon0);
}
