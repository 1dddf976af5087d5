//! End-to-end tests against NetCDF files written to a temporary directory

mod common;

use chrono::{Datelike, NaiveDate};
use climqc::{
    annual_data_availability,
    errors::{ClimQcError, Result},
    netcdf_io::{read_variable, NetCDFWriter},
    sources::{berkeley, era5, HadEx3},
    Coord, NamedReduction, ReduceOp,
};
use common::daily_dates;
use ndarray::{Array2, Array3};
use netcdf::{create, open};
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_read_variable_masks_and_decodes_time() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("tas.nc");

    let test_data: Vec<f32> = vec![
        1.0, 2.0, -999.0, // time=0
        4.0, 5.0, 6.0, // time=1
    ];

    {
        let mut file = create(&file_path)?;
        file.add_dimension("time", 2)?;
        file.add_dimension("latitude", 1)?;
        file.add_dimension("longitude", 3)?;

        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", "days since 2000-01-01 00:00:00")?;
        time.put_attribute("calendar", "standard")?;
        time.put_values(&[0.0, 366.0], ..)?;

        let mut lat = file.add_variable::<f64>("latitude", &["latitude"])?;
        lat.put_values(&[45.0], ..)?;
        let mut lon = file.add_variable::<f64>("longitude", &["longitude"])?;
        lon.put_values(&[0.0, 10.0, 20.0], ..)?;

        let mut var = file.add_variable::<f32>("tas", &["time", "latitude", "longitude"])?;
        var.put_attribute("units", "K")?;
        var.put_attribute("_FillValue", -999.0f32)?;
        var.put_attribute("scale_factor", 2.0f32)?;
        let data_array = Array3::from_shape_vec((2, 1, 3), test_data)?;
        var.put(data_array.view(), ..)?;
    }

    let file = open(&file_path)?;
    let tas = read_variable(&file, "tas")?;

    assert_eq!(tas.dims(), &["time", "lat", "lon"]);
    assert_eq!(
        tas.coord("time"),
        Some(&Coord::Dates(vec![
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
        ]))
    );
    assert_eq!(tas.coord("lon"), Some(&Coord::Values(vec![0.0, 10.0, 20.0])));
    assert_eq!(tas.attributes().get("units").map(String::as_str), Some("K"));

    assert_eq!(tas.data()[[0, 0, 0]], 2.0);
    assert!(tas.data()[[0, 0, 2]].is_nan());
    assert_eq!(tas.data()[[1, 0, 2]], 12.0);
    assert_eq!(tas.count_valid(), 5);

    match read_variable(&file, "pr") {
        Err(ClimQcError::VariableNotFound { var }) => assert_eq!(var, "pr"),
        _ => panic!("Expected VariableNotFound error"),
    }

    Ok(())
}

#[test]
fn test_write_and_read_back() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("availability.nc");

    let dates = daily_dates(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(), 365 * 2);
    let values = dates
        .iter()
        .flat_map(|d| {
            let second = if d.year() == 2002 { f64::NAN } else { 1.0 };
            [1.0, second]
        })
        .collect();
    let series = common::daily_series("tasmax", dates, values, 2);

    let mut availability = annual_data_availability(&series)?.with_name("availability");
    availability.set_attribute("long_name", "fraction of days with data");
    NetCDFWriter::new(&file_path).write_array(&availability)?;
    // an existing file is replaced
    NetCDFWriter::new(&file_path).write_array(&availability)?;

    let file = open(&file_path)?;
    let read_back = read_variable(&file, "availability")?;

    assert_eq!(read_back.dims(), availability.dims());
    assert_eq!(read_back.coords(), availability.coords());
    assert_eq!(read_back.coord("year"), Some(&Coord::Years(vec![2001, 2002])));
    assert_eq!(
        read_back.attributes().get("long_name").map(String::as_str),
        Some("fraction of days with data")
    );
    assert_eq!(read_back.data()[[0, 0, 1]], 1.0);
    assert_eq!(read_back.data()[[1, 0, 1]], 0.0);
    assert!(file.attribute("history").is_some());

    // dates survive a round trip as well
    let daily_path = temp_dir.path().join("daily.nc");
    let mean = series.reduce("lon", ReduceOp::Mean)?;
    NetCDFWriter::new(&daily_path).write_array(&mean)?;
    let file = open(&daily_path)?;
    let read_back = read_variable(&file, "tasmax")?;
    assert_eq!(read_back.coord("time"), mean.coord("time"));
    assert!(read_back.data()[[400, 0]] == 1.0);

    Ok(())
}

/// Write a Berkeley Earth style file with one grid column at three latitudes
fn write_berkeley(path: &Path, dates: &[NaiveDate]) -> Result<()> {
    let n_time = dates.len();
    let mut file = create(path)?;
    file.add_dimension("time", n_time)?;
    file.add_dimension("latitude", 3)?;
    file.add_dimension("longitude", 1)?;
    file.add_dimension("day_number", 365)?;

    let mut lat = file.add_variable::<f64>("latitude", &["latitude"])?;
    lat.put_values(&[-70.0, -30.0, 10.0], ..)?;
    let mut lon = file.add_variable::<f64>("longitude", &["longitude"])?;
    lon.put_values(&[0.5], ..)?;

    let years: Vec<i32> = dates.iter().map(|d| d.year()).collect();
    let months: Vec<i32> = dates.iter().map(|d| d.month() as i32).collect();
    let days: Vec<i32> = dates.iter().map(|d| d.day() as i32).collect();
    for (name, values) in [("year", years), ("month", months), ("day", days)] {
        let mut var = file.add_variable::<i32>(name, &["time"])?;
        var.put_values(&values, ..)?;
    }

    // anomalies of 1 K, missing at the southernmost latitude
    let anomalies = Array3::from_shape_fn((n_time, 3, 1), |(_, lat, _)| {
        if lat == 0 {
            f32::NAN
        } else {
            1.0
        }
    });
    let mut var = file.add_variable::<f32>("temperature", &["time", "latitude", "longitude"])?;
    var.put(anomalies.view(), ..)?;

    let climatology = Array3::from_shape_fn((365, 3, 1), |(day, _, _)| day as f32);
    let mut var =
        file.add_variable::<f32>("climatology", &["day_number", "latitude", "longitude"])?;
    var.put(climatology.view(), ..)?;

    let land = Array2::from_shape_vec((3, 1), vec![1.0f32, 1.0, 0.0])?;
    let mut var = file.add_variable::<f32>("land_mask", &["latitude", "longitude"])?;
    var.put(land.view(), ..)?;
    Ok(())
}

#[test]
fn test_berkeley_reader() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("berkeley.nc");
    let dates = daily_dates(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(), 365 + 366);
    write_berkeley(&file_path, &dates)?;

    let full = berkeley::read_file(&file_path, "temperature")?;
    assert_eq!(full.coord("time"), Some(&Coord::Dates(dates.clone())));
    assert_eq!(full.shape(), &[731, 3, 1]);

    let series = berkeley::read(&file_path, "temperature", &(2000..=2000), true)?;
    assert_eq!(series.shape(), &[366, 2, 1]);
    assert_eq!(series.coord("lat"), Some(&Coord::Values(vec![-30.0, 10.0])));

    let climatology = berkeley::read_climatology(&file_path, true)?;
    assert_eq!(climatology.dims(), &["dayofyear", "lat", "lon"]);
    let absolute = climqc::add_climatology(&series, &climatology)?;
    // 1 K on top of day 60 (index 59) of the climatology
    assert_eq!(absolute.data()[[59, 0, 0]], 60.0);
    // 31 December of a leap year uses the mean of the first and last day
    assert_eq!(absolute.data()[[365, 1, 0]], 1.0 + 364.0 / 2.0);

    // without removing Antarctica the southernmost land has no data
    let series = berkeley::read(&file_path, "temperature", &(1999..=2000), false)?;
    let land_mask = berkeley::read_landmask(&file_path, false)?;
    let cleaned = climqc::clean_landmask(&series, &land_mask)?;
    assert_eq!(
        cleaned.data().iter().copied().collect::<Vec<_>>(),
        vec![0.0, 1.0, 0.0]
    );
    Ok(())
}

#[test]
fn test_berkeley_rejects_incomplete_year() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("berkeley_partial.nc");
    let dates = daily_dates(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(), 365 + 100);
    write_berkeley(&file_path, &dates)?;

    match berkeley::read(&file_path, "temperature", &(2001..=2002), true) {
        Err(ClimQcError::IncompleteYear { last_dayofyear }) => assert_eq!(last_dayofyear, 100),
        other => panic!("Expected IncompleteYear error, got {other:?}"),
    }
    assert!(berkeley::read(&file_path, "temperature", &(2001..=2001), true).is_ok());
    Ok(())
}

#[test]
fn test_hadex3_index() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("HadEX3_CDD.nc");

    let epoch = NaiveDate::from_ymd_opt(1901, 1, 1).unwrap();
    let offsets: Vec<f64> = (1950..1953)
        .map(|y| (NaiveDate::from_ymd_opt(y, 7, 1).unwrap() - epoch).num_days() as f64)
        .collect();

    {
        let mut file = create(&file_path)?;
        file.add_dimension("time", 3)?;
        file.add_dimension("latitude", 2)?;
        file.add_dimension("longitude", 2)?;

        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", "days since 1901-01-01 00:00:00")?;
        time.put_values(&offsets, ..)?;
        let mut lat = file.add_variable::<f64>("latitude", &["latitude"])?;
        lat.put_values(&[-1.25, 0.0], ..)?;
        let mut lon = file.add_variable::<f64>("longitude", &["longitude"])?;
        lon.put_values(&[0.0, 1.875], ..)?;

        let values: Vec<f32> = (0..12).map(|i| if i % 4 == 3 { -99.9 } else { i as f32 }).collect();
        let mut var = file.add_variable::<f32>("Ann", &["time", "latitude", "longitude"])?;
        var.put_attribute("units", "days")?;
        var.put_attribute("_FillValue", -99.9f32)?;
        var.put(Array3::from_shape_vec((3, 2, 2), values)?.view(), ..)?;

        let mut var = file.add_variable::<f32>("Jan", &["time", "latitude", "longitude"])?;
        var.put(Array3::<f32>::zeros((3, 2, 2)).view(), ..)?;
    }

    let cdd = HadEx3::default().read_index(&file_path)?;
    assert_eq!(cdd.dims(), &["time", "lat", "lon"]);
    assert_eq!(cdd.coord("time"), Some(&Coord::Years(vec![1950, 1951, 1952])));
    assert!(cdd.attributes().get("units").is_none());
    assert_eq!(cdd.count_valid(), 9);

    let missing = HadEx3 {
        variable: "Feb".to_string(),
        ..HadEx3::default()
    };
    assert!(matches!(
        missing.read_index(&file_path),
        Err(ClimQcError::VariableNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_era5_landmask() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("era5_lsm.nc");

    {
        let mut file = create(&file_path)?;
        file.add_dimension("time", 1)?;
        file.add_dimension("latitude", 4)?;
        file.add_dimension("longitude", 2)?;

        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", "hours since 1900-01-01 00:00:00.0")?;
        time.put_attribute("calendar", "gregorian")?;
        time.put_values(&[0.0], ..)?;
        let mut lat = file.add_variable::<f64>("latitude", &["latitude"])?;
        lat.put_values(&[88.0, 60.0, -30.0, -70.0], ..)?;
        let mut lon = file.add_variable::<f64>("longitude", &["longitude"])?;
        lon.put_values(&[0.0, 0.25], ..)?;

        let values: Vec<i16> = vec![1, 1, 0, 1, 1, 0, 1, 1];
        let mut var = file.add_variable::<i16>("lsm", &["time", "latitude", "longitude"])?;
        var.put_attribute("scale_factor", 0.5f64)?;
        var.put_attribute("add_offset", 0.25f64)?;
        var.put(Array3::from_shape_vec((1, 4, 2), values)?.view(), ..)?;
    }

    let lsm = era5::read_landmask(&file_path, false)?;
    assert_eq!(lsm.dims(), &["lat", "lon"]);
    assert_eq!(lsm.shape(), &[4, 2]);
    assert_eq!(lsm.data()[[0, 0]], 0.75);
    assert_eq!(lsm.data()[[1, 0]], 0.25);

    let lsm = era5::read_landmask(&file_path, true)?;
    assert_eq!(lsm.coord("lat"), Some(&Coord::Values(vec![60.0, -30.0])));
    Ok(())
}
