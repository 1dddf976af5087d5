//! Builders for small synthetic grids shared by the integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use climqc::{Coord, LabeledArray};
use ndarray::ArrayD;

/// Consecutive daily dates starting at `start`
pub fn daily_dates(start: NaiveDate, n_days: usize) -> Vec<NaiveDate> {
    start.iter_days().take(n_days).collect()
}

/// A `[time, lat, lon]` array on a 1 x `n_cells` grid
pub fn daily_series(name: &str, dates: Vec<NaiveDate>, values: Vec<f64>, n_cells: usize) -> LabeledArray<f64> {
    let n_time = dates.len();
    let data = ArrayD::from_shape_vec(vec![n_time, 1, n_cells], values).unwrap();
    LabeledArray::new(
        name,
        data,
        dims(&["time", "lat", "lon"]),
        vec![
            Coord::Dates(dates),
            Coord::Values(vec![0.0]),
            Coord::Values((0..n_cells).map(|i| i as f64).collect()),
        ],
    )
    .unwrap()
}

/// A `[<time_dim>, lat, lon]` annual array on a 1 x `n_cells` grid
pub fn annual_series(
    name: &str,
    time_dim: &str,
    years: Vec<i32>,
    values: Vec<f64>,
    n_cells: usize,
) -> LabeledArray<f64> {
    let n_years = years.len();
    let data = ArrayD::from_shape_vec(vec![n_years, 1, n_cells], values).unwrap();
    LabeledArray::new(
        name,
        data,
        dims(&[time_dim, "lat", "lon"]),
        vec![
            Coord::Years(years),
            Coord::Values(vec![0.0]),
            Coord::Values((0..n_cells).map(|i| i as f64).collect()),
        ],
    )
    .unwrap()
}

/// A `[lat, lon]` field
pub fn field(name: &str, lats: Vec<f64>, lons: Vec<f64>, values: Vec<f64>) -> LabeledArray<f64> {
    let shape = vec![lats.len(), lons.len()];
    let data = ArrayD::from_shape_vec(shape, values).unwrap();
    LabeledArray::new(
        name,
        data,
        dims(&["lat", "lon"]),
        vec![Coord::Values(lats), Coord::Values(lons)],
    )
    .unwrap()
}

pub fn dims(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Element-wise equality treating `NaN` as equal to `NaN`
pub fn same_with_nan(a: &LabeledArray<f64>, b: &LabeledArray<f64>) -> bool {
    a.dims() == b.dims()
        && a.coords() == b.coords()
        && a.data().shape() == b.data().shape()
        && a
            .data()
            .iter()
            .zip(b.data().iter())
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
