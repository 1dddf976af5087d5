//! Berkeley Earth daily land temperature
//!
//! The daily files store temperature anomalies on a 1° grid, a 365-day
//! `climatology` and a `land_mask`. Dates are given as separate `year`,
//! `month` and `day` variables along `time`.

use super::{open_variable, ANTARCTICA_LAT};
use crate::errors::{ClimQcError, Result};
use crate::labeled::{Coord, GriddedSeries, LabeledArray, LandMask};
use crate::netcdf_io::{read_values, read_variable};
use chrono::NaiveDate;
use std::ops::RangeInclusive;
use std::path::Path;

/// Read a variable with its time axis rebuilt from `year`/`month`/`day`
pub fn read_file(path: &Path, variable: &str) -> Result<GriddedSeries> {
    log::debug!("Reading Berkeley Earth '{variable}' from {}", path.display());
    let file = netcdf::open(path)?;
    let array = read_variable(&file, variable)?;

    let years = read_values(&file, "year")?;
    let months = read_values(&file, "month")?;
    let days = read_values(&file, "day")?;

    let dates = years
        .iter()
        .zip(&months)
        .zip(&days)
        .map(|((&y, &m), &d)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let date = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32);
            date.ok_or_else(|| ClimQcError::InvalidTime {
                reason: format!("invalid date {y}-{m}-{d}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    array.replace_coord("time", Coord::Dates(dates))
}

/// Read daily data restricted to `years`, optionally without Antarctica.
///
/// # Errors
///
/// Returns [`ClimQcError::IncompleteYear`] if the last year does not reach
/// day 365, besides any error of [`read_file`].
pub fn read(
    path: &Path,
    variable: &str,
    years: &RangeInclusive<i32>,
    remove_antarctica: bool,
) -> Result<GriddedSeries> {
    let mut series = read_file(path, variable)?;

    series = without_antarctica(series, remove_antarctica)?;

    // data availability is generally low before 1950
    series = series.sel_years("time", years)?;

    let last_dayofyear = series.dayofyear("time")?.last().copied().unwrap_or(0);
    if last_dayofyear < 365 {
        return Err(ClimQcError::IncompleteYear { last_dayofyear });
    }

    Ok(series)
}

/// The 365-day climatology, on a `dayofyear` axis
pub fn read_climatology(path: &Path, remove_antarctica: bool) -> Result<LabeledArray<f64>> {
    without_antarctica(open_variable(path, "climatology")?, remove_antarctica)
}

/// The land mask stored with the temperature data
pub fn read_landmask(path: &Path, remove_antarctica: bool) -> Result<LandMask> {
    without_antarctica(open_variable(path, "land_mask")?, remove_antarctica)
}

fn without_antarctica<T: Clone>(
    array: LabeledArray<T>,
    remove_antarctica: bool,
) -> Result<LabeledArray<T>> {
    if remove_antarctica {
        array.sel_range("lat", ANTARCTICA_LAT, f64::INFINITY)
    } else {
        Ok(array)
    }
}
