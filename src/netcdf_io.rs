//! NetCDF I/O for labeled arrays
//!
//! Reading turns a NetCDF variable into a [`LabeledArray`]: dimension names are
//! normalized across data sources, fill values become `NaN`, packed values are
//! unpacked and CF time axes are decoded to calendar dates. Writing stores a
//! labeled array together with its coordinates so that filtered results can be
//! opened again by this crate or by other CF-aware tools.

use crate::errors::{ClimQcError, Result};
use crate::labeled::{Coord, LabeledArray};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use ndarray::ArrayD;
use netcdf::{AttributeValue, File, Variable};
use std::{fs, path::Path};

/// Fill value used for missing data in written files
pub const FILL_VALUE: f64 = 1.0e20;

/// Values beyond this magnitude are netCDF default fill values
const DEFAULT_FILL_THRESHOLD: f64 = 9.9e36;

/// Epoch of written date axes
const TIME_UNITS: &str = "days since 1970-01-01";

/// Map dimension names of the supported data sources onto common names
pub fn normalize_dim_name(name: &str) -> &str {
    match name {
        "latitude" => "lat",
        "longitude" => "lon",
        "day_number" => "dayofyear",
        other => other,
    }
}

/// Read a variable as a labeled array of `f64`.
///
/// # Errors
///
/// Returns [`ClimQcError::VariableNotFound`] if the variable does not exist,
/// [`ClimQcError::InvalidTime`] for undecodable time axes and any NetCDF error.
pub fn read_variable(file: &File, var_name: &str) -> Result<LabeledArray<f64>> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| ClimQcError::VariableNotFound {
            var: var_name.to_string(),
        })?;

    let raw_dims: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    log::debug!("Loading '{var_name}' with shape {shape:?}");
    let values = mask_and_scale(&var, var.get_values::<f64, _>(..)?);
    let data = ArrayD::from_shape_vec(shape.clone(), values)?;

    let coords = raw_dims
        .iter()
        .zip(&shape)
        .map(|(dim, &len)| read_coord(file, dim, len))
        .collect::<Result<Vec<_>>>()?;
    let dims = raw_dims
        .iter()
        .map(|d| normalize_dim_name(d).to_string())
        .collect();

    let mut array = LabeledArray::new(var_name, data, dims, coords)?;
    for attr in var.attributes() {
        if let Ok(AttributeValue::Str(value)) = attr.value() {
            array.set_attribute(attr.name(), value);
        }
    }
    Ok(array)
}

/// Read a 1-D variable as plain numbers
pub fn read_values(file: &File, var_name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| ClimQcError::VariableNotFound {
            var: var_name.to_string(),
        })?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Coordinate of one dimension, from its coordinate variable if there is one
fn read_coord(file: &File, dim: &str, len: usize) -> Result<Coord> {
    let Some(var) = file.variable(dim) else {
        return Ok(Coord::Index(len));
    };
    if var.dimensions().len() != 1 {
        return Ok(Coord::Index(len));
    }

    let values = var.get_values::<f64, _>(..)?;
    let units = string_attribute(&var, "units");

    match units.as_deref() {
        Some(u) if u.contains(" since ") => {
            let calendar = string_attribute(&var, "calendar");
            Ok(Coord::Dates(decode_time(u, calendar.as_deref(), &values)?))
        }
        Some("year" | "years") if values.iter().all(|v| v.fract() == 0.0) => {
            Ok(Coord::Years(values.iter().map(|&v| v as i32).collect()))
        }
        _ if normalize_dim_name(dim) == "dayofyear" && values.iter().all(|&v| v >= 1.0) => {
            Ok(Coord::DaysOfYear(values.iter().map(|&v| v as u32).collect()))
        }
        _ => Ok(Coord::Values(values)),
    }
}

/// Decode CF time offsets such as `"days since 1950-01-01 00:00:00"` to dates.
///
/// Only calendars equivalent to the proleptic Gregorian calendar are supported.
///
/// # Errors
///
/// Returns [`ClimQcError::InvalidTime`] for malformed units, unsupported
/// calendars or offsets that cannot be represented.
pub fn decode_time(
    units: &str,
    calendar: Option<&str>,
    offsets: &[f64],
) -> Result<Vec<NaiveDate>> {
    if let Some(cal) = calendar {
        if !matches!(
            cal.to_lowercase().as_str(),
            "standard" | "gregorian" | "proleptic_gregorian"
        ) {
            return Err(ClimQcError::InvalidTime {
                reason: format!("unsupported calendar '{cal}'"),
            });
        }
    }

    let parts: Vec<&str> = units.split_whitespace().collect();
    if parts.len() < 3 || parts[1] != "since" {
        return Err(ClimQcError::InvalidTime {
            reason: format!("unexpected time units format: '{units}'"),
        });
    }

    let seconds_per_unit = match parts[0].to_lowercase().as_str() {
        "days" | "day" | "d" => 86_400.0,
        "hours" | "hour" | "h" => 3_600.0,
        "minutes" | "minute" | "min" => 60.0,
        "seconds" | "second" | "s" => 1.0,
        other => {
            return Err(ClimQcError::InvalidTime {
                reason: format!("unsupported time unit '{other}'"),
            })
        }
    };

    // Reference may be "1950-01-01", "1950-01-01 12:00:00" or "1950-01-01T12:00:00"
    let (date_str, time_str) = match parts[2].split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (parts[2], parts.get(3).copied()),
    };
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        ClimQcError::InvalidTime {
            reason: format!("failed to parse reference date '{date_str}': {e}"),
        }
    })?;
    let time = time_str
        .map(|t| t.split('.').next().unwrap_or(t))
        .and_then(|t| {
            NaiveTime::parse_from_str(t, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .ok()
        })
        .unwrap_or_default();
    let reference = NaiveDateTime::new(date, time);

    offsets
        .iter()
        .map(|&offset| {
            let millis = (offset * seconds_per_unit * 1000.0).round();
            if !millis.is_finite() {
                return Err(ClimQcError::InvalidTime {
                    reason: format!("time offset {offset} is not finite"),
                });
            }
            #[allow(clippy::cast_possible_truncation)]
            let delta = TimeDelta::try_milliseconds(millis as i64);
            delta
                .and_then(|d| reference.checked_add_signed(d))
                .map(|dt| dt.date())
                .ok_or_else(|| ClimQcError::InvalidTime {
                    reason: format!("date overflow adding {offset} {} to {reference}", parts[0]),
                })
        })
        .collect()
}

/// Replace fill values by `NaN` and apply `scale_factor` / `add_offset`
fn mask_and_scale(var: &Variable, mut values: Vec<f64>) -> Vec<f64> {
    let fill_values: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| numeric_attribute(var, name))
        .collect();
    let scale = numeric_attribute(var, "scale_factor").unwrap_or(1.0);
    let offset = numeric_attribute(var, "add_offset").unwrap_or(0.0);

    for v in &mut values {
        if fill_values.contains(v) || v.abs() >= DEFAULT_FILL_THRESHOLD {
            *v = f64::NAN;
        } else {
            *v = *v * scale + offset;
        }
    }
    values
}

fn string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn numeric_attribute(var: &Variable, name: &str) -> Option<f64> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&x| f64::from(x)),
        _ => None,
    }
}

/// Writer for labeled arrays
pub struct NetCDFWriter<'a> {
    output_path: &'a Path,
}

impl<'a> NetCDFWriter<'a> {
    /// Create a new NetCDF writer
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write one array with its coordinates, replacing an existing file
    pub fn write_array(&self, array: &LabeledArray<f64>) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = netcdf::create(self.output_path)?;

        for (dim, coord) in array.dims().iter().zip(array.coords()) {
            file.add_dimension(dim, coord.len())?;
        }

        for (dim, coord) in array.dims().iter().zip(array.coords()) {
            match coord {
                Coord::Values(values) => {
                    let mut var = file.add_variable::<f64>(dim, &[dim.as_str()])?;
                    var.put_values(values, ..)?;
                }
                Coord::Years(years) => {
                    let mut var = file.add_variable::<i32>(dim, &[dim.as_str()])?;
                    var.put_attribute("units", "year")?;
                    var.put_values(years, ..)?;
                }
                Coord::DaysOfYear(days) => {
                    let days: Vec<i32> = days.iter().map(|&d| d as i32).collect();
                    let mut var = file.add_variable::<i32>(dim, &[dim.as_str()])?;
                    var.put_attribute("long_name", "day of year")?;
                    var.put_values(&days, ..)?;
                }
                Coord::Dates(dates) => {
                    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
                    let offsets: Vec<f64> = dates
                        .iter()
                        .map(|d| (*d - epoch).num_days() as f64)
                        .collect();
                    let mut var = file.add_variable::<f64>(dim, &[dim.as_str()])?;
                    var.put_attribute("units", TIME_UNITS)?;
                    var.put_attribute("calendar", "proleptic_gregorian")?;
                    var.put_values(&offsets, ..)?;
                }
                Coord::Index(_) => {}
            }
        }

        let dim_refs: Vec<&str> = array.dims().iter().map(String::as_str).collect();
        let mut var = file.add_variable::<f64>(array.name(), &dim_refs)?;
        var.put_attribute("_FillValue", FILL_VALUE)?;
        for (key, value) in array.attributes() {
            if key != "_FillValue" {
                var.put_attribute(key, value.as_str())?;
            }
        }

        let filled = array
            .data()
            .mapv(|v| if v.is_nan() { FILL_VALUE } else { v });
        var.put(filled.view(), ..)?;

        // Add history attribute
        file.add_attribute(
            "history",
            format!("Created by climqc on {}", Utc::now().to_rfc3339()),
        )?;

        log::info!(
            "Wrote '{}' to {}",
            array.name(),
            self.output_path.display()
        );
        Ok(())
    }
}
