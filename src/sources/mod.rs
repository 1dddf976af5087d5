//! Readers for the supported climate datasets
//!
//! Each reader takes an explicit file path; locating files is left to the
//! caller. Coordinates come back with the common names `time`, `lat`, `lon`.
//!
//! - [`berkeley`]: Berkeley Earth daily gridded temperature
//! - [`era5`]: ERA5 time-invariant land-sea mask
//! - [`hadex3`]: HadEX3 annual climate-extremes indices

pub mod berkeley;
pub mod era5;
pub mod hadex3;

pub use hadex3::HadEx3;

use crate::errors::Result;
use crate::labeled::LabeledArray;
use crate::netcdf_io::read_variable;
use std::path::Path;

/// Southernmost latitude kept when Antarctica is removed
pub const ANTARCTICA_LAT: f64 = -60.0;

/// Open `path` and read one variable
pub(crate) fn open_variable(path: &Path, var_name: &str) -> Result<LabeledArray<f64>> {
    log::debug!("Opening {} for '{var_name}'", path.display());
    let file = netcdf::open(path)?;
    read_variable(&file, var_name)
}
