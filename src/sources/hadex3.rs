//! HadEX3 climate-extremes indices
//!
//! HadEX3 ships one file per index on a 1.25° × 1.875° grid with annual
//! (`Ann`) and monthly (`Jan` ... `Dec`) variables.

use super::open_variable;
use crate::errors::{ClimQcError, Result};
use crate::labeled::{GriddedSeries, LandMask};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Latest released version of HadEX3
pub const CURRENT_VERSION: &str = "3.0.4";

/// Index abbreviations and their long names
const INDICES: &[(&str, &str)] = &[
    ("TXx", "maximum Tmax"),
    ("TXn", "minimum Tmax"),
    ("TNx", "maximum Tmin"),
    ("TNn", "minimum Tmin"),
    ("TX90p", "warm days"),
    ("TX10p", "cool days"),
    ("TN90p", "warm nights"),
    ("TN10p", "cool nights"),
    ("TR", "tropical nights"),
    ("SU", "summer days"),
    ("FD", "frost days"),
    ("ID", "ice days"),
    ("CSDI", "cool spell duration"),
    ("WSDI", "warm spell duration"),
    ("DTR", "diurnal temperature range"),
    ("GSL", "growing season length"),
    ("CDD", "consecutive dry days"),
    ("CWD", "consecutive wet days"),
    ("PRCPTOT", "total precipitation"),
    ("R10mm", "precip in >10mm days"),
    ("R20mm", "precip in >20mm days"),
    ("Rx1day", "maximum 1 day total"),
    ("Rx5day", "maximum 5 day total"),
    ("R95p", "amount in very wet days"),
    ("R99p", "amount in extremely wet days"),
    ("R95pTOT", "fraction in very wet days"),
    ("R99pTOT", "fraction in extremely wet days"),
    ("SDII", "specific daily intensity"),
];

/// Which HadEX3 release, reference climatology and variable to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HadEx3 {
    pub version: String,
    /// Reference period of the percentile indices, `61-90` or `81-10`
    pub climatology: String,
    /// Variable inside the file, `Ann` or a month such as `Jan`
    pub variable: String,
}

impl Default for HadEx3 {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            climatology: "61-90".to_string(),
            variable: "Ann".to_string(),
        }
    }
}

impl HadEx3 {
    /// Long name of an index abbreviation such as `TXx`
    pub fn describe(abbrev: &str) -> Option<&'static str> {
        INDICES
            .iter()
            .find(|(a, _)| *a == abbrev)
            .map(|(_, long_name)| *long_name)
    }

    /// All known index abbreviations
    pub fn indices() -> impl Iterator<Item = &'static str> {
        INDICES.iter().map(|(a, _)| *a)
    }

    /// Location of a raw index file below `root`, following the release layout
    /// `v{version}/raw/HadEX3_{index}_{from}-{to}_ADW_{climatology}_1.25x1.875deg.nc`
    pub fn raw_path(&self, root: &Path, index: &str, years: &RangeInclusive<i32>) -> PathBuf {
        root.join(format!("v{}", self.version))
            .join("raw")
            .join(format!(
                "HadEX3_{index}_{}-{}_ADW_{}_1.25x1.875deg.nc",
                years.start(),
                years.end(),
                self.climatology
            ))
    }

    /// Read the configured variable of an index file as an annual series.
    ///
    /// Day-count indices such as CDD carry `days` as units; the attribute is
    /// dropped so the values are not mistaken for durations.
    ///
    /// # Errors
    ///
    /// Fails if the variable is missing or the time axis holds more than one
    /// entry per year (e.g. a monthly variable).
    pub fn read_index(&self, path: &Path) -> Result<GriddedSeries> {
        let mut series = open_variable(path, &self.variable)?;
        if matches!(
            series.attributes().get("units").map(String::as_str),
            Some("seconds" | "days")
        ) {
            series.remove_attribute("units");
        }

        let series = series.to_annual()?;
        if series.temporal_dim().is_err() {
            return Err(ClimQcError::InvalidCoordinate {
                dim: "time".to_string(),
                message: format!("'{}' has no annual time axis", self.variable),
            });
        }
        Ok(series)
    }

    /// Read the `landmask` variable of the HadEX3 land-sea mask file
    pub fn read_landmask(&self, path: &Path) -> Result<LandMask> {
        Ok(open_variable(path, "landmask")?.squeeze())
    }
}
