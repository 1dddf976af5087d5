//! Grid validity filters
//!
//! Predicates deciding, per grid cell and per year, whether a series of
//! observations is complete enough to keep. All filters mask values (set them
//! to `NaN`); none of them removes timesteps or grid cells.
//!
//! Two families are provided:
//!
//! - [`annual_data_availability`] and [`require_valid`] for daily data that is
//!   aggregated to annual values (e.g. annual maxima of Berkeley Earth Tmax).
//! - [`find_valid_gridpoints_dunn`] and [`valid_for_globmean`] for annual
//!   climate-extremes indices, after Dunn et al. (2020, HadEX3), Figure 2.

use crate::errors::{check_fraction, ClimQcError, Result};
use crate::labeled::{AnnualAvailability, Coord, GriddedSeries, ValidityMask};
use crate::statistics::{parallel, MaskReduction};
use std::fmt;
use std::ops::RangeInclusive;

/// Years considered by the Dunn et al. criteria
pub const DUNN_YEARS: RangeInclusive<i32> = 1950..=2018;

/// Most recent year a grid cell must still report
pub const DUNN_LAST_YEAR: i32 = 2009;

/// Fraction of valid years required to keep a grid cell
pub const DUNN_MINIMUM_VALID: f64 = 0.66;

/// Fraction of valid years required for global-mean computations
pub const GLOBMEAN_MINIMUM_VALID: f64 = 0.9;

/// Criteria of [`find_valid_gridpoints_dunn`]
#[derive(Debug, Clone, PartialEq)]
pub struct DunnCriteria {
    /// Inclusive range of years to consider
    pub years: RangeInclusive<i32>,
    /// Latest allowed year of the last valid value; `None` skips the check
    pub last_year_floor: Option<i32>,
    /// Required fraction of valid years within `years`
    pub minimum_valid: f64,
}

impl Default for DunnCriteria {
    fn default() -> Self {
        Self {
            years: DUNN_YEARS,
            last_year_floor: Some(DUNN_LAST_YEAR),
            minimum_valid: DUNN_MINIMUM_VALID,
        }
    }
}

/// Share of previously valid grid cells removed by one filtering step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub label: &'static str,
    pub percent_removed: f64,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} removed {:0.2} % valid gridpoints",
            self.label, self.percent_removed
        )
    }
}

/// Filtered series together with the per-step diagnostics
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub data: GriddedSeries,
    pub steps: Vec<StepReport>,
}

/// Fraction of days that have data, per year and grid cell.
///
/// The number of days of a year is the largest day-of-year observed in it,
/// so leap years count 366 days.
///
/// # Errors
///
/// Fails if `series` has no temporal axis of calendar dates.
pub fn annual_data_availability(series: &GriddedSeries) -> Result<AnnualAvailability> {
    let dim = series.temporal_dim()?.to_string();
    let dayofyear = series.dayofyear(&dim)?;
    let groups = series.year_groups(&dim)?;

    let years: Vec<i32> = groups.iter().map(|(year, _)| *year).collect();
    let n_days: Vec<u32> = groups
        .iter()
        .map(|(_, range)| dayofyear[range.clone()].iter().copied().max().unwrap_or(0))
        .collect();
    let ranges: Vec<_> = groups.into_iter().map(|(_, range)| range).collect();

    let counts = series.notnull().group_reduce(
        &dim,
        &ranges,
        "year",
        Coord::Years(years),
        parallel::count_true,
    )?;

    let axis = counts.axis_of("year")?;
    #[allow(clippy::cast_precision_loss)]
    let mut fraction = counts.data().mapv(|c| c as f64);
    for (mut lane, &days) in fraction.axis_iter_mut(ndarray::Axis(axis)).zip(&n_days) {
        // a year without days is undefined rather than a division by zero
        lane.mapv_inplace(|c| if days == 0 { f64::NAN } else { c / f64::from(days) });
    }

    log::debug!(
        "Computed data availability of '{}' for {} years",
        series.name(),
        n_days.len()
    );

    Ok(counts.relabel(fraction))
}

/// Require `valid_days` of data per year and `valid_years` of valid years.
///
/// A year is kept where its availability strictly exceeds `valid_days`. A grid
/// cell is kept (for all its years) only if the number of kept years strictly
/// exceeds `n_years * valid_years`; otherwise it is masked entirely.
///
/// # Arguments
///
/// * `data` - Annual data with a `year` dimension
/// * `availability` - Fraction of valid days, from [`annual_data_availability`]
/// * `valid_days` - Fraction of valid days required each year (0..=1)
/// * `valid_years` - Fraction of valid years required per grid cell (0..=1)
///
/// # Errors
///
/// Returns [`ClimQcError::InvalidThreshold`] for thresholds outside 0..=1 and
/// [`ClimQcError::AxisMismatch`] if `data` and `availability` are not aligned.
pub fn require_valid(
    data: &GriddedSeries,
    availability: &AnnualAvailability,
    valid_days: f64,
    valid_years: f64,
) -> Result<GriddedSeries> {
    check_fraction("valid_days", valid_days)?;
    check_fraction("valid_years", valid_years)?;
    data.ensure_aligned(availability)?;

    let data = data.mask_where(&availability.gt(valid_days))?;

    let n_years = data.shape()[data.axis_of("year")?];
    #[allow(clippy::cast_precision_loss)]
    let required = n_years as f64 * valid_years;

    let n_valid = data.notnull().count("year")?;
    let keep = n_valid.map(|&n| (n as f64) > required);

    data.mask_where(&keep)
}

/// Find valid grid points after Dunn et al. (2020), Figure 2a.
///
/// 1. restrict to `criteria.years`
/// 2. the last valid value must be in `criteria.last_year_floor` or later
/// 3. at least `criteria.minimum_valid` of the years must be valid
///
/// Cells failing a criterion are masked for all years. The returned data covers
/// the selected years only.
///
/// # Errors
///
/// Returns [`ClimQcError::InvalidThreshold`] if `minimum_valid` is outside 0..=1
/// and an error if the series has no temporal axis.
pub fn find_valid_gridpoints_dunn(
    series: &GriddedSeries,
    criteria: &DunnCriteria,
) -> Result<FilterOutcome> {
    check_fraction("minimum_valid", criteria.minimum_valid)?;

    let dim = series.temporal_dim()?.to_string();
    let mut data = series.sel_years(&dim, &criteria.years)?;

    let notnull = data.notnull();
    let atleast_one = notnull.any(&dim)?;
    let mut steps = Vec::with_capacity(2);

    if let Some(floor) = criteria.last_year_floor {
        let condition = reaches_year(&data, &notnull, &dim, floor)?;
        data = data.mask_where(&condition)?;
        steps.push(invalidated(&atleast_one, &condition, "end date"));
    }

    let condition = minimum_valid_condition(&notnull, &dim, criteria.minimum_valid)?;
    data = data.mask_where(&condition)?;
    steps.push(invalidated(&atleast_one, &condition, "minimum_valid"));

    Ok(FilterOutcome { data, steps })
}

/// Grid points valid for computing global means.
///
/// As [`find_valid_gridpoints_dunn`] without the end-date criterion; Dunn et
/// al. require at least 90 % valid years for the global mean.
///
/// # Errors
///
/// Returns [`ClimQcError::InvalidThreshold`] if `minimum_valid` is outside 0..=1
/// and an error if the series has no temporal axis.
pub fn valid_for_globmean(
    series: &GriddedSeries,
    years: &RangeInclusive<i32>,
    minimum_valid: f64,
) -> Result<FilterOutcome> {
    let criteria = DunnCriteria {
        years: years.clone(),
        last_year_floor: None,
        minimum_valid,
    };
    find_valid_gridpoints_dunn(series, &criteria)
}

/// Cells whose last valid value lies in `floor` or later; cells without any
/// valid value fail.
fn reaches_year(
    data: &GriddedSeries,
    notnull: &ValidityMask,
    dim: &str,
    floor: i32,
) -> Result<ValidityMask> {
    let years = data
        .coord(dim)
        .and_then(Coord::years)
        .ok_or_else(|| ClimQcError::InvalidCoordinate {
            dim: dim.to_string(),
            message: "end-date criterion needs dates or years".to_string(),
        })?;

    let last = notnull.last_true(dim)?;
    Ok(last.map(|idx| idx.is_some_and(|i| years[i] >= floor)))
}

/// Cells whose fraction of valid timesteps is at least `minimum_valid`; an
/// empty time axis yields `NaN`, which fails.
fn minimum_valid_condition(
    notnull: &ValidityMask,
    dim: &str,
    minimum_valid: f64,
) -> Result<ValidityMask> {
    let n_time = notnull.shape()[notnull.axis_of(dim)?];
    let counts = notnull.count(dim)?;

    #[allow(clippy::cast_precision_loss)]
    let valid_fraction = counts.map(|&n| {
        if n_time == 0 {
            f64::NAN
        } else {
            n as f64 / n_time as f64
        }
    });

    Ok(valid_fraction.ge(minimum_valid))
}

/// Percentage of cells with data that `condition` rejects, logged at info level.
fn invalidated(valid: &ValidityMask, condition: &ValidityMask, label: &'static str) -> StepReport {
    let n_valid = valid.count_true();
    let n_invalidated = valid
        .data()
        .iter()
        .zip(condition.data().iter())
        .filter(|&(&v, &c)| v && !c)
        .count();

    #[allow(clippy::cast_precision_loss)]
    let percent_removed = if n_valid == 0 {
        0.0
    } else {
        n_invalidated as f64 / n_valid as f64 * 100.0
    };

    let report = StepReport {
        label,
        percent_removed,
    };
    log::info!("{report}");
    report
}
