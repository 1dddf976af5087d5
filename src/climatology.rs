//! Day-of-year climatologies
//!
//! Berkeley Earth distributes daily temperatures as anomalies plus a
//! 365-day climatology. Annual extremes such as TXx need absolute values, so
//! the seasonal cycle is added back to every day.

use crate::errors::{ClimQcError, Result};
use crate::labeled::{Coord, GriddedSeries, LabeledArray};
use crate::statistics::{NamedReduction, ReduceOp};
use ndarray::{Axis, Zip};

/// Name of the day-of-year dimension
pub const DAYOFYEAR: &str = "dayofyear";

/// Add a 366th day to a 365-day climatology, for leap years.
///
/// The new day is the mean of 1 January and 31 December (ignoring a missing
/// one of the two). A `day_number` dimension is renamed to `dayofyear`.
///
/// # Errors
///
/// Returns [`ClimQcError::AxisMismatch`] if the day axis does not hold 365 days.
pub fn extend_climatology(climatology: &LabeledArray<f64>) -> Result<LabeledArray<f64>> {
    let climatology = climatology.clone().rename_dim("day_number", DAYOFYEAR);
    let axis = climatology.axis_of(DAYOFYEAR)?;

    let n_days = climatology.shape()[axis];
    if n_days != 365 {
        return Err(ClimQcError::AxisMismatch {
            message: format!("climatology must hold 365 days, found {n_days}"),
        });
    }

    let c366 = climatology
        .select_indices(axis, &[0, n_days - 1])
        .reduce(DAYOFYEAR, ReduceOp::Mean)?;

    let c366 = c366.into_data().insert_axis(Axis(axis));
    let data = ndarray::concatenate(Axis(axis), &[climatology.data().view(), c366.view()])?;

    climatology.relabel_axis(
        axis,
        DAYOFYEAR,
        Coord::DaysOfYear((1..=366).collect()),
        data,
    )
}

/// Add the climatology back to daily anomalies.
///
/// Every timestep receives the climatological value of its day-of-year;
/// 31 December of a leap year uses the synthesized day 366.
///
/// # Errors
///
/// Fails if `series` has no date axis, if the climatology cannot be extended,
/// or if the non-temporal axes of both arrays differ.
pub fn add_climatology(
    series: &GriddedSeries,
    climatology: &LabeledArray<f64>,
) -> Result<GriddedSeries> {
    let climatology = extend_climatology(climatology)?;

    let dim = series.temporal_dim()?;
    let time_axis = series.axis_of(dim)?;
    let dayofyear = series.dayofyear(dim)?;
    let clim_axis = climatology.axis_of(DAYOFYEAR)?;

    let spatial = |dims: &[String], coords: &[Coord], skip: usize| {
        dims.iter()
            .zip(coords)
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, (d, c))| (d.clone(), c.clone()))
            .collect::<Vec<_>>()
    };
    if spatial(series.dims(), series.coords(), time_axis)
        != spatial(climatology.dims(), climatology.coords(), clim_axis)
    {
        return Err(ClimQcError::AxisMismatch {
            message: format!(
                "climatology axes [{}] do not match '{}' axes [{}]",
                climatology.dims().join(", "),
                series.name(),
                series.dims().join(", ")
            ),
        });
    }

    let mut out = series.data().clone();
    for (mut slab, doy) in out.axis_iter_mut(Axis(time_axis)).zip(dayofyear) {
        let seasonal = climatology.data().index_axis(Axis(clim_axis), doy as usize - 1);
        Zip::from(&mut slab)
            .and(&seasonal)
            .for_each(|value, &clim| *value += clim);
    }

    Ok(series.relabel(out))
}
