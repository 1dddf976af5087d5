//! Landmask cleaning
//!
//! Land cells that never receive a single observation distort land means;
//! these helpers find them and drop them from a landmask.

use crate::errors::Result;
use crate::labeled::{GriddedSeries, LandMask, ValidityMask};
use crate::statistics::MaskReduction;

/// Grid points marked as land that never have any data.
///
/// `true` where every timestep of `series` is missing and `land_mask > 0`.
///
/// # Errors
///
/// Fails if `series` has no temporal axis or if the spatial axes of `series`
/// and `land_mask` differ.
pub fn land_without_any_data(series: &GriddedSeries, land_mask: &LandMask) -> Result<ValidityMask> {
    let dim = series.temporal_dim()?;
    let never_valid = series.isnull().all(dim)?;

    never_valid.and(&land_mask.gt(0.0))
}

/// Remove grid points that never have any data from the landmask.
///
/// Affected cells are set to 0; all others keep their value, so the mask can
/// only shrink.
///
/// # Errors
///
/// See [`land_without_any_data`].
pub fn clean_landmask(series: &GriddedSeries, land_mask: &LandMask) -> Result<LandMask> {
    let has_no_data_on_land = land_without_any_data(series, land_mask)?;

    let n_removed = has_no_data_on_land.count_true();
    if n_removed > 0 {
        log::info!(
            "Removed {n_removed} land grid points without data from '{}'",
            land_mask.name()
        );
    }

    land_mask.where_or(&has_no_data_on_land.not(), 0.0)
}
