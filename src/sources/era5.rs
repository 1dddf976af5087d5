//! ERA5 reanalysis

use super::open_variable;
use crate::errors::Result;
use crate::labeled::LandMask;
use std::path::Path;

/// Latitude band kept when Antarctica is removed (ERA5 latitudes descend)
pub const SEL_LAT: (f64, f64) = (84.0, -58.0);

/// Read the time-invariant land-sea mask `lsm`.
///
/// Length-one axes (the single time step) are dropped.
pub fn read_landmask(path: &Path, remove_antarctica: bool) -> Result<LandMask> {
    let land_mask = open_variable(path, "lsm")?.squeeze();

    if remove_antarctica {
        land_mask.sel_range("lat", SEL_LAT.0, SEL_LAT.1)
    } else {
        Ok(land_mask)
    }
}
