//! Area-weighted spatial means
//!
//! Grid cells of a regular latitude-longitude grid shrink towards the poles,
//! so spatial means weight every cell by the cosine of its latitude. Missing
//! values do not contribute weight.

use crate::errors::{ClimQcError, Result};
use crate::labeled::{Coord, LabeledArray, LandMask};
use ndarray::{Array2, ArrayD};

pub const LAT: &str = "lat";
pub const LON: &str = "lon";

/// Cosine of latitude for each `lat` coordinate
pub fn lat_weights<T>(array: &LabeledArray<T>) -> Result<Vec<f64>> {
    match array.coord(LAT) {
        Some(Coord::Values(lats)) => Ok(lats.iter().map(|lat| lat.to_radians().cos()).collect()),
        Some(_) => Err(ClimQcError::InvalidCoordinate {
            dim: LAT.to_string(),
            message: "latitude weights need numeric coordinates".to_string(),
        }),
        None => Err(ClimQcError::DimensionNotFound {
            var: array.name().to_string(),
            dim: LAT.to_string(),
        }),
    }
}

/// Latitude-weighted mean over `lat` and `lon`
pub fn global_mean(array: &LabeledArray<f64>) -> Result<LabeledArray<f64>> {
    land_mean(array, None)
}

/// Latitude-weighted mean over `lat` and `lon`, additionally weighted by the
/// land fraction when a landmask is given
///
/// # Errors
///
/// Fails if `array` lacks `lat` or `lon`, or if the landmask grid differs.
pub fn land_mean(
    array: &LabeledArray<f64>,
    land_mask: Option<&LandMask>,
) -> Result<LabeledArray<f64>> {
    let lat_axis = array.axis_of(LAT)?;
    let lon_axis = array.axis_of(LON)?;
    let cos_lat = lat_weights(array)?;
    let n_lon = array.shape()[lon_axis];

    let mut weights = Array2::from_shape_fn((cos_lat.len(), n_lon), |(i, _)| cos_lat[i]);
    if let Some(land) = land_mask {
        if land.coord(LAT) != array.coord(LAT) || land.coord(LON) != array.coord(LON) {
            return Err(ClimQcError::AxisMismatch {
                message: format!(
                    "landmask '{}' is not on the grid of '{}'",
                    land.name(),
                    array.name()
                ),
            });
        }
        let land_lat = land.axis_of(LAT)?;
        let land_lon = land.axis_of(LON)?;
        if land.ndim() != 2 {
            return Err(ClimQcError::AxisMismatch {
                message: format!("landmask '{}' must only span lat and lon", land.name()),
            });
        }
        weights.indexed_iter_mut().for_each(|((i, j), w)| {
            let mut idx = [0; 2];
            idx[land_lat] = i;
            idx[land_lon] = j;
            let fraction = land.data()[&idx[..]];
            *w *= if fraction.is_nan() { 0.0 } else { fraction };
        });
    }

    let keep: Vec<usize> = (0..array.ndim())
        .filter(|&a| a != lat_axis && a != lon_axis)
        .collect();
    let out_shape: Vec<usize> = keep.iter().map(|&a| array.shape()[a]).collect();

    let mut weighted_sum = ArrayD::<f64>::zeros(out_shape.clone());
    let mut weight_total = ArrayD::<f64>::zeros(out_shape);
    let mut rest = vec![0; keep.len()];
    for (idx, &value) in array.data().indexed_iter() {
        if value.is_nan() {
            continue;
        }
        let w = weights[[idx[lat_axis], idx[lon_axis]]];
        for (r, &a) in rest.iter_mut().zip(&keep) {
            *r = idx[a];
        }
        weighted_sum[&rest[..]] += w * value;
        weight_total[&rest[..]] += w;
    }

    let mean = ndarray::Zip::from(&weighted_sum)
        .and(&weight_total)
        .map_collect(|&s, &w| if w > 0.0 { s / w } else { f64::NAN });

    let dims = keep.iter().map(|&a| array.dims()[a].clone()).collect();
    let coords = keep.iter().map(|&a| array.coords()[a].clone()).collect();
    let mut out = LabeledArray::new(array.name(), mean, dims, coords)?;
    for (key, value) in array.attributes() {
        out.set_attribute(key, value);
    }
    Ok(out)
}
