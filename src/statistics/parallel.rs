//! Parallel computation implementations for named-dimension reductions
//!
//! Every reduction is expressed as a function of one 1-D lane along the
//! reduced axis. Lanes are independent, so they are mapped on the rayon pool.

use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis, Zip};

/// Reduce every lane along `axis` with `f`, in parallel.
///
/// The result has the shape of `data` with `axis` removed; lanes are visited in
/// the standard (row-major) order of the remaining axes.
pub fn reduce_lanes<T, U, F>(data: ArrayViewD<'_, T>, axis: usize, f: &F) -> ArrayD<U>
where
    T: Sync,
    U: Send,
    F: Fn(ArrayView1<'_, T>) -> U + Sync,
{
    log::trace!(
        "Reducing axis {axis} of shape {:?} across {} threads",
        data.shape(),
        rayon::current_num_threads()
    );

    Zip::from(data.lanes(Axis(axis))).par_map_collect(|lane| f(lane))
}

/// Sum of the present values; zero for an all-missing lane
pub fn nan_sum(lane: ArrayView1<'_, f64>) -> f64 {
    lane.iter().filter(|v| !v.is_nan()).sum()
}

/// Mean of the present values; `NaN` for an all-missing lane
pub fn nan_mean(lane: ArrayView1<'_, f64>) -> f64 {
    let (sum, count) = lane
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0_usize), |(s, n), &v| (s + v, n + 1));

    if count > 0 {
        sum / count as f64
    } else {
        f64::NAN // Return NaN if all values were missing
    }
}

/// Maximum of the present values; `NaN` for an all-missing lane
pub fn nan_max(lane: ArrayView1<'_, f64>) -> f64 {
    let result = lane
        .iter()
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));

    // NEG_INFINITY survives only when no value was present
    if result == f64::NEG_INFINITY && !lane.iter().any(|&v| v == f64::NEG_INFINITY) {
        f64::NAN
    } else {
        result
    }
}

/// Minimum of the present values; `NaN` for an all-missing lane
pub fn nan_min(lane: ArrayView1<'_, f64>) -> f64 {
    let result = lane
        .iter()
        .filter(|v| !v.is_nan())
        .fold(f64::INFINITY, |acc, &v| acc.min(v));

    if result == f64::INFINITY && !lane.iter().any(|&v| v == f64::INFINITY) {
        f64::NAN
    } else {
        result
    }
}

/// Position of the smallest present value (first on ties); `None` if all missing
pub fn nan_argmin(lane: ArrayView1<'_, f64>) -> Option<usize> {
    lane.iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b <= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Number of `true` entries
pub fn count_true(lane: ArrayView1<'_, bool>) -> usize {
    lane.iter().filter(|&&v| v).count()
}

/// Whether any entry is `true`
pub fn any_true(lane: ArrayView1<'_, bool>) -> bool {
    lane.iter().any(|&v| v)
}

/// Whether every entry is `true`
pub fn all_true(lane: ArrayView1<'_, bool>) -> bool {
    lane.iter().all(|&v| v)
}

/// Position of the last `true` entry
pub fn last_true(lane: ArrayView1<'_, bool>) -> Option<usize> {
    lane.iter().rposition(|&v| v)
}
