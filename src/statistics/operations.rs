//! Core reduction operations and traits
//!
//! This module defines the reductions a [`LabeledArray`] supports along a named
//! dimension. Numeric reductions skip missing values the way the validity
//! filters expect; mask reductions count and locate retained entries.

use super::parallel;
use crate::errors::Result;
use crate::labeled::LabeledArray;
use ndarray::ArrayView1;

/// Supported numeric reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Sum of present values
    Sum,
    /// Arithmetic mean of present values
    Mean,
    /// Minimum present value
    Min,
    /// Maximum present value
    Max,
}

impl ReduceOp {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "minimum",
            Self::Max => "maximum",
        }
    }
}

/// Reductions of a numeric labeled array along a named dimension
pub trait NamedReduction {
    /// Reduce `dim` away with `op`, skipping missing values
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist.
    fn reduce(&self, dim: &str, op: ReduceOp) -> Result<LabeledArray<f64>>;

    /// Position of the smallest present value along `dim`
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist.
    fn argmin(&self, dim: &str) -> Result<LabeledArray<Option<usize>>>;
}

impl NamedReduction for LabeledArray<f64> {
    fn reduce(&self, dim: &str, op: ReduceOp) -> Result<LabeledArray<f64>> {
        let axis = self.axis_of(dim)?;
        let lane_fn: fn(ArrayView1<'_, f64>) -> f64 = match op {
            ReduceOp::Sum => parallel::nan_sum,
            ReduceOp::Mean => parallel::nan_mean,
            ReduceOp::Min => parallel::nan_min,
            ReduceOp::Max => parallel::nan_max,
        };

        log::debug!("Computing {} of '{}' over '{dim}'", op.as_str(), self.name());
        let data = parallel::reduce_lanes(self.data().view(), axis, &lane_fn);
        Ok(self.relabel_without(axis, data))
    }

    fn argmin(&self, dim: &str) -> Result<LabeledArray<Option<usize>>> {
        let axis = self.axis_of(dim)?;
        let data = parallel::reduce_lanes(self.data().view(), axis, &parallel::nan_argmin);
        Ok(self.relabel_without(axis, data))
    }
}

/// Reductions of a boolean mask along a named dimension
pub trait MaskReduction {
    /// Number of `true` entries along `dim`
    fn count(&self, dim: &str) -> Result<LabeledArray<usize>>;

    /// Whether any entry along `dim` is `true`
    fn any(&self, dim: &str) -> Result<LabeledArray<bool>>;

    /// Whether every entry along `dim` is `true` (vacuously true when empty)
    fn all(&self, dim: &str) -> Result<LabeledArray<bool>>;

    /// Position of the last `true` entry along `dim`
    fn last_true(&self, dim: &str) -> Result<LabeledArray<Option<usize>>>;
}

impl MaskReduction for LabeledArray<bool> {
    fn count(&self, dim: &str) -> Result<LabeledArray<usize>> {
        let axis = self.axis_of(dim)?;
        let data = parallel::reduce_lanes(self.data().view(), axis, &parallel::count_true);
        Ok(self.relabel_without(axis, data))
    }

    fn any(&self, dim: &str) -> Result<LabeledArray<bool>> {
        let axis = self.axis_of(dim)?;
        let data = parallel::reduce_lanes(self.data().view(), axis, &parallel::any_true);
        Ok(self.relabel_without(axis, data))
    }

    fn all(&self, dim: &str) -> Result<LabeledArray<bool>> {
        let axis = self.axis_of(dim)?;
        let data = parallel::reduce_lanes(self.data().view(), axis, &parallel::all_true);
        Ok(self.relabel_without(axis, data))
    }

    fn last_true(&self, dim: &str) -> Result<LabeledArray<Option<usize>>> {
        let axis = self.axis_of(dim)?;
        let data = parallel::reduce_lanes(self.data().view(), axis, &parallel::last_true);
        Ok(self.relabel_without(axis, data))
    }
}
