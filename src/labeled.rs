//! Labeled N-dimensional arrays
//!
//! [`LabeledArray`] pairs an [`ndarray::ArrayD`] with one name and one
//! coordinate vector per axis. It provides the small set of operations the
//! validity filters are written against: null tests, coordinate selection,
//! shape-preserving masking and grouping along a temporal axis. Reductions
//! along a named dimension live in [`crate::statistics`].
//!
//! Missing values in floating point arrays are `NaN`. Masking never removes
//! entries, it only replaces them.

use crate::errors::{ClimQcError, Result};
use chrono::{Datelike, NaiveDate};
use ndarray::{ArrayD, ArrayView1, Axis, Slice, Zip};
use std::collections::BTreeMap;
use std::ops::{Range, RangeInclusive};

/// A gridded series of observations, `NaN` where missing
pub type GriddedSeries = LabeledArray<f64>;

/// Land indicator over the spatial grid (0 = not land)
pub type LandMask = LabeledArray<f64>;

/// Boolean mask, `true` where a value is retained
pub type ValidityMask = LabeledArray<bool>;

/// Fraction of days with data per (year, cell)
pub type AnnualAvailability = LabeledArray<f64>;

/// Coordinate values along one axis
#[derive(Debug, Clone, PartialEq)]
pub enum Coord {
    /// Numeric coordinate such as latitude or longitude
    Values(Vec<f64>),
    /// Calendar dates of a daily (or finer) time axis
    Dates(Vec<NaiveDate>),
    /// Integer years of an annual time axis
    Years(Vec<i32>),
    /// 1-based day-of-year ordinals of a climatology
    DaysOfYear(Vec<u32>),
    /// Axis without coordinate variable, only its length is known
    Index(usize),
}

impl Coord {
    pub fn len(&self) -> usize {
        match self {
            Coord::Values(v) => v.len(),
            Coord::Dates(v) => v.len(),
            Coord::Years(v) => v.len(),
            Coord::DaysOfYear(v) => v.len(),
            Coord::Index(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the coordinate is a time axis (dates or years)
    pub fn is_temporal(&self) -> bool {
        matches!(self, Coord::Dates(_) | Coord::Years(_))
    }

    /// Year of every entry, for temporal coordinates
    pub fn years(&self) -> Option<Vec<i32>> {
        match self {
            Coord::Dates(dates) => Some(dates.iter().map(|d| d.year()).collect()),
            Coord::Years(years) => Some(years.clone()),
            _ => None,
        }
    }

    /// Coordinate restricted to the given positions
    pub fn select(&self, indices: &[usize]) -> Coord {
        match self {
            Coord::Values(v) => Coord::Values(indices.iter().map(|&i| v[i]).collect()),
            Coord::Dates(v) => Coord::Dates(indices.iter().map(|&i| v[i]).collect()),
            Coord::Years(v) => Coord::Years(indices.iter().map(|&i| v[i]).collect()),
            Coord::DaysOfYear(v) => Coord::DaysOfYear(indices.iter().map(|&i| v[i]).collect()),
            Coord::Index(_) => Coord::Index(indices.len()),
        }
    }

    fn check(&self, dim: &str) -> Result<()> {
        let ordered = match self {
            Coord::Values(v) => {
                v.windows(2).all(|w| w[0] < w[1]) || v.windows(2).all(|w| w[0] > w[1])
            }
            Coord::Dates(v) => v.windows(2).all(|w| w[0] < w[1]),
            Coord::Years(v) => v.windows(2).all(|w| w[0] < w[1]),
            Coord::DaysOfYear(v) => v.windows(2).all(|w| w[0] < w[1]),
            Coord::Index(_) => true,
        };

        if ordered {
            Ok(())
        } else {
            Err(ClimQcError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "values must be strictly monotonic without duplicates".to_string(),
            })
        }
    }
}

/// N-dimensional array with named axes and coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray<T> {
    name: String,
    data: ArrayD<T>,
    dims: Vec<String>,
    coords: Vec<Coord>,
    attributes: BTreeMap<String, String>,
}

impl<T> LabeledArray<T> {
    /// Create a labeled array, validating dimension names and coordinates
    ///
    /// # Errors
    ///
    /// Returns [`ClimQcError::AxisMismatch`] if the number of dimension names or
    /// coordinates differs from the array rank, or a coordinate has the wrong
    /// length, and [`ClimQcError::InvalidCoordinate`] for unordered coordinates.
    pub fn new(
        name: impl Into<String>,
        data: ArrayD<T>,
        dims: Vec<String>,
        coords: Vec<Coord>,
    ) -> Result<Self> {
        if dims.len() != data.ndim() || coords.len() != data.ndim() {
            return Err(ClimQcError::AxisMismatch {
                message: format!(
                    "array of rank {} labeled with {} dimension names and {} coordinates",
                    data.ndim(),
                    dims.len(),
                    coords.len()
                ),
            });
        }

        for (i, (dim, coord)) in dims.iter().zip(&coords).enumerate() {
            if dims[..i].contains(dim) {
                return Err(ClimQcError::AxisMismatch {
                    message: format!("dimension '{dim}' appears more than once"),
                });
            }
            if coord.len() != data.len_of(Axis(i)) {
                return Err(ClimQcError::AxisMismatch {
                    message: format!(
                        "coordinate '{dim}' has {} values for an axis of length {}",
                        coord.len(),
                        data.len_of(Axis(i))
                    ),
                });
            }
            coord.check(dim)?;
        }

        Ok(Self {
            name: name.into(),
            data,
            dims,
            coords,
            attributes: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<T> {
        self.data
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.remove(key)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Coordinate of a named dimension
    pub fn coord(&self, dim: &str) -> Option<&Coord> {
        self.dims.iter().position(|d| d == dim).map(|i| &self.coords[i])
    }

    /// Axis index of a named dimension
    ///
    /// # Errors
    ///
    /// Returns [`ClimQcError::DimensionNotFound`] if the dimension does not exist.
    pub fn axis_of(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| ClimQcError::DimensionNotFound {
                var: self.name.clone(),
                dim: dim.to_string(),
            })
    }

    /// Name of the first dimension carrying dates or years
    pub fn temporal_dim(&self) -> Result<&str> {
        self.dims
            .iter()
            .zip(&self.coords)
            .find(|(_, c)| c.is_temporal())
            .map(|(d, _)| d.as_str())
            .ok_or_else(|| ClimQcError::DimensionNotFound {
                var: self.name.clone(),
                dim: "time".to_string(),
            })
    }

    /// Rename a dimension; absent dimensions are left alone
    #[must_use]
    pub fn rename_dim(mut self, from: &str, to: &str) -> Self {
        if let Some(i) = self.dims.iter().position(|d| d == from) {
            self.dims[i] = to.to_string();
        }
        self
    }

    /// Same labels around new data of identical shape
    pub(crate) fn relabel<U>(&self, data: ArrayD<U>) -> LabeledArray<U> {
        debug_assert_eq!(data.shape(), self.data.shape());
        LabeledArray {
            name: self.name.clone(),
            data,
            dims: self.dims.clone(),
            coords: self.coords.clone(),
            attributes: self.attributes.clone(),
        }
    }

    /// Labels with one axis removed around data reduced along that axis
    pub(crate) fn relabel_without<U>(&self, axis: usize, data: ArrayD<U>) -> LabeledArray<U> {
        let mut dims = self.dims.clone();
        let mut coords = self.coords.clone();
        dims.remove(axis);
        coords.remove(axis);
        LabeledArray {
            name: self.name.clone(),
            data,
            dims,
            coords,
            attributes: self.attributes.clone(),
        }
    }

    /// Labels with one axis replaced around data of matching shape
    pub(crate) fn relabel_axis<U>(
        &self,
        axis: usize,
        dim: &str,
        coord: Coord,
        data: ArrayD<U>,
    ) -> Result<LabeledArray<U>> {
        let mut dims = self.dims.clone();
        let mut coords = self.coords.clone();
        dims[axis] = dim.to_string();
        coords[axis] = coord;
        let mut out = LabeledArray::new(self.name.clone(), data, dims, coords)?;
        out.attributes = self.attributes.clone();
        Ok(out)
    }

    /// Check that `other` shares dimension names, shape and coordinates
    pub fn ensure_aligned<U>(&self, other: &LabeledArray<U>) -> Result<()> {
        if self.dims != other.dims {
            return Err(ClimQcError::AxisMismatch {
                message: format!(
                    "'{}' has dimensions [{}] but '{}' has [{}]",
                    self.name,
                    self.dims.join(", "),
                    other.name,
                    other.dims.join(", ")
                ),
            });
        }
        if self.shape() != other.shape() {
            return Err(ClimQcError::AxisMismatch {
                message: format!(
                    "'{}' has shape {:?} but '{}' has shape {:?}",
                    self.name,
                    self.shape(),
                    other.name,
                    other.shape()
                ),
            });
        }
        if let Some(dim) = self
            .dims
            .iter()
            .zip(self.coords.iter().zip(&other.coords))
            .find(|(_, (a, b))| a != b)
            .map(|(d, _)| d)
        {
            return Err(ClimQcError::AxisMismatch {
                message: format!(
                    "coordinate '{dim}' differs between '{}' and '{}'",
                    self.name, other.name
                ),
            });
        }
        Ok(())
    }

    /// Contiguous index ranges of each calendar year along a temporal dimension
    pub fn year_groups(&self, dim: &str) -> Result<Vec<(i32, Range<usize>)>> {
        let axis = self.axis_of(dim)?;
        let years = self.coords[axis]
            .years()
            .ok_or_else(|| ClimQcError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "grouping by year needs dates or years".to_string(),
            })?;

        let mut groups: Vec<(i32, Range<usize>)> = Vec::new();
        for (i, year) in years.into_iter().enumerate() {
            match groups.last_mut() {
                Some((last, range)) if *last == year => range.end = i + 1,
                _ => groups.push((year, i..i + 1)),
            }
        }
        Ok(groups)
    }

    /// Replace the coordinate of a dimension
    ///
    /// # Errors
    ///
    /// Fails if the dimension does not exist or the coordinate has the wrong
    /// length or ordering.
    pub fn replace_coord(mut self, dim: &str, coord: Coord) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        if coord.len() != self.data.len_of(Axis(axis)) {
            return Err(ClimQcError::AxisMismatch {
                message: format!(
                    "coordinate '{dim}' has {} values for an axis of length {}",
                    coord.len(),
                    self.data.len_of(Axis(axis))
                ),
            });
        }
        coord.check(dim)?;
        self.coords[axis] = coord;
        Ok(self)
    }

    /// Relabel a date axis holding one entry per year as an integer-year axis
    ///
    /// Arrays without a date axis are returned unchanged.
    pub fn to_annual(mut self) -> Result<Self> {
        let Some(axis) = self.coords.iter().position(|c| matches!(c, Coord::Dates(_))) else {
            return Ok(self);
        };
        let years = self.coords[axis].years().unwrap_or_default();
        if years.windows(2).any(|w| w[0] == w[1]) {
            return Err(ClimQcError::InvalidCoordinate {
                dim: self.dims[axis].clone(),
                message: "more than one timestep per year, not an annual series".to_string(),
            });
        }
        self.coords[axis] = Coord::Years(years);
        Ok(self)
    }

    /// Day-of-year of each date along a daily temporal dimension
    pub fn dayofyear(&self, dim: &str) -> Result<Vec<u32>> {
        let axis = self.axis_of(dim)?;
        match &self.coords[axis] {
            Coord::Dates(dates) => Ok(dates.iter().map(|d| d.ordinal()).collect()),
            _ => Err(ClimQcError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "day-of-year needs calendar dates".to_string(),
            }),
        }
    }
}

impl<T: Clone> LabeledArray<T> {
    /// Keep only the given positions along an axis
    pub fn select_indices(&self, axis: usize, indices: &[usize]) -> Self {
        let mut coords = self.coords.clone();
        coords[axis] = coords[axis].select(indices);
        LabeledArray {
            name: self.name.clone(),
            data: self.data.select(Axis(axis), indices),
            dims: self.dims.clone(),
            coords,
            attributes: self.attributes.clone(),
        }
    }

    /// Select the entries of a temporal dimension whose year lies in `years`
    pub fn sel_years(&self, dim: &str, years: &RangeInclusive<i32>) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let coord_years = self.coords[axis]
            .years()
            .ok_or_else(|| ClimQcError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "selection by year needs dates or years".to_string(),
            })?;

        let indices: Vec<usize> = coord_years
            .iter()
            .enumerate()
            .filter(|(_, y)| years.contains(*y))
            .map(|(i, _)| i)
            .collect();

        Ok(self.select_indices(axis, &indices))
    }

    /// Select the entries of a numeric dimension between two bounds (inclusive,
    /// in either order, so descending latitudes work as well)
    pub fn sel_range(&self, dim: &str, from: f64, to: f64) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let Coord::Values(values) = &self.coords[axis] else {
            return Err(ClimQcError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "range selection needs numeric coordinates".to_string(),
            });
        };

        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let indices: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| (lo..=hi).contains(*v))
            .map(|(i, _)| i)
            .collect();

        Ok(self.select_indices(axis, &indices))
    }

    /// Drop all axes of length one
    #[must_use]
    pub fn squeeze(mut self) -> Self {
        for axis in (0..self.ndim()).rev() {
            if self.data.len_of(Axis(axis)) == 1 {
                self.data = self.data.index_axis_move(Axis(axis), 0);
                self.dims.remove(axis);
                self.coords.remove(axis);
            }
        }
        self
    }

    /// Element-wise map keeping all labels
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> LabeledArray<U> {
        self.relabel(self.data.map(f))
    }

    /// Keep values where `keep` is true and use `other` elsewhere.
    ///
    /// `keep` may span any subset of this array's dimensions and is broadcast
    /// over the rest. Shared dimensions must agree in length and coordinates.
    pub fn where_or(&self, keep: &ValidityMask, other: T) -> Result<Self> {
        let mut order = Vec::with_capacity(keep.ndim());
        for (dim, coord) in keep.dims.iter().zip(&keep.coords) {
            let axis = self.dims.iter().position(|d| d == dim).ok_or_else(|| {
                ClimQcError::AxisMismatch {
                    message: format!(
                        "mask dimension '{dim}' does not exist in '{}'",
                        self.name
                    ),
                }
            })?;
            if &self.coords[axis] != coord {
                return Err(ClimQcError::AxisMismatch {
                    message: format!(
                        "coordinate '{dim}' of the mask differs from '{}'",
                        self.name
                    ),
                });
            }
            order.push(axis);
        }

        // Permute the mask into this array's axis order, then add the missing axes.
        let mut perm: Vec<usize> = (0..order.len()).collect();
        perm.sort_by_key(|&i| order[i]);
        let mut view = keep.data.view().permuted_axes(perm);
        for axis in 0..self.ndim() {
            if !order.contains(&axis) {
                view = view.insert_axis(Axis(axis));
            }
        }
        let mask = view
            .broadcast(self.data.raw_dim())
            .ok_or_else(|| ClimQcError::AxisMismatch {
                message: format!("mask cannot be broadcast against '{}'", self.name),
            })?;

        let mut out = self.data.clone();
        Zip::from(&mut out).and(&mask).for_each(|value, &k| {
            if !k {
                *value = other.clone();
            }
        });
        Ok(self.relabel(out))
    }

    /// Reduce each group of consecutive entries along `dim` into one entry.
    ///
    /// The reduced axis keeps its position and is relabeled as `new_dim` with
    /// `new_coord`, which must have one value per group.
    pub fn group_reduce<U, F>(
        &self,
        dim: &str,
        groups: &[Range<usize>],
        new_dim: &str,
        new_coord: Coord,
        f: F,
    ) -> Result<LabeledArray<U>>
    where
        T: Sync,
        U: Clone + Send,
        F: Fn(ArrayView1<'_, T>) -> U + Sync + Send,
    {
        let axis = self.axis_of(dim)?;
        let mut shape = self.shape().to_vec();
        shape[axis] = groups.len();

        let mut parts = Vec::with_capacity(groups.len());
        for range in groups {
            let group = self
                .data
                .slice_axis(Axis(axis), Slice::from(range.clone()));
            let reduced = crate::statistics::parallel::reduce_lanes(group, axis, &f);
            parts.push(reduced.insert_axis(Axis(axis)));
        }

        let data = if parts.is_empty() {
            ArrayD::from_shape_vec(shape, Vec::new())?
        } else {
            let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
            ndarray::concatenate(Axis(axis), &views)?
        };

        self.relabel_axis(axis, new_dim, new_coord, data)
    }
}

impl LabeledArray<f64> {
    /// `true` where a value is present
    pub fn notnull(&self) -> ValidityMask {
        self.map(|v| !v.is_nan())
    }

    /// `true` where a value is missing
    pub fn isnull(&self) -> ValidityMask {
        self.map(|v| v.is_nan())
    }

    /// Strict comparison, missing values compare as false
    pub fn gt(&self, threshold: f64) -> ValidityMask {
        self.map(|&v| v > threshold)
    }

    /// Non-strict comparison, missing values compare as false
    pub fn ge(&self, threshold: f64) -> ValidityMask {
        self.map(|&v| v >= threshold)
    }

    /// Replace values with `NaN` where `keep` is false
    pub fn mask_where(&self, keep: &ValidityMask) -> Result<Self> {
        self.where_or(keep, f64::NAN)
    }

    /// Number of present values
    pub fn count_valid(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }
}

impl LabeledArray<bool> {
    /// Element-wise negation
    #[must_use]
    pub fn not(&self) -> Self {
        self.map(|v| !v)
    }

    /// Element-wise conjunction of two aligned masks
    pub fn and(&self, other: &ValidityMask) -> Result<Self> {
        self.ensure_aligned(other)?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| a && b);
        Ok(self.relabel(data))
    }

    /// Number of `true` entries
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}
