//! Centralized error handling for climqc
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! distinguishes caller contract violations (bad thresholds, misaligned axes)
//! from failures of the NetCDF layer underneath the loaders.

use thiserror::Error;

/// Main error type for climqc operations
#[derive(Debug, Error)]
pub enum ClimQcError {
    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),

    /// Variable not found in NetCDF file
    #[error("Variable '{var}' not found in file")]
    VariableNotFound { var: String },

    /// Dimension not found in variable
    #[error("Dimension '{dim}' not found in variable '{var}'")]
    DimensionNotFound { var: String, dim: String },

    /// A fraction threshold outside of 0..=1
    #[error("Threshold '{name}' must be within [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// Arrays that must share axes do not
    #[error("Axis mismatch: {message}")]
    AxisMismatch { message: String },

    /// Coordinates that violate ordering or length invariants
    #[error("Invalid coordinate '{dim}': {message}")]
    InvalidCoordinate { dim: String, message: String },

    /// Time axis that cannot be decoded
    #[error("Invalid time axis: {reason}")]
    InvalidTime { reason: String },

    /// Daily data whose last year is truncated
    #[error("Incomplete final year: last day-of-year is {last_dayofyear}, expected at least 365")]
    IncompleteYear { last_dayofyear: u32 },

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// Generic error for backward compatibility
    #[error("{0}")]
    Generic(String),
}

impl From<String> for ClimQcError {
    fn from(error: String) -> Self {
        ClimQcError::Generic(error)
    }
}

impl From<&str> for ClimQcError {
    fn from(error: &str) -> Self {
        ClimQcError::Generic(error.to_string())
    }
}

/// Result type alias for climqc operations
pub type Result<T> = std::result::Result<T, ClimQcError>;

/// Reject fractions outside of `0..=1`, NaN included.
pub(crate) fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ClimQcError::InvalidThreshold { name, value })
    }
}
