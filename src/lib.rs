//! climqc: quality control of gridded climate observations
//!
//! Observational products such as Berkeley Earth daily temperatures or the
//! HadEX3 extremes indices cover the globe unevenly in space and time. Before
//! trends or global means are computed, grid cells with too little data have to
//! be removed. climqc provides these filters on top of labeled N-dimensional
//! arrays, together with the NetCDF loaders for the datasets they serve.
//!
//! ## Key Features
//!
//! - **Validity filters**: annual data availability, minimum valid days/years,
//!   and the grid-point criteria of Dunn et al. (2020)
//! - **Landmask cleaning**: drop land cells that never report data
//! - **Climatologies**: leap-day extension and reconstruction of absolute values
//!   from anomalies
//! - **Parallel Processing**: lane-wise reductions on Rayon's thread pool
//!
//! ## Module Organization
//!
//! - [`labeled`]: labeled arrays, coordinates and element-wise operations
//! - [`statistics`]: reductions along named dimensions
//! - [`validity`]: availability and grid validity filters
//! - [`landmask`]: landmask cleaning
//! - [`climatology`]: day-of-year climatologies
//! - [`weighting`]: latitude-weighted spatial means
//! - [`netcdf_io`]: NetCDF reading and writing
//! - [`sources`]: Berkeley Earth, ERA5 and HadEX3 readers
//! - [`parallel`]: thread pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use climqc::prelude::*;
//! use std::path::Path;
//!
//! let txx = HadEx3::default().read_index(Path::new("HadEX3_TXx.nc")).unwrap();
//! let outcome = find_valid_gridpoints_dunn(&txx, &DunnCriteria::default()).unwrap();
//! for step in &outcome.steps {
//!     println!("{step}");
//! }
//! ```

pub mod climatology;
pub mod errors;
pub mod labeled;
pub mod landmask;
pub mod netcdf_io;
pub mod parallel;
pub mod sources;
pub mod statistics;
pub mod validity;
pub mod weighting;

pub use climatology::{add_climatology, extend_climatology};
pub use errors::{ClimQcError, Result};
pub use labeled::{AnnualAvailability, Coord, GriddedSeries, LabeledArray, LandMask, ValidityMask};
pub use landmask::{clean_landmask, land_without_any_data};
pub use netcdf_io::{read_variable, NetCDFWriter};
pub use parallel::{get_parallel_info, ParallelConfig, ParallelInfo};
pub use statistics::{MaskReduction, NamedReduction, ReduceOp};
pub use validity::{
    annual_data_availability, find_valid_gridpoints_dunn, require_valid, valid_for_globmean,
    DunnCriteria, FilterOutcome, StepReport,
};
pub use weighting::{global_mean, land_mean};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::climatology::{add_climatology, extend_climatology};
    pub use crate::errors::{ClimQcError, Result};
    pub use crate::labeled::{Coord, GriddedSeries, LabeledArray, LandMask, ValidityMask};
    pub use crate::landmask::{clean_landmask, land_without_any_data};
    pub use crate::netcdf_io::NetCDFWriter;
    pub use crate::parallel::ParallelConfig;
    pub use crate::sources::HadEx3;
    pub use crate::statistics::{MaskReduction, NamedReduction, ReduceOp};
    pub use crate::validity::{
        annual_data_availability, find_valid_gridpoints_dunn, require_valid,
        valid_for_globmean, DunnCriteria,
    };
}
