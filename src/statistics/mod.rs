//! Reductions along named dimensions
//!
//! # Organization
//!
//! This module is organized into submodules:
//! - [`operations`]: Reduction operations and the traits implemented by [`crate::LabeledArray`]
//! - [`parallel`]: Lane-wise parallel implementations

pub mod operations;
pub mod parallel;

// Re-export the main types for convenience
pub use operations::{MaskReduction, NamedReduction, ReduceOp};
pub use parallel::reduce_lanes;
