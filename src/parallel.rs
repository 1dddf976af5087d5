//! Parallel processing configuration
//!
//! Reductions along a dimension run lane-parallel on Rayon's global pool; this
//! module sizes that pool once at start-up.

use crate::errors::{ClimQcError, Result};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Configuration leaving the Rayon defaults in place
    pub fn new_default() -> Self {
        Self { num_threads: None }
    }

    /// Create a configuration that uses all available CPU cores
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Create a configuration that uses a specific number of threads
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`ClimQcError::ThreadPoolError`] for zero threads or if the
    /// global pool was already initialized.
    pub fn setup_global_pool(&self) -> Result<()> {
        let Some(num_threads) = self.num_threads else {
            log::debug!("Using default thread pool configuration");
            return Ok(());
        };

        if num_threads == 0 {
            return Err(ClimQcError::ThreadPoolError(
                "number of threads must be at least 1".to_string(),
            ));
        }

        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                ClimQcError::ThreadPoolError(format!(
                    "Failed to initialize thread pool with {num_threads} threads: {e}"
                ))
            })?;

        log::info!("Configured parallel processing with {num_threads} threads");
        Ok(())
    }

    /// Get the current number of threads being used
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

/// Get information about the current parallel configuration
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    /// Log the parallel processing information at debug level
    pub fn log_info(&self) {
        log::debug!(
            "Parallel processing: {} threads, {} CPU cores, available parallelism {}",
            self.current_threads,
            self.available_cores,
            self.available_parallelism
        );
    }
}
