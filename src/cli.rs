//! Defines command-line interface options using `clap` for the climqc application.

use clap::{Parser, ValueEnum};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Dataset layout of the input file
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Any CF-conforming file
    Generic,
    /// Berkeley Earth daily data with year/month/day variables
    Berkeley,
    /// HadEX3 index file, read as an annual series
    Hadex3,
}

/// A CLI tool for quality control of gridded climate observations
#[derive(Parser, Debug)]
#[command(
    version,
    name = "climqc",
    about = "Remove grid cells with insufficient data from gridded climate observations"
)]
pub struct Args {
    /// Path to the NetCDF file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Variable to read from the file
    #[arg(long)]
    pub variable: String,

    /// Layout of the input file
    #[arg(long, value_enum, default_value_t = Source::Generic)]
    pub source: Source,

    /// Drop latitudes south of 60°S when reading Berkeley Earth data
    #[arg(long, default_value_t = false)]
    pub remove_antarctica: bool,

    /// Add the climatology stored in the Berkeley Earth file to the anomalies
    #[arg(long, default_value_t = false)]
    pub add_climatology: bool,

    /// File with annual data for --require-valid
    #[arg(long, requires = "annual_variable")]
    pub annual_file: Option<PathBuf>,

    /// Variable of --annual-file
    #[arg(long, requires = "annual_file")]
    pub annual_variable: Option<String>,

    /// Find valid grid points after Dunn et al. (2020)
    #[arg(long, group = "mode")]
    pub dunn: bool,

    /// Find grid points valid for global means
    #[arg(long, group = "mode")]
    pub globmean: bool,

    /// Compute the annual data availability of a daily variable
    #[arg(long, group = "mode")]
    pub availability: bool,

    /// Require valid days per year and valid years per grid point, formatted as <days>:<years>
    #[arg(long, group = "mode", value_parser = parse_fractions, requires = "annual_file")]
    pub require_valid: Option<(f64, f64)>,

    /// Remove land points without any data from a landmask, formatted as <file>:<variable>
    #[arg(long, group = "mode", value_parser = parse_file_var)]
    pub clean_landmask: Option<(PathBuf, String)>,

    /// Years to consider, formatted as <start>:<end>
    #[arg(long, value_parser = parse_years)]
    pub years: Option<RangeInclusive<i32>>,

    /// Latest allowed year of the last valid value (--dunn)
    #[arg(long)]
    pub last_year: Option<i32>,

    /// Required fraction of valid years (--dunn, --globmean)
    #[arg(long)]
    pub minimum_valid: Option<f64>,

    /// Print the latitude-weighted global mean of the result per timestep
    #[arg(long, default_value_t = false)]
    pub global_mean: bool,

    /// Path to save result as NetCDF. If not set, prints a summary to the terminal.
    #[arg(long)]
    pub output_netcdf: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

fn parse_years(s: &str) -> Result<RangeInclusive<i32>, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| "Invalid format: Expected '<start>:<end>'.".to_string())?;
    let start = start
        .parse::<i32>()
        .map_err(|_| format!("Invalid start year '{start}'"))?;
    let end = end
        .parse::<i32>()
        .map_err(|_| format!("Invalid end year '{end}'"))?;
    if start > end {
        return Err(format!("Start year {start} is after end year {end}"));
    }
    Ok(start..=end)
}

fn parse_fractions(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [days, years] => {
            let days = days
                .parse::<f64>()
                .map_err(|_| format!("Invalid fraction of valid days '{days}'"))?;
            let years = years
                .parse::<f64>()
                .map_err(|_| format!("Invalid fraction of valid years '{years}'"))?;
            Ok((days, years))
        }
        _ => Err("Invalid format: Expected '<days>:<years>'.".to_string()),
    }
}

fn parse_file_var(s: &str) -> Result<(PathBuf, String), String> {
    match s.rsplit_once(':') {
        Some((file, var)) if !file.is_empty() && !var.is_empty() => {
            Ok((PathBuf::from(file), var.to_string()))
        }
        _ => Err("Invalid format: Expected '<file>:<variable>'.".to_string()),
    }
}
