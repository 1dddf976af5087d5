//! Entry point for the climqc application.
//! Handles CLI parsing, data loading, and dispatches the quality-control filters.

use clap::Parser;
use climqc::sources::{berkeley, HadEx3};
use climqc::validity::{DUNN_LAST_YEAR, DUNN_MINIMUM_VALID, DUNN_YEARS, GLOBMEAN_MINIMUM_VALID};
use climqc::{
    annual_data_availability, clean_landmask, find_valid_gridpoints_dunn, get_parallel_info,
    global_mean, land_mean, netcdf_io, require_valid, valid_for_globmean, Coord, DunnCriteria,
    GriddedSeries, LabeledArray, NetCDFWriter, ParallelConfig,
};
use std::path::Path;

mod cli;

use cli::{Args, Source};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    ParallelConfig::new(args.threads).setup_global_pool()?;
    get_parallel_info().log_info();

    let series = load_series(&args)?;
    log::info!(
        "Loaded '{}' with dimensions [{}] and shape {:?}",
        series.name(),
        series.dims().join(", "),
        series.shape()
    );

    let mut land_mask = None;

    let result = if args.dunn {
        let criteria = DunnCriteria {
            years: args.years.clone().unwrap_or(DUNN_YEARS),
            last_year_floor: Some(args.last_year.unwrap_or(DUNN_LAST_YEAR)),
            minimum_valid: args.minimum_valid.unwrap_or(DUNN_MINIMUM_VALID),
        };
        let outcome = find_valid_gridpoints_dunn(&series, &criteria)?;
        for step in &outcome.steps {
            println!("{step}");
        }
        outcome.data
    } else if args.globmean {
        let years = args.years.clone().unwrap_or(DUNN_YEARS);
        let minimum_valid = args.minimum_valid.unwrap_or(GLOBMEAN_MINIMUM_VALID);
        let outcome = valid_for_globmean(&series, &years, minimum_valid)?;
        for step in &outcome.steps {
            println!("{step}");
        }
        outcome.data
    } else if args.availability {
        annual_data_availability(&series)?.with_name(format!("{}_availability", series.name()))
    } else if let Some((valid_days, valid_years)) = args.require_valid {
        let availability = annual_data_availability(&series)?;
        let annual = load_annual(&args)?;
        require_valid(&annual, &availability, valid_days, valid_years)?
    } else if let Some((path, var)) = &args.clean_landmask {
        let file = netcdf::open(path)?;
        let mask = netcdf_io::read_variable(&file, var)?.squeeze();
        let cleaned = clean_landmask(&series, &mask)?;
        land_mask = Some(cleaned.clone());
        cleaned
    } else {
        series.clone()
    };

    if args.global_mean {
        let mean = match &land_mask {
            Some(mask) => land_mean(&series, Some(mask))?,
            None => global_mean(&result)?,
        };
        print_series(&mean);
    }

    if let Some(output_path) = &args.output_netcdf {
        NetCDFWriter::new(output_path).write_array(&result)?;
        println!("Saved result to {}", output_path.display());
    } else {
        println!(
            "Result '{}': {} of {} values valid",
            result.name(),
            result.count_valid(),
            result.data().len()
        );
    }

    Ok(())
}

/// Read the main input variable according to `--source`
fn load_series(args: &Args) -> climqc::Result<GriddedSeries> {
    let path = args.file.as_path();
    match args.source {
        Source::Generic => {
            let file = netcdf::open(path)?;
            netcdf_io::read_variable(&file, &args.variable)
        }
        Source::Berkeley => {
            let series = match &args.years {
                Some(years) => berkeley::read(path, &args.variable, years, args.remove_antarctica)?,
                None if args.remove_antarctica => berkeley::read_file(path, &args.variable)?
                    .sel_range("lat", climqc::sources::ANTARCTICA_LAT, f64::INFINITY)?,
                None => berkeley::read_file(path, &args.variable)?,
            };
            if args.add_climatology {
                let climatology = berkeley::read_climatology(path, args.remove_antarctica)?;
                climqc::add_climatology(&series, &climatology)
            } else {
                Ok(series)
            }
        }
        Source::Hadex3 => {
            let hadex3 = HadEx3 {
                variable: args.variable.clone(),
                ..HadEx3::default()
            };
            hadex3.read_index(path)
        }
    }
}

/// Read the annual data filtered by `--require-valid`
fn load_annual(args: &Args) -> climqc::Result<GriddedSeries> {
    let (Some(path), Some(var)) = (&args.annual_file, &args.annual_variable) else {
        return Err("--require-valid needs --annual-file and --annual-variable".into());
    };
    let file = netcdf::open(Path::new(path))?;
    let annual = netcdf_io::read_variable(&file, var)?.to_annual()?;
    let dim = annual.temporal_dim()?.to_string();
    Ok(annual.rename_dim(&dim, "year"))
}

/// Print a 1-D series together with its coordinate
fn print_series(series: &LabeledArray<f64>) {
    let labels: Vec<String> = match series.coords().first() {
        Some(Coord::Years(years)) => years.iter().map(ToString::to_string).collect(),
        Some(Coord::Dates(dates)) => dates.iter().map(ToString::to_string).collect(),
        _ => (0..series.data().len()).map(|i| i.to_string()).collect(),
    };
    println!("Global mean of '{}':", series.name());
    for (label, value) in labels.iter().zip(series.data().iter()) {
        println!("  {label}: {value:.3}");
    }
}
