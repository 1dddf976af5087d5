//! Run the validity filters on a synthetic HadEX3-like grid.
//!
//! ```sh
//! RUST_LOG=info cargo run --example synthetic_qc
//! ```

use climqc::prelude::*;
use climqc::global_mean;
use ndarray::ArrayD;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 4 x 6 grid, 1950-2018; station coverage thins out towards the poles
    // and the eastern half stops reporting in 2000
    let years: Vec<i32> = (1950..=2018).collect();
    let lats = vec![-60.0, -20.0, 20.0, 60.0];
    let lons: Vec<f64> = (0..6).map(|i| f64::from(i) * 60.0).collect();

    let data = ArrayD::from_shape_fn(vec![years.len(), lats.len(), lons.len()], |idx| {
        let (t, i, j) = (idx[0], idx[1], idx[2]);
        let year = years[t];
        let polar = i == 0 || i == 3;
        let gap = polar && t % 3 != 0;
        let stopped = j >= 3 && year > 2000;
        if gap || stopped {
            f64::NAN
        } else {
            30.0 + 0.02 * f64::from(year - 1950) - 5.0 * (i as f64 - 1.5).abs()
        }
    });

    let txx = LabeledArray::new(
        "TXx",
        data,
        vec!["time".to_string(), "lat".to_string(), "lon".to_string()],
        vec![Coord::Years(years), Coord::Values(lats), Coord::Values(lons)],
    )?;

    let outcome = find_valid_gridpoints_dunn(&txx, &DunnCriteria::default())?;
    for step in &outcome.steps {
        println!("{step}");
    }

    let valid_cells = outcome.data.notnull().any("time")?.count_true();
    println!("{valid_cells} of 24 grid cells pass the Dunn et al. criteria");

    let globmean = valid_for_globmean(&txx, &(1950..=2018), 0.9)?;
    let mean = global_mean(&globmean.data)?;
    let spread = mean.reduce("time", ReduceOp::Max)?.data().sum()
        - mean.reduce("time", ReduceOp::Min)?.data().sum();
    println!("Range of the global mean TXx: {spread:.2} K");

    Ok(())
}
