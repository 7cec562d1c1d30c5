//! Trains the expense forecasting model from a monthly-totals CSV and
//! writes the three artifacts the model store loads: the serialized
//! regressor, the ordered feature names, and accuracy metadata.
//!
//! The CSV needs `year,month,total` columns, one row per calendar month.
//! Lag and rolling-average features are derived here, so twelve leading
//! months are consumed as warmup before the first training row.

use clap::Parser;
use farmledger::application::forecast::{
    FEATURE_NAMES_FILE, METADATA_FILE, MODEL_FILE, ModelMetadata,
};
use farmledger::domain::ml::feature_registry::{FEATURE_NAMES, cyclical_month};
use serde::Deserialize;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct MonthlyTotal {
    year: i32,
    month: u32,
    total: f64,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the expense forecasting model", long_about = None)]
struct Args {
    /// Path to monthly expense totals CSV (year,month,total)
    #[arg(long, default_value = "data/ml/monthly_expenses.csv")]
    input: PathBuf,

    /// Directory to write model artifacts into
    #[arg(long, default_value = "models")]
    output_dir: PathBuf,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees
    #[arg(long, default_value_t = 10)]
    max_depth: u16,

    /// Minimum samples required to split an internal node
    #[arg(long, default_value_t = 5)]
    min_split: usize,
}

/// Warmup months a row consumes before it can be used for training.
const WARMUP_MONTHS: usize = 12;

fn feature_row(totals: &[f64], idx: usize, year: f64, month: f64) -> Vec<f64> {
    let lag1 = totals[idx - 1];
    let lag3 = totals[idx - 3];
    let lag12 = totals[idx - 12];
    let rolling_3 = totals[idx - 3..idx].iter().sum::<f64>() / 3.0;
    let rolling_6 = totals[idx - 6..idx].iter().sum::<f64>() / 6.0;
    let diff_1 = totals[idx - 1] - totals[idx - 2];
    let (month_sin, month_cos) = cyclical_month(month);

    // Order must match FEATURE_NAMES exactly.
    vec![
        year, month, month_sin, month_cos, lag1, lag3, lag12, rolling_3, rolling_6, diff_1,
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !args.input.exists() {
        println!(
            "Training data not found at {:?}. Export monthly expense totals first.",
            args.input
        );
        return Ok(());
    }

    println!("Loading monthly totals from {:?}", args.input);
    let file = File::open(&args.input)?;
    let mut rdr = csv::Reader::from_reader(BufReader::new(file));

    let mut months: Vec<MonthlyTotal> = Vec::new();
    for result in rdr.deserialize() {
        let record: MonthlyTotal = result?;
        months.push(record);
    }
    months.sort_by_key(|m| (m.year, m.month));

    if months.len() <= WARMUP_MONTHS + 2 {
        println!(
            "Not enough history: {} months loaded, need at least {}.",
            months.len(),
            WARMUP_MONTHS + 3
        );
        return Ok(());
    }

    let totals: Vec<f64> = months.iter().map(|m| m.total).collect();
    let mut x: Vec<Vec<f64>> = Vec::new();
    let mut y: Vec<f64> = Vec::new();

    for idx in WARMUP_MONTHS..months.len() {
        let target = &months[idx];
        x.push(feature_row(
            &totals,
            idx,
            target.year as f64,
            target.month as f64,
        ));
        y.push(target.total);
    }

    let n = x.len();
    let split = ((n as f64 * 0.8).floor() as usize).max(1).min(n - 1);
    let x_train = x[..split].to_vec();
    let y_train = y[..split].to_vec();
    let x_test = x[split..].to_vec();
    let y_test = y[split..].to_vec();

    let params = RandomForestRegressorParameters::default()
        .with_n_trees(args.n_trees)
        .with_max_depth(args.max_depth)
        .with_min_samples_split(args.min_split);

    println!(
        "Training Random Forest Regressor on {} samples (Trees: {}, Depth: {}, MinSplit: {})...",
        x_train.len(),
        args.n_trees,
        args.max_depth,
        args.min_split
    );

    let x_train_m =
        DenseMatrix::from_2d_vec(&x_train).map_err(|e| format!("Matrix error: {}", e))?;
    let model = RandomForestRegressor::fit(&x_train_m, &y_train, params.clone())
        .map_err(|e| format!("Training error: {}", e))?;

    let x_test_m = DenseMatrix::from_2d_vec(&x_test).map_err(|e| format!("Matrix error: {}", e))?;
    let pred: Vec<f64> = model
        .predict(&x_test_m)
        .map_err(|e| format!("Predict error: {}", e))?;
    let test_mae: f64 = pred
        .iter()
        .zip(y_test.iter())
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / pred.len() as f64;
    println!("Holdout (n={}): MAE=${:.2}", x_test.len(), test_mae);

    // Final model sees the full history; the holdout MAE stays as the
    // recorded uncertainty figure.
    println!("Refitting on all {} samples...", n);
    let x_full = DenseMatrix::from_2d_vec(&x).map_err(|e| format!("Matrix error: {}", e))?;
    let model = RandomForestRegressor::fit(&x_full, &y, params)
        .map_err(|e| format!("Training error: {}", e))?;

    std::fs::create_dir_all(&args.output_dir)?;

    let model_path = args.output_dir.join(MODEL_FILE);
    serde_json::to_writer(File::create(&model_path)?, &model)?;

    let names_path = args.output_dir.join(FEATURE_NAMES_FILE);
    serde_json::to_writer(File::create(&names_path)?, FEATURE_NAMES)?;

    let metadata = ModelMetadata {
        best_model: "random_forest".to_string(),
        test_mae,
    };
    let metadata_path = args.output_dir.join(METADATA_FILE);
    serde_json::to_writer_pretty(File::create(&metadata_path)?, &metadata)?;

    println!("Artifacts saved to {:?}.", args.output_dir);
    Ok(())
}
