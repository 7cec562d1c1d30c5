//! One-shot forecast runner: reads a request JSON from a file or stdin,
//! runs the forecaster against the on-disk artifacts, and prints the wire
//! envelope. Exit status: 0 on success, 2 for a bad request, 1 otherwise.

use anyhow::Result;
use clap::Parser;
use farmledger::application::forecast::{ExpenseForecaster, ForecastRequest, ModelStore};
use farmledger::interfaces::api;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Predict next-month farm expenses", long_about = None)]
struct Args {
    /// Directory with trained model artifacts
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// Request JSON file; reads stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Diagnostics to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let payload = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let request: ForecastRequest = serde_json::from_str(&payload)?;

    let store = Arc::new(ModelStore::load(&args.model_dir));
    let forecaster = ExpenseForecaster::new(store);

    match forecaster.forecast(&request) {
        Ok(result) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&api::forecast_response(&result))?
            );
            Ok(())
        }
        Err(err) => {
            let (status, body) = api::forecast_error_response(&err);
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(if status == 400 { 2 } else { 1 });
        }
    }
}
