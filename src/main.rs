//! Farmledger Server - Headless farm-finance backend
//!
//! Boots the ledger and the expense forecaster without any embedded HTTP
//! routing; a surrounding web layer mounts the services exposed through
//! `application::bootstrap`.
//!
//! # Usage
//! ```sh
//! DATABASE_URL=sqlite://data/farm_tracker.db cargo run
//! ```
//!
//! # Environment Variables
//! - `DATABASE_URL` - SQLite connection string (default: sqlite://data/farm_tracker.db)
//! - `MODEL_DIR` - Directory with trained model artifacts (default: models)
//! - `EXPENSE_WEBHOOK_URL` - Optional automation endpoint for created expenses

use anyhow::Result;
use farmledger::application::bootstrap;
use farmledger::config::Config;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Farmledger {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: database={}, model_dir={:?}",
        config.database_url, config.model_dir
    );

    let ctx = bootstrap::build(&config).await?;

    match ctx.model_store.artifacts() {
        Ok(artifacts) => {
            info!("Forecasting ready: {}", artifacts.metadata.best_model);
        }
        Err(e) => {
            warn!("{}. Forecast requests will be refused until retrained artifacts are deployed.", e);
        }
    }

    info!("Ledger ready. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");

    // Drains the connection pool before exit.
    ctx.db.pool.close().await;

    Ok(())
}
