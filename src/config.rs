//! Configuration loading from environment variables.
//!
//! Every field has a development default so the service starts with no
//! environment at all; `.env` files are honored via `dotenvy` in the
//! binaries.

use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string for the ledger
    pub database_url: String,
    /// Directory holding the trained model artifacts
    pub model_dir: PathBuf,
    /// Optional automation endpoint that receives created expenses
    pub expense_webhook_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/farm_tracker.db".to_string(),
            model_dir: PathBuf::from("models"),
            expense_webhook_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            model_dir: env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            expense_webhook_url: env::var("EXPENSE_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.is_empty()),
        })
    }
}
