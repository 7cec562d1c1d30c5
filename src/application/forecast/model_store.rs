//! Load-once store for the trained expense model and its metadata.
//!
//! `load` runs synchronously before the service accepts traffic. A failed
//! load never aborts the process: the store parks in an unavailable state
//! and every forecast observes the same condition until restart. There is
//! no reload path; the artifacts are immutable for the process lifetime.

use super::predictor::RegressionModel;
use super::smartcore_model::SmartCoreExpenseModel;
use crate::domain::errors::ForecastError;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

pub const MODEL_FILE: &str = "expense_model.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
pub const METADATA_FILE: &str = "model_metadata.json";

/// Accuracy metadata recorded by the training pipeline.
/// `test_mae` doubles as the forecaster's uncertainty proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub best_model: String,
    pub test_mae: f64,
}

/// The immutable triple the forecaster consumes.
pub struct ModelArtifacts {
    pub model: Box<dyn RegressionModel>,
    pub feature_names: Vec<String>,
    pub metadata: ModelMetadata,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("feature_names", &self.feature_names)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

enum LoadState {
    Loaded(ModelArtifacts),
    Unavailable { reason: String },
}

pub struct ModelStore {
    state: LoadState,
}

impl ModelStore {
    /// Load artifacts from `dir`. Any failure (missing file, corrupt JSON,
    /// invalid metadata) degrades to the unavailable state instead of
    /// propagating.
    pub fn load(dir: &Path) -> Self {
        match Self::try_load(dir) {
            Ok(artifacts) => {
                info!(
                    "Model loaded: {} ({} features, test MAE ${:.2})",
                    artifacts.metadata.best_model,
                    artifacts.feature_names.len(),
                    artifacts.metadata.test_mae
                );
                Self {
                    state: LoadState::Loaded(artifacts),
                }
            }
            Err(e) => {
                warn!("ML model not loaded: {:#}. Forecasts will be refused.", e);
                Self::unavailable(format!("{:#}", e))
            }
        }
    }

    /// Build a store from already-constructed artifacts. This is the seam
    /// tests use to substitute a stub model.
    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self {
            state: LoadState::Loaded(artifacts),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: LoadState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    /// The loaded artifacts, or the `ModelUnavailable` condition callers
    /// surface as a service-level failure.
    pub fn artifacts(&self) -> Result<&ModelArtifacts, ForecastError> {
        match &self.state {
            LoadState::Loaded(artifacts) => Ok(artifacts),
            LoadState::Unavailable { reason } => Err(ForecastError::ModelUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    fn try_load(dir: &Path) -> Result<ModelArtifacts> {
        let model_path = dir.join(MODEL_FILE);
        let file = File::open(&model_path)
            .with_context(|| format!("Failed to open model file {:?}", model_path))?;
        let model = SmartCoreExpenseModel::from_reader(BufReader::new(file))?;

        let names_path = dir.join(FEATURE_NAMES_FILE);
        let file = File::open(&names_path)
            .with_context(|| format!("Failed to open feature names file {:?}", names_path))?;
        let feature_names: Vec<String> = serde_json::from_reader(BufReader::new(file))
            .context("Failed to deserialize feature names")?;

        let metadata_path = dir.join(METADATA_FILE);
        let file = File::open(&metadata_path)
            .with_context(|| format!("Failed to open metadata file {:?}", metadata_path))?;
        let metadata: ModelMetadata = serde_json::from_reader(BufReader::new(file))
            .context("Failed to deserialize model metadata")?;

        if feature_names.is_empty() {
            bail!("Feature name list is empty");
        }
        if !metadata.test_mae.is_finite() || metadata.test_mae < 0.0 {
            bail!("Invalid test_mae in metadata: {}", metadata.test_mae);
        }

        Ok(ModelArtifacts {
            model: Box::new(model),
            feature_names,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_directory_degrades_to_unavailable() {
        let store = ModelStore::load(&PathBuf::from("/nonexistent/models"));
        assert!(!store.is_loaded());

        let err = store.artifacts().unwrap_err();
        assert!(matches!(err, ForecastError::ModelUnavailable { .. }));
        assert!(err.to_string().contains("ML model not loaded"));
    }

    #[test]
    fn unavailable_reason_is_preserved() {
        let store = ModelStore::unavailable("artifact corrupt");
        match store.artifacts() {
            Err(ForecastError::ModelUnavailable { reason }) => {
                assert_eq!(reason, "artifact corrupt");
            }
            other => panic!("unexpected state: {:?}", other.map(|_| ())),
        }
    }
}
