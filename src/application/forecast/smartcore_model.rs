use super::predictor::RegressionModel;
use anyhow::{Context, Result};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::io::Read;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random-forest expense regressor, deserialized from the JSON artifact
/// the training binary writes.
pub struct SmartCoreExpenseModel {
    model: Forest,
}

impl SmartCoreExpenseModel {
    pub fn new(model: Forest) -> Self {
        Self { model }
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let model: Forest =
            serde_json::from_reader(reader).context("Failed to deserialize regression model")?;
        Ok(Self { model })
    }
}

impl RegressionModel for SmartCoreExpenseModel {
    fn predict_row(&self, row: &[f64]) -> Result<f64, String> {
        let matrix = DenseMatrix::from_2d_vec(&vec![row.to_vec()])
            .map_err(|e| format!("Matrix creation failed: {}", e))?;

        let predictions = self
            .model
            .predict(&matrix)
            .map_err(|e| format!("Prediction failed: {}", e))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| "No prediction returned".to_string())
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}
