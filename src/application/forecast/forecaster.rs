//! Expense forecasting from lag/rolling-average features.
//!
//! The forecaster is a pure, synchronous function of the loaded model
//! artifacts and the caller-supplied inputs. It never persists or logs a
//! request; identical inputs against an unchanged store produce
//! bit-identical results.

use super::model_store::ModelStore;
use crate::domain::errors::ForecastError;
use crate::domain::ml::feature_registry::{self, FeatureInputs};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Request fields that must all be present before any numeric work.
pub const REQUIRED_FIELDS: &[&str] = &[
    "year",
    "month",
    "total_lag1",
    "total_lag3",
    "total_lag12",
    "rolling_avg_3",
    "diff_1",
    "rolling_avg_6",
];

const CURRENCY: &str = "USD";

/// Caller payload. Fields are optional at the type level so that an
/// incomplete payload can be reported with every missing field at once
/// rather than failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastRequest {
    pub year: Option<f64>,
    pub month: Option<f64>,
    pub total_lag1: Option<f64>,
    pub total_lag3: Option<f64>,
    pub total_lag12: Option<f64>,
    pub rolling_avg_3: Option<f64>,
    pub diff_1: Option<f64>,
    pub rolling_avg_6: Option<f64>,
}

impl ForecastRequest {
    /// Validate presence of every required field, collecting the complete
    /// list of absent ones.
    fn inputs(&self) -> Result<FeatureInputs, ForecastError> {
        let mut missing: Vec<String> = Vec::new();
        let mut take = |name: &'static str, value: Option<f64>| -> f64 {
            match value {
                Some(v) => v,
                None => {
                    missing.push(name.to_string());
                    f64::NAN
                }
            }
        };

        let inputs = FeatureInputs {
            year: take("year", self.year),
            month: take("month", self.month),
            total_lag1: take("total_lag1", self.total_lag1),
            total_lag3: take("total_lag3", self.total_lag3),
            total_lag12: take("total_lag12", self.total_lag12),
            rolling_avg_3: take("rolling_avg_3", self.rolling_avg_3),
            diff_1: take("diff_1", self.diff_1),
            rolling_avg_6: take("rolling_avg_6", self.rolling_avg_6),
        };

        if missing.is_empty() {
            Ok(inputs)
        } else {
            Err(ForecastError::MissingFields { fields: missing })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionBand {
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBand {
    pub expected_mae: f64,
    pub interval: String,
}

/// One forecast outcome; created fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub prediction: PredictionBand,
    pub confidence: ConfidenceBand,
}

pub struct ExpenseForecaster {
    store: Arc<ModelStore>,
}

impl ExpenseForecaster {
    pub fn new(store: Arc<ModelStore>) -> Self {
        Self { store }
    }

    /// Run one prediction. The unavailable-store condition is checked
    /// before field validation so that a misconfigured service is never
    /// masked by a bad request.
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult, ForecastError> {
        let artifacts = self.store.artifacts()?;
        let inputs = request.inputs()?;

        let row = match feature_registry::select_row(&inputs, &artifacts.feature_names) {
            Ok(row) => row,
            Err(e) => {
                if let ForecastError::FeatureSchema { column } = &e {
                    error!(
                        "Trained feature list disagrees with feature construction: '{}'",
                        column
                    );
                }
                return Err(e);
            }
        };
        let prediction = artifacts
            .model
            .predict_row(&row)
            .map_err(|reason| ForecastError::Computation { reason })?;

        let mae = artifacts.metadata.test_mae;
        let lower = prediction - mae;
        let upper = prediction + mae;

        Ok(ForecastResult {
            prediction: PredictionBand {
                value: round2(prediction),
                lower_bound: round2(lower),
                upper_bound: round2(upper),
                currency: CURRENCY.to_string(),
            },
            confidence: ConfidenceBand {
                expected_mae: round2(mae),
                interval: format!("${} - ${}", format_thousands(lower), format_thousands(upper)),
            },
        })
    }
}

/// Round to 2 decimal places, halves away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render with 2 decimals and comma thousands separators, e.g. `1,234.56`.
fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = rest.split_once('.').unwrap_or((rest, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}
