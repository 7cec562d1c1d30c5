//! Feature construction for the expense regression model.
//!
//! Column names here MUST match exactly what the training pipeline wrote
//! into `feature_names.json`. Any change is a breaking change for saved
//! models.

use crate::domain::errors::ForecastError;
use std::f64::consts::PI;

/// Canonical column order produced by the training pipeline.
pub const FEATURE_NAMES: &[&str] = &[
    "Year",
    "Month",
    "Month_sin",
    "Month_cos",
    "Total_Lag1",
    "Total_Lag3",
    "Total_Lag12",
    "Rolling_Avg_3",
    "Rolling_Avg_6",
    "Diff_1",
];

/// Raw numeric inputs for one forecast, already validated for presence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureInputs {
    pub year: f64,
    pub month: f64,
    pub total_lag1: f64,
    pub total_lag3: f64,
    pub total_lag12: f64,
    pub rolling_avg_3: f64,
    pub diff_1: f64,
    pub rolling_avg_6: f64,
}

/// Month-of-year as a sine/cosine pair, so the model sees December and
/// January as adjacent.
pub fn cyclical_month(month: f64) -> (f64, f64) {
    let angle = 2.0 * PI * month / 12.0;
    (angle.sin(), angle.cos())
}

/// All named feature values derivable from the inputs.
pub fn named_features(inputs: &FeatureInputs) -> Vec<(&'static str, f64)> {
    let (month_sin, month_cos) = cyclical_month(inputs.month);
    vec![
        ("Year", inputs.year),
        ("Month", inputs.month),
        ("Month_sin", month_sin),
        ("Month_cos", month_cos),
        ("Total_Lag1", inputs.total_lag1),
        ("Total_Lag3", inputs.total_lag3),
        ("Total_Lag12", inputs.total_lag12),
        ("Rolling_Avg_3", inputs.rolling_avg_3),
        ("Rolling_Avg_6", inputs.rolling_avg_6),
        ("Diff_1", inputs.diff_1),
    ]
}

/// Select and order the feature row to match the model's stored column
/// list. A column the registry cannot produce is a configuration fault,
/// never silently zero-filled.
pub fn select_row(
    inputs: &FeatureInputs,
    feature_names: &[String],
) -> Result<Vec<f64>, ForecastError> {
    let features = named_features(inputs);
    feature_names
        .iter()
        .map(|name| {
            features
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| ForecastError::FeatureSchema {
                    column: name.clone(),
                })
        })
        .collect()
}
