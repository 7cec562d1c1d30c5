//! Expense forecasting: model artifacts, the predictor seam, and the
//! request/response contract.

mod forecaster;
mod model_store;
mod predictor;
mod smartcore_model;

pub use forecaster::{
    ConfidenceBand, ExpenseForecaster, ForecastRequest, ForecastResult, PredictionBand,
    REQUIRED_FIELDS,
};
pub use model_store::{
    FEATURE_NAMES_FILE, METADATA_FILE, MODEL_FILE, ModelArtifacts, ModelMetadata, ModelStore,
};
pub use predictor::RegressionModel;
pub use smartcore_model::SmartCoreExpenseModel;
