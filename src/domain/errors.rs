use thiserror::Error;

/// Failure modes of the expense forecaster.
///
/// Each variant maps to a distinct status class so callers can tell a
/// misconfigured service apart from a bad request (see
/// `interfaces::api::status_for`).
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("ML model not loaded: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Feature schema mismatch: model expects '{column}', which is not produced")]
    FeatureSchema { column: String },

    #[error("Prediction failed: {reason}")]
    Computation { reason: String },
}

impl ForecastError {
    pub fn missing(fields: &[&str]) -> Self {
        Self::MissingFields {
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// Errors surfaced by ledger CRUD operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_enumerates_every_field() {
        let err = ForecastError::missing(&["year", "month", "diff_1"]);
        assert_eq!(err.to_string(), "Missing required fields: year, month, diff_1");
    }

    #[test]
    fn feature_schema_message_names_the_column() {
        let err = ForecastError::FeatureSchema {
            column: "Total_Lag24".to_string(),
        };
        assert!(err.to_string().contains("Total_Lag24"));
    }

    #[test]
    fn ledger_not_found_formatting() {
        let err = LedgerError::not_found("Expense");
        assert_eq!(err.to_string(), "Expense not found");
    }
}
