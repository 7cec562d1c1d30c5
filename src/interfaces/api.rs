//! Wire-level response shapes and status mapping for an embedding HTTP
//! layer. Routing itself lives outside this crate; whatever mounts these
//! services serializes the envelopes below verbatim.

use crate::application::forecast::ForecastResult;
use crate::domain::errors::{ForecastError, LedgerError};
use serde_json::{Value, json};

/// Success envelope for a forecast: `{"success": true, "prediction": ...,
/// "confidence": ...}`.
pub fn forecast_response(result: &ForecastResult) -> Value {
    json!({
        "success": true,
        "prediction": result.prediction,
        "confidence": result.confidence,
    })
}

/// Failure envelope plus the status code distinguishing bad requests from
/// a misconfigured service from internal faults.
pub fn forecast_error_response(err: &ForecastError) -> (u16, Value) {
    (forecast_status(err), error_body(&err.to_string()))
}

pub fn forecast_status(err: &ForecastError) -> u16 {
    match err {
        ForecastError::MissingFields { .. } => 400,
        ForecastError::ModelUnavailable { .. } => 503,
        ForecastError::FeatureSchema { .. } | ForecastError::Computation { .. } => 500,
    }
}

pub fn ledger_error_response(err: &LedgerError) -> (u16, Value) {
    let status = match err {
        LedgerError::NotFound { .. } => 404,
        LedgerError::Conflict(_) | LedgerError::InvalidInput { .. } => 400,
        LedgerError::Storage(_) => 500,
    };
    (status, error_body(&err.to_string()))
}

fn error_body(message: &str) -> Value {
    json!({
        "success": false,
        "error": message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::forecast::{ConfidenceBand, PredictionBand};

    #[test]
    fn forecast_success_shape() {
        let result = ForecastResult {
            prediction: PredictionBand {
                value: 250.0,
                lower_bound: 230.0,
                upper_bound: 270.0,
                currency: "USD".to_string(),
            },
            confidence: ConfidenceBand {
                expected_mae: 20.0,
                interval: "$230.00 - $270.00".to_string(),
            },
        };

        let body = forecast_response(&result);
        assert_eq!(body["success"], true);
        assert_eq!(body["prediction"]["value"], 250.0);
        assert_eq!(body["prediction"]["lower_bound"], 230.0);
        assert_eq!(body["prediction"]["upper_bound"], 270.0);
        assert_eq!(body["prediction"]["currency"], "USD");
        assert_eq!(body["confidence"]["expected_mae"], 20.0);
        assert_eq!(body["confidence"]["interval"], "$230.00 - $270.00");
    }

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        let (status, body) = forecast_error_response(&ForecastError::missing(&["month"]));
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("month"));

        let (status, _) = forecast_error_response(&ForecastError::ModelUnavailable {
            reason: "artifacts missing".to_string(),
        });
        assert_eq!(status, 503);

        let (status, _) = forecast_error_response(&ForecastError::FeatureSchema {
            column: "X".to_string(),
        });
        assert_eq!(status, 500);

        let (status, _) = forecast_error_response(&ForecastError::Computation {
            reason: "nan".to_string(),
        });
        assert_eq!(status, 500);
    }

    #[test]
    fn ledger_statuses() {
        let (status, body) = ledger_error_response(&LedgerError::not_found("Expense"));
        assert_eq!(status, 404);
        assert_eq!(body["error"], "Expense not found");

        let (status, _) =
            ledger_error_response(&LedgerError::Conflict("Username already exists".to_string()));
        assert_eq!(status, 400);
    }
}
