/// Interface for regression models that score one feature row at a time.
pub trait RegressionModel: Send + Sync {
    /// Predict a single scalar from an ordered feature row
    fn predict_row(&self, row: &[f64]) -> Result<f64, String>;

    /// Model name/type for logs and metadata
    fn name(&self) -> &str;
}
