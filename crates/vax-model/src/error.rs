use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaxError {
    /// Required field missing or wrong type on an incoming observation.
    #[error("schema error: {0}")]
    Schema(String),
    /// A location's series violates the data contract for this cycle.
    #[error("contract violation for {location}: {reason}")]
    Contract { location: String, reason: String },
    /// An aggregate region names members absent from the base dataset.
    #[error("aggregate region {region} references locations missing from the dataset: {missing:?}")]
    AggregateConsistency {
        region: String,
        missing: Vec<String>,
    },
    /// Data corruption severe enough to halt the cycle's export step.
    #[error("sanity check failed: {0}")]
    SanityCeiling(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VaxError>;
