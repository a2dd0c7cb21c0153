use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaseDealError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown jurisdiction: {0} has no entry in the tax table")]
    UnknownJurisdiction(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LeaseDealError {
    fn from(e: serde_json::Error) -> Self {
        LeaseDealError::SerializationError(e.to_string())
    }
}
