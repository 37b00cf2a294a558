use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealtyCalcError {
    #[error("Missing field: {field} is required")]
    MissingField { field: String },

    #[error("Non-numeric input: {field} = {value:?}")]
    NonNumeric { field: String, value: String },

    #[error("Out of range: {field}: {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RealtyCalcError {
    pub(crate) fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        RealtyCalcError::OutOfRange {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending input field, if the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            RealtyCalcError::MissingField { field }
            | RealtyCalcError::NonNumeric { field, .. }
            | RealtyCalcError::OutOfRange { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RealtyCalcError {
    fn from(e: serde_json::Error) -> Self {
        RealtyCalcError::SerializationError(e.to_string())
    }
}
