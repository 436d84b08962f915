//! Error types for filter compilation.

use serde::Serialize;
use thiserror::Error;

/// A field-level validation error, suitable for a 400-level response body.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// The request parameter that failed validation.
    pub field: String,
    /// Description of what was wrong with it.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while working with filter specifications.
///
/// Request-level validation reports a `Vec<FieldError>` instead, so every
/// bad parameter surfaces at once.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Bounding box violates its ordering invariant.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("page", "must be a positive integer");
        assert_eq!(err.to_string(), "page: must be a positive integer");
    }

    #[test]
    fn test_invalid_bounds_display() {
        let err = FilterError::InvalidBounds("south must not exceed north".to_string());
        assert_eq!(err.to_string(), "invalid bounds: south must not exceed north");
    }
}
