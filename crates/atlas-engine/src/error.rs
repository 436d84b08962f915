//! Error types for the atlas engine.

use atlas_filter::FieldError;
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// Partial degradation (a failed facet-option fetch) is deliberately not
/// represented here: it is logged and the request proceeds with empty
/// facets. Cache bookkeeping failures likewise never surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed filter or bounds input. Maps to a 400 with field detail.
    #[error("invalid filter input ({} field errors)", .0.len())]
    Validation(Vec<FieldError>),

    /// Underlying record store failure. Maps to a 500, logged, not retried.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_counts_fields() {
        let err = EngineError::Validation(vec![
            FieldError::new("page", "must be a positive integer"),
            FieldError::new("bounds", "invalid bounds JSON"),
        ]);
        assert_eq!(err.to_string(), "invalid filter input (2 field errors)");
    }

    #[test]
    fn test_store_display() {
        let err = EngineError::Store("connection refused".to_string());
        assert_eq!(err.to_string(), "store error: connection refused");
    }
}
