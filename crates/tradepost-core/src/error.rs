//! # Error Types
//!
//! Domain-specific error types for tradepost-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tradepost-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tradepost-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Service results (tradepost-db::service)                               │
//! │  └── error: Option<String> - What the storefront sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → result.error → UI                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Supplier cannot be found.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(i64),

    /// Unknown supplier sort mode requested by the UI.
    ///
    /// ## When This Occurs
    /// - Query string `?sort=popular` from an outdated link
    #[error("Unknown sort mode '{0}'")]
    UnknownSortMode(String),

    /// Unknown configuration strategy name.
    #[error("Unknown {setting} '{value}'")]
    UnknownStrategy { setting: String, value: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any query runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Date lies in the past.
    #[error("{field} cannot be in the past")]
    InPast { field: String },

    /// One date must not come after another.
    #[error("{field} must not be later than {other}")]
    AfterDate { field: String, other: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::SupplierNotFound(42).to_string(),
            "Supplier not found: 42"
        );
        assert_eq!(
            CoreError::UnknownSortMode("popular".into()).to_string(),
            "Unknown sort mode 'popular'"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product_name".to_string(),
        };
        assert_eq!(err.to_string(), "product_name is required");

        let err = ValidationError::AfterDate {
            field: "quote_deadline".to_string(),
            other: "required_by".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "quote_deadline must not be later than required_by"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
