//! # Validation Module
//!
//! Input checks that run before any query is built.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront form / query string                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  THIS MODULE                                                            │
//! │  ├── normalize_filter       "  " → None, " pune " → Some("pune")        │
//! │  ├── validate_search_query  trimmed, at most 200 chars                  │
//! │  └── validate_rfq_draft     RFQ form rules                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Services (tradepost-db)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tradepost_core::validation::normalize_filter;
//!
//! assert_eq!(normalize_filter(Some("  ")), None);
//! assert_eq!(normalize_filter(Some(" Pune ")), Some("Pune".to_string()));
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a search query.
pub const MAX_SEARCH_QUERY_CHARS: usize = 200;

/// Maximum length of an RFQ product name.
pub const MAX_RFQ_NAME_CHARS: usize = 200;

/// Maximum length of an RFQ description.
pub const MAX_RFQ_DESCRIPTION_CHARS: usize = 5000;

// =============================================================================
// Filters
// =============================================================================

/// Trims an optional filter; blank filters are treated as absent.
pub fn normalize_filter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (means "no text filter")
/// - Maximum 200 characters after trimming
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_CHARS {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_CHARS,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// RFQ Drafts
// =============================================================================

/// A request-for-quotation as typed into the RFQ form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RfqDraft {
    pub product_name: String,
    pub category: Option<String>,
    pub description: String,
    /// Free text, e.g. "500 pieces".
    pub quantity: String,
    pub price_range: Option<String>,
    pub delivery_location: Option<String>,
    #[ts(as = "Option<String>")]
    pub required_by: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub quote_deadline: Option<NaiveDate>,
}

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_chars(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn not_in_past(field: &str, date: Option<NaiveDate>, today: NaiveDate) -> ValidationResult<()> {
    match date {
        Some(date) if date < today => Err(ValidationError::InPast {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates an RFQ draft, reporting the first failing rule.
///
/// ## Rules
/// - `product_name`, `description` and `quantity` are required
/// - `product_name` at most 200 characters, `description` at most 5000
/// - `category`, when given, must not be blank
/// - Neither date may lie before `today`
/// - `quote_deadline` must not come after `required_by`
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tradepost_core::validation::{validate_rfq_draft, RfqDraft};
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let draft = RfqDraft {
///     product_name: "Seamless pipe".into(),
///     description: "Grade 304, 2 inch".into(),
///     quantity: "500 metres".into(),
///     ..RfqDraft::default()
/// };
/// assert!(validate_rfq_draft(&draft, today).is_ok());
/// ```
pub fn validate_rfq_draft(draft: &RfqDraft, today: NaiveDate) -> ValidationResult<()> {
    required("product_name", &draft.product_name)?;
    max_chars("product_name", &draft.product_name, MAX_RFQ_NAME_CHARS)?;

    if let Some(category) = &draft.category {
        required("category", category)?;
    }

    required("description", &draft.description)?;
    max_chars("description", &draft.description, MAX_RFQ_DESCRIPTION_CHARS)?;

    required("quantity", &draft.quantity)?;

    not_in_past("required_by", draft.required_by, today)?;
    not_in_past("quote_deadline", draft.quote_deadline, today)?;

    if let (Some(deadline), Some(required_by)) = (draft.quote_deadline, draft.required_by) {
        if deadline > required_by {
            return Err(ValidationError::AfterDate {
                field: "quote_deadline".to_string(),
                other: "required_by".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
