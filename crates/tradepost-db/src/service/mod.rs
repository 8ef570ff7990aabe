//! # Storefront Services
//!
//! The operations the storefront pages call. Every operation returns a
//! result value from `tradepost_core::results`; no `Err` crosses this
//! boundary.
//!
//! ## Failure Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repository call                                                       │
//! │       │                                                                 │
//! │       ├── Ok(rows)        → result with payload, error = None          │
//! │       │                                                                 │
//! │       ├── Err(e) primary  → error! log, neutral payload,               │
//! │       │                     error = Some(e.to_string())                │
//! │       │                                                                 │
//! │       └── Err(e) secondary (images, counts, about)                     │
//! │                           → warn! log, empty / zero, keep going        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod suppliers;

pub use catalog::CatalogService;
pub use suppliers::{SupplierDirectory, SupplierQuery};

use tracing::warn;

use crate::error::DbResult;

/// Unwraps a secondary fetch, logging and substituting the default on error.
pub(crate) fn degrade<T: Default>(result: DbResult<T>, what: &str, id: i64) -> T {
    result.unwrap_or_else(|e| {
        warn!(id, error = %e, "Failed to fetch {}, continuing without", what);
        T::default()
    })
}
