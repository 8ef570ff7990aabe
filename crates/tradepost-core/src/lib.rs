//! # tradepost-core: Pure Catalog Logic for the Tradepost Storefront
//!
//! This crate holds everything about the storefront catalog that can be
//! expressed without touching a database: domain types, text cleanup,
//! category grouping, supplier ranking and pagination math.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tradepost Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront pages (external)                     │   │
//! │  │   Categories ──► Search ──► Product ──► Suppliers ──► RFQ       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │       tradepost-db services (CatalogService, SupplierDirectory) │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tradepost-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────────┐          │   │
//! │  │   │  types  │ │   text   │ │category │ │  ranking   │          │   │
//! │  │   │ Product │ │ sanitize │ │ grouping│ │ SortPlan   │          │   │
//! │  │   │Supplier │ │ truncate │ │trending │ │SupplierSort│          │   │
//! │  │   └─────────┘ └──────────┘ └─────────┘ └────────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Supplier, Category, ...)
//! - [`results`] - Result shapes returned by the services (payload + error)
//! - [`text`] - HTML stripping and display text helpers
//! - [`category`] - Category grouping and the trending window
//! - [`ranking`] - Null-aware multi-key sorting and supplier sort modes
//! - [`pagination`] - 1-based page requests
//! - [`stats`] - Supplier statistics heuristics
//! - [`validation`] - Input validation (RFQ drafts, search input)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tradepost_core::text::strip_html_tags;
//!
//! assert_eq!(strip_html_tags("<b>Steel &amp; Pipe</b>"), "Steel & Pipe");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod category;
pub mod error;
pub mod pagination;
pub mod ranking;
pub mod results;
pub mod stats;
pub mod text;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use category::{CategoryRow, TrendingWindow};
pub use error::{CoreError, ValidationError};
pub use pagination::PageRequest;
pub use ranking::{Direction, SortKey, SortPlan, SupplierSort};
pub use results::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default number of items per page on every listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Upper bound for a caller-supplied page size.
///
/// ## Business Reason
/// The supplier listing issues one count query per supplier on the page,
/// so the page size bounds that fan-out.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Trailing window (in days) used for trending categories and
/// "recently joined" supplier statistics.
pub const DEFAULT_TRENDING_WINDOW_DAYS: i64 = 30;

/// Default number of trending categories shown.
pub const DEFAULT_TRENDING_LIMIT: usize = 10;
