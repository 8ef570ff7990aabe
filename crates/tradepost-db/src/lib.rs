//! # tradepost-db: Storage and Services for the Tradepost Storefront
//!
//! SQLite storage for the catalog (sqlx, async) and the two services the
//! storefront pages call: the catalog service and the supplier directory.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tradepost Data Flow                              │
//! │                                                                         │
//! │  Storefront page (category grid, search, supplier directory)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tradepost-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │ Repositories  │    │  Migrations  │  │   │
//! │  │   │ (service/)    │───►│ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ CatalogSvc    │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ SupplierDir   │    │ SupplierRepo  │    │ 002_idx.sql  │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │   ┌───────────────┐    ┌───────▼───────┐                      │   │
//! │  │   │    Config     │───►│   Database    │                      │   │
//! │  │   │ (config.rs)   │    │   (pool.rs)   │                      │   │
//! │  │   └───────────────┘    └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/com.tradepost.storefront/tradepost.db              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Layered settings (defaults, TOML file, environment)
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and supplier queries
//! - [`service`] - Catalog and supplier directory operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tradepost_db::{Database, StorefrontConfig};
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let db = Database::new(config.database.to_db_config()).await?;
//!
//! let catalog = db.catalog(config.catalog.clone());
//! let page = catalog.search_products("steel pipe", 1, None, None).await;
//! if let Some(error) = &page.error {
//!     // render the error banner, page.products is empty
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
mod fixtures;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{
    CatalogSettings, CategoryAggregation, ConfigError, StorefrontConfig, SupplierCountStrategy,
};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::{ProductFilter, ProductRepository};
pub use repository::supplier::{SupplierFilter, SupplierRepository};

pub use service::{CatalogService, SupplierDirectory, SupplierQuery};
