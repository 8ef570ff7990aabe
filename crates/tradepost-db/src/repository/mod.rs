//! # Repository Module
//!
//! The SQL layer. Repositories return typed rows and `DbResult`s; they
//! never swallow errors. Fail-soft behavior lives one level up, in the
//! services.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogService / SupplierDirectory                                    │
//! │       │                                                                 │
//! │       │  db.products().page(&filter, page)                             │
//! │       ▼                                                                 │
//! │  ProductRepository               SupplierRepository                    │
//! │  ├── page / count_matching       ├── list / count_matching             │
//! │  ├── get_by_id                   ├── get_by_id / about                 │
//! │  ├── images / specifications     ├── count / count_created_since       │
//! │  ├── category_rows               ├── addresses                         │
//! │  ├── grouped_categories          └── first_id                          │
//! │  └── count_for_supplier(s)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod supplier;
