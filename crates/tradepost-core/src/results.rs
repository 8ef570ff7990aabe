//! # Service Results
//!
//! Every service operation returns a value, never an `Err`. The payload
//! holds a neutral value (empty list, `None`, zeros) whenever `error` is
//! set, so a page can always render.
//!
//! ```text
//! ┌───────────────────────────────┐
//! │ ProductPage                   │
//! │   products: []   ◄── neutral  │
//! │   total:    0                 │
//! │   page, limit  (echo request) │
//! │   error: Some("...")          │
//! └───────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::pagination::PageRequest;
use crate::types::{
    Category, Product, ProductDetail, ProductImage, ProductSpecification, SupplierListing,
    SupplierProfile,
};

/// Common accessors for service results.
pub trait ServiceResult {
    /// Failure description, if the operation failed.
    fn error(&self) -> Option<&str>;

    fn is_ok(&self) -> bool {
        self.error().is_none()
    }
}

macro_rules! impl_service_result {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ServiceResult for $ty {
                fn error(&self) -> Option<&str> {
                    self.error.as_deref()
                }
            }
        )*
    };
}

// =============================================================================
// Catalog Results
// =============================================================================

/// Categories, largest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryList {
    pub categories: Vec<Category>,
    pub error: Option<String>,
}

impl CategoryList {
    pub fn ok(categories: Vec<Category>) -> Self {
        CategoryList { categories, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        CategoryList { categories: Vec::new(), error: Some(error.into()) }
    }
}

/// One page of products plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub error: Option<String>,
}

impl ProductPage {
    pub fn ok(products: Vec<Product>, total: i64, request: PageRequest) -> Self {
        ProductPage {
            products,
            total,
            page: request.page(),
            limit: request.limit(),
            error: None,
        }
    }

    pub fn failed(request: PageRequest, error: impl Into<String>) -> Self {
        ProductPage {
            products: Vec::new(),
            total: 0,
            page: request.page(),
            limit: request.limit(),
            error: Some(error.into()),
        }
    }

    pub fn total_pages(&self) -> u32 {
        PageRequest::new(self.page, self.limit).total_pages(self.total)
    }
}

/// A single product, if found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductLookup {
    pub product: Option<Product>,
    pub error: Option<String>,
}

impl ProductLookup {
    pub fn ok(product: Option<Product>) -> Self {
        ProductLookup { product, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ProductLookup { product: None, error: Some(error.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImageList {
    pub images: Vec<ProductImage>,
    pub error: Option<String>,
}

impl ImageList {
    pub fn ok(images: Vec<ProductImage>) -> Self {
        ImageList { images, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ImageList { images: Vec::new(), error: Some(error.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpecificationList {
    pub specifications: Vec<ProductSpecification>,
    pub error: Option<String>,
}

impl SpecificationList {
    pub fn ok(specifications: Vec<ProductSpecification>) -> Self {
        SpecificationList { specifications, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SpecificationList { specifications: Vec::new(), error: Some(error.into()) }
    }
}

/// Product page payload, if the product exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDetailLookup {
    pub detail: Option<ProductDetail>,
    pub error: Option<String>,
}

impl ProductDetailLookup {
    pub fn ok(detail: Option<ProductDetail>) -> Self {
        ProductDetailLookup { detail, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ProductDetailLookup { detail: None, error: Some(error.into()) }
    }
}

// =============================================================================
// Supplier Results
// =============================================================================

/// One page of the supplier directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierPage {
    pub suppliers: Vec<SupplierListing>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub error: Option<String>,
}

impl SupplierPage {
    pub fn ok(suppliers: Vec<SupplierListing>, total: i64, request: PageRequest) -> Self {
        SupplierPage {
            suppliers,
            total,
            page: request.page(),
            limit: request.limit(),
            error: None,
        }
    }

    pub fn failed(request: PageRequest, error: impl Into<String>) -> Self {
        SupplierPage {
            suppliers: Vec::new(),
            total: 0,
            page: request.page(),
            limit: request.limit(),
            error: Some(error.into()),
        }
    }

    pub fn total_pages(&self) -> u32 {
        PageRequest::new(self.page, self.limit).total_pages(self.total)
    }
}

/// A supplier profile, or an error when it is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierLookup {
    pub supplier: Option<SupplierProfile>,
    pub error: Option<String>,
}

impl SupplierLookup {
    pub fn ok(profile: SupplierProfile) -> Self {
        SupplierLookup { supplier: Some(profile), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SupplierLookup { supplier: None, error: Some(error.into()) }
    }
}

/// Directory header numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierStats {
    pub total_suppliers: i64,
    /// Suppliers created inside the trailing window.
    pub active_suppliers: i64,
    /// Distinct last address tokens, an estimate.
    pub countries_count: i64,
    pub error: Option<String>,
}

impl SupplierStats {
    pub fn failed(error: impl Into<String>) -> Self {
        SupplierStats { error: Some(error.into()), ..SupplierStats::default() }
    }
}

// =============================================================================
// Connection Status
// =============================================================================

/// Which stage of a connectivity probe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The database could not be reached.
    Connection,
    /// The database answered but the probe query failed (missing table,
    /// bad permissions).
    Query,
}

/// Outcome of a connectivity probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
}

impl ConnectionStatus {
    pub fn connected() -> Self {
        ConnectionStatus { connected: true, error: None, failure: None }
    }

    pub fn failed(kind: FailureKind, error: impl Into<String>) -> Self {
        ConnectionStatus {
            connected: false,
            error: Some(error.into()),
            failure: Some(kind),
        }
    }

    /// The storefront shows setup instructions for connection failures only.
    pub fn needs_setup_guidance(&self) -> bool {
        self.failure == Some(FailureKind::Connection)
    }
}

impl_service_result!(
    CategoryList,
    ProductPage,
    ProductLookup,
    ImageList,
    SpecificationList,
    ProductDetailLookup,
    SupplierPage,
    SupplierLookup,
    SupplierStats,
    ConnectionStatus,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_page_is_neutral_and_echoes_request() {
        let page = ProductPage::failed(PageRequest::new(3, 10), "boom");
        assert!(page.products.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!((page.page, page.limit), (3, 10));
        assert_eq!(page.error(), Some("boom"));
        assert!(!page.is_ok());
    }

    #[test]
    fn test_failed_stats_are_zero() {
        let stats = SupplierStats::failed("db down");
        assert_eq!(
            (stats.total_suppliers, stats.active_suppliers, stats.countries_count),
            (0, 0, 0)
        );
    }

    #[test]
    fn test_setup_guidance_only_for_connection_failures() {
        assert!(ConnectionStatus::failed(FailureKind::Connection, "x").needs_setup_guidance());
        assert!(!ConnectionStatus::failed(FailureKind::Query, "x").needs_setup_guidance());
        assert!(!ConnectionStatus::connected().needs_setup_guidance());
        assert!(ConnectionStatus::connected().is_ok());
    }

    #[test]
    fn test_total_pages() {
        let page = SupplierPage::ok(Vec::new(), 25, PageRequest::new(1, 12));
        assert_eq!(page.total_pages(), 3);
    }
}
