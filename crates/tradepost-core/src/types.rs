//! # Domain Types
//!
//! Catalog types shared by the services and the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  supplier_id  ┌─────────────────┐                 │
//! │  │    Product      │──────────────►│    Supplier     │                 │
//! │  │  ─────────────  │               │  ─────────────  │                 │
//! │  │  id             │               │  id             │                 │
//! │  │  title          │               │  name, address  │                 │
//! │  │  mcat_id/name   │               │  score 0-5      │                 │
//! │  │  price_*        │               │  response_rate  │                 │
//! │  └───────┬─────────┘               └───────┬─────────┘                 │
//! │          │ product_id                      │ supplier_id               │
//! │  ┌───────▼─────────┐ ┌───────────────┐ ┌───▼─────────────┐             │
//! │  │  ProductImage   │ │ProductSpecific│ │  SupplierAbout  │             │
//! │  └─────────────────┘ └───────────────┘ └─────────────────┘             │
//! │                                                                         │
//! │  Category is NOT stored: it is a grouping of products by mcat_name.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::stats::country_token;
use crate::text::strip_html_tags;

/// Title shown when a product has no usable title.
pub const PLACEHOLDER_TITLE: &str = "Product Title";

// =============================================================================
// Supplier
// =============================================================================

/// A company selling on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: i64,

    pub name: String,

    /// Free-form postal address, usually ending with the country.
    pub address: Option<String>,

    pub phone_number: Option<String>,

    pub website_url: Option<String>,

    /// Aggregate rating between 0 and 5.
    pub score: Option<f64>,

    /// Share of enquiries answered, 0 to 100. `None` means undisclosed.
    pub response_rate: Option<f64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    /// Returns the last two comma-separated parts of the address
    /// (typically "State, Country").
    pub fn short_location(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        let parts: Vec<&str> = address.split(',').collect();
        let tail = parts[parts.len().saturating_sub(2)..].join(",");
        let tail = tail.trim();

        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }

    /// Best-effort country guess from the address.
    pub fn country_hint(&self) -> Option<&str> {
        self.address.as_deref().and_then(country_token)
    }

    /// Response rate formatted for display, "N/A" when undisclosed.
    pub fn display_response_rate(&self) -> String {
        match self.response_rate {
            Some(rate) if rate.fract() == 0.0 => format!("{:.0}%", rate),
            Some(rate) => format!("{:.1}%", rate),
            None => "N/A".to_string(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product listed by a supplier.
///
/// Category and supplier information is denormalized on the row;
/// `supplier` is only populated by queries that join the supplier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Public identifier used in storefront URLs.
    pub product_display_id: String,

    pub item_id: Option<String>,

    /// Source listing URL.
    pub url: Option<String>,

    /// Display title. May contain HTML from the source listing.
    pub title: Option<String>,

    /// Long description. May contain HTML from the source listing.
    pub description: Option<String>,

    /// Category identifier (denormalized).
    pub mcat_id: Option<String>,

    /// Category name (denormalized).
    pub mcat_name: Option<String>,

    pub cat_id: Option<String>,

    pub main_image: Option<String>,

    pub brochure_url: Option<String>,

    pub supplier_id: Option<i64>,

    pub price_value: Option<f64>,

    pub price_currency: Option<String>,

    /// Unit the price applies to ("Piece", "Kg", ...).
    pub price_unit: Option<String>,

    /// Preformatted price as shown by the source listing.
    pub price_display_string: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Joined supplier record, when requested.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub supplier: Option<Supplier>,
}

impl Product {
    /// Sanitized title, falling back to a placeholder.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => strip_html_tags(title),
            _ => PLACEHOLDER_TITLE.to_string(),
        }
    }

    /// Sanitized description (empty when missing).
    pub fn display_description(&self) -> String {
        strip_html_tags(self.description.as_deref().unwrap_or_default())
    }

    /// Price text for listings.
    ///
    /// Uses the source listing's display string when present, otherwise
    /// formats `price_value` with currency and unit.
    pub fn display_price(&self) -> Option<String> {
        if let Some(display) = self.price_display_string.as_deref() {
            let display = display.trim();
            if !display.is_empty() {
                return Some(display.to_string());
            }
        }

        let value = self.price_value?;
        let amount = format!("{:.2}", value);
        let mut text = match self.price_currency.as_deref().map(str::trim) {
            Some(currency) if !currency.is_empty() => format!("{} {}", currency, amount),
            _ => amount,
        };

        if let Some(unit) = self.price_unit.as_deref().map(str::trim) {
            if !unit.is_empty() {
                text.push_str(" per ");
                text.push_str(unit);
            }
        }

        Some(text)
    }

    /// Returns `(mcat_id, mcat_name)` when the product is categorized.
    pub fn category(&self) -> Option<(&str, &str)> {
        match (self.mcat_id.as_deref(), self.mcat_name.as_deref()) {
            (Some(id), Some(name)) => Some((id, name)),
            _ => None,
        }
    }
}

// =============================================================================
// Product Children
// =============================================================================

/// A gallery image of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub medium_url: Option<String>,
    pub full_url: Option<String>,
}

/// A key/value specification line of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductSpecification {
    pub id: i64,
    pub product_id: i64,
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Full product page: the product (with supplier) and its child records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub specifications: Vec<ProductSpecification>,
}

// =============================================================================
// Supplier Views
// =============================================================================

/// A titled "about" section on a supplier profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SupplierAbout {
    pub id: i64,
    pub supplier_id: i64,
    pub title: String,
    pub data: String,
}

/// A supplier in the directory listing, with its product count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierListing {
    #[serde(flatten)]
    pub supplier: Supplier,

    /// Number of products referencing this supplier. Always present.
    pub product_count: i64,
}

/// A supplier profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierProfile {
    #[serde(flatten)]
    pub supplier: Supplier,

    /// Newest first.
    pub products: Vec<Product>,

    /// Ordered by insertion.
    pub about: Vec<SupplierAbout>,
}

impl SupplierProfile {
    /// Number of products on the profile.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

// =============================================================================
// Category
// =============================================================================

/// A category derived from product rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub mcat_id: String,
    pub mcat_name: String,
    pub product_count: i64,
}

impl Category {
    /// Category name with markup removed.
    pub fn display_name(&self) -> String {
        strip_html_tags(&self.mcat_name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
