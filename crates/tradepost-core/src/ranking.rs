//! # Supplier Ranking
//!
//! Sorting over nullable metrics, expressed as data instead of ad hoc
//! comparators so every tie-break is visible in one place.
//!
//! ## Sort Plans
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SortPlan = ordered list of SortKey                                     │
//! │                                                                         │
//! │  SortKey { name, extract: fn(&T) -> Option<f64>, direction, null_as }   │
//! │                                                                         │
//! │  best_match:                                                            │
//! │    1. response_rate   DESC   null → -1                                  │
//! │    2. score           DESC   null → -1                                  │
//! │    3. created_at      DESC                                              │
//! │                                                                         │
//! │  A supplier that never disclosed a response rate ranks below one that   │
//! │  disclosed 0%.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backend vs Client Ordering
//! Every [`SupplierSort`] sends an ordering to the database, applied before
//! pagination, so page boundaries follow the full ranking. SQLite sorts
//! NULLs last on `DESC`, which matches the `-1` substitute of the client
//! plans. Modes with a client plan re-sort the fetched page with it; for
//! `best_match` and `response_rate` that re-sort leaves the backend order
//! unchanged, for `product_count` it supplies the ranking the backend can't.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::SupplierListing;

/// Substitute for an undisclosed metric. Below every real value, 0 included.
pub const MISSING_METRIC: f64 = -1.0;

// =============================================================================
// Sort Keys
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// One key of a [`SortPlan`].
pub struct SortKey<T> {
    /// Name for diagnostics and tests.
    pub name: &'static str,
    pub extract: fn(&T) -> Option<f64>,
    pub direction: Direction,
    /// Value used when `extract` returns `None`.
    pub null_as: f64,
}

impl<T> SortKey<T> {
    /// Descending key with a null substitute.
    pub fn descending(name: &'static str, extract: fn(&T) -> Option<f64>, null_as: f64) -> Self {
        SortKey {
            name,
            extract,
            direction: Direction::Descending,
            null_as,
        }
    }

    /// Ascending key with a null substitute.
    pub fn ascending(name: &'static str, extract: fn(&T) -> Option<f64>, null_as: f64) -> Self {
        SortKey {
            name,
            extract,
            direction: Direction::Ascending,
            null_as,
        }
    }

    fn value(&self, item: &T) -> f64 {
        (self.extract)(item).unwrap_or(self.null_as)
    }

    /// Compares two items on this key alone.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ordering = self.value(a).total_cmp(&self.value(b));
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        SortKey {
            name: self.name,
            extract: self.extract,
            direction: self.direction,
            null_as: self.null_as,
        }
    }
}

impl<T> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("null_as", &self.null_as)
            .finish()
    }
}

/// Ordered list of sort keys; later keys only break ties of earlier ones.
#[derive(Debug, Clone)]
pub struct SortPlan<T> {
    keys: Vec<SortKey<T>>,
}

impl<T> SortPlan<T> {
    /// Empty plan (keeps input order).
    pub fn new() -> Self {
        SortPlan { keys: Vec::new() }
    }

    /// Appends a tie-break key.
    pub fn then(mut self, key: SortKey<T>) -> Self {
        self.keys.push(key);
        self
    }

    pub fn keys(&self) -> &[SortKey<T>] {
        &self.keys
    }

    /// Compares two items key by key.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Stable sort: items equal on every key keep their input order.
    pub fn sort(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T> Default for SortPlan<T> {
    fn default() -> Self {
        SortPlan::new()
    }
}

// =============================================================================
// Supplier Plans
// =============================================================================

fn response_rate(listing: &SupplierListing) -> Option<f64> {
    listing.supplier.response_rate
}

fn score(listing: &SupplierListing) -> Option<f64> {
    listing.supplier.score
}

fn created_at(listing: &SupplierListing) -> Option<f64> {
    Some(listing.supplier.created_at.timestamp_millis() as f64)
}

fn product_count(listing: &SupplierListing) -> Option<f64> {
    Some(listing.product_count as f64)
}

/// Response rate, then score, then recency.
pub fn best_match_plan() -> SortPlan<SupplierListing> {
    SortPlan::new()
        .then(SortKey::descending("response_rate", response_rate, MISSING_METRIC))
        .then(SortKey::descending("score", score, MISSING_METRIC))
        .then(SortKey::descending("created_at", created_at, f64::MIN))
}

/// Response rate only.
pub fn response_rate_plan() -> SortPlan<SupplierListing> {
    SortPlan::new().then(SortKey::descending(
        "response_rate",
        response_rate,
        MISSING_METRIC,
    ))
}

/// Product count only.
pub fn product_count_plan() -> SortPlan<SupplierListing> {
    SortPlan::new().then(SortKey::descending("product_count", product_count, 0.0))
}

// =============================================================================
// Supplier Sort Modes
// =============================================================================

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderColumn {
    pub column: &'static str,
    pub direction: Direction,
}

impl OrderColumn {
    const fn desc(column: &'static str) -> Self {
        OrderColumn { column, direction: Direction::Descending }
    }

    const fn asc(column: &'static str) -> Self {
        OrderColumn { column, direction: Direction::Ascending }
    }
}

/// Ordering sent to the database, most significant column first.
///
/// Columns are always from a fixed set of identifiers, never user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendOrder {
    pub columns: &'static [OrderColumn],
}

impl fmt::Display for BackendOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", term.column, term.direction.as_sql())?;
        }
        Ok(())
    }
}

const BEST_MATCH_ORDER: &[OrderColumn] = &[
    OrderColumn::desc("response_rate"),
    OrderColumn::desc("score"),
    OrderColumn::desc("created_at"),
];
const RESPONSE_RATE_ORDER: &[OrderColumn] = &[OrderColumn::desc("response_rate")];
const RATING_ORDER: &[OrderColumn] = &[OrderColumn::desc("score")];
const NEWEST_ORDER: &[OrderColumn] = &[OrderColumn::desc("created_at")];
const NAME_ORDER: &[OrderColumn] = &[OrderColumn::asc("name")];

/// Sort modes offered by the supplier directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SupplierSort {
    /// Response rate, score, recency (null-aware).
    #[default]
    BestMatch,
    /// Highest score first.
    Rating,
    /// Highest response rate first (null-aware).
    ResponseRate,
    /// Most products first.
    ProductCount,
    /// Most recently joined first.
    Newest,
    /// Alphabetical.
    Name,
}

impl SupplierSort {
    pub const ALL: [SupplierSort; 6] = [
        SupplierSort::BestMatch,
        SupplierSort::Rating,
        SupplierSort::ResponseRate,
        SupplierSort::ProductCount,
        SupplierSort::Newest,
        SupplierSort::Name,
    ];

    /// Ordering the database applies before pagination.
    pub fn backend_order(&self) -> BackendOrder {
        let columns = match self {
            SupplierSort::BestMatch => BEST_MATCH_ORDER,
            SupplierSort::ResponseRate => RESPONSE_RATE_ORDER,
            SupplierSort::Rating => RATING_ORDER,
            SupplierSort::ProductCount | SupplierSort::Newest => NEWEST_ORDER,
            SupplierSort::Name => NAME_ORDER,
        };
        BackendOrder { columns }
    }

    /// Client-side re-sort applied to the fetched page, if any.
    pub fn client_plan(&self) -> Option<SortPlan<SupplierListing>> {
        match self {
            SupplierSort::BestMatch => Some(best_match_plan()),
            SupplierSort::ResponseRate => Some(response_rate_plan()),
            SupplierSort::ProductCount => Some(product_count_plan()),
            SupplierSort::Rating | SupplierSort::Newest | SupplierSort::Name => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierSort::BestMatch => "best_match",
            SupplierSort::Rating => "rating",
            SupplierSort::ResponseRate => "response_rate",
            SupplierSort::ProductCount => "product_count",
            SupplierSort::Newest => "newest",
            SupplierSort::Name => "name",
        }
    }
}

impl fmt::Display for SupplierSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "best_match" | "relevance" => Ok(SupplierSort::BestMatch),
            "rating" | "score" => Ok(SupplierSort::Rating),
            "response_rate" => Ok(SupplierSort::ResponseRate),
            "product_count" | "products" => Ok(SupplierSort::ProductCount),
            "newest" | "created_at" | "recent" => Ok(SupplierSort::Newest),
            "name" => Ok(SupplierSort::Name),
            other => Err(CoreError::UnknownSortMode(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
