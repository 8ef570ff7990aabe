//! # Pagination
//!
//! All listing operations are 1-based and page through a stable ordering.
//!
//! ```text
//! page=2, limit=10
//!
//!   rows:   0 ─────── 9 │ 10 ────── 19 │ 20 ─── 24
//!                       │ ▲ offset      │
//!                       │ └─ range ────┘ (inclusive: 10..=19)
//! ```
//!
//! Inputs are clamped rather than rejected: a page below 1 becomes 1 and a
//! limit outside `1..=MAX_PAGE_SIZE` is pulled to the nearest bound.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Creates a request, clamping page to `>= 1` and limit to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, limit: u32) -> Self {
        PageRequest {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Inclusive row range `(from, to)` covered by this page.
    pub fn range(&self) -> (i64, i64) {
        let from = self.offset();
        (from, from + i64::from(self.limit) - 1)
    }

    /// Number of pages needed for `total` rows (0 when there are none).
    pub fn total_pages(&self, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        let pages = (total + limit - 1) / limit;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, total: i64) -> bool {
        self.page < self.total_pages(total)
    }

    /// The following page, same size.
    pub fn next(&self) -> Self {
        PageRequest::new(self.page.saturating_add(1), self.limit)
    }

    /// The preceding page, same size (stays on page 1).
    pub fn previous(&self) -> Self {
        PageRequest::new(self.page.saturating_sub(1), self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Page numbers to show in a pager, centered on `current`.
///
/// At most `max_links` numbers are returned. The window slides so that it
/// never runs past either end.
///
/// ## Example
/// ```rust
/// use tradepost_core::pagination::page_links;
///
/// assert_eq!(page_links(1, 3, 5), vec![1, 2, 3]);
/// assert_eq!(page_links(10, 20, 5), vec![8, 9, 10, 11, 12]);
/// assert_eq!(page_links(20, 20, 5), vec![16, 17, 18, 19, 20]);
/// ```
pub fn page_links(current: u32, total_pages: u32, max_links: u32) -> Vec<u32> {
    if total_pages == 0 || max_links == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let shown = max_links.min(total_pages);
    let start = current
        .saturating_sub(shown / 2)
        .max(1)
        .min(total_pages - shown + 1);

    (start..start + shown).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
