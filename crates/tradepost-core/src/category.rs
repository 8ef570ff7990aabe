//! # Category Aggregation
//!
//! Categories are not stored. They are derived on every request by
//! grouping product rows on their denormalized category name.
//!
//! ## Grouping Rules
//! ```text
//! rows (ordered by product id)          categories
//! ─────────────────────────────         ───────────────────────────
//! m1  "Pipes"                           m1 "Pipes"   3
//! m2  "Valves"              ──────►     m2 "Valves"  2
//! m1  "Pipes"                           m9 "Tubes"   1
//! m9  "Tubes"
//! m7  "Pipes"   (name wins, id of first row kept)
//! m2  "Valves"
//! NULL "Misc"   (skipped)
//! ```
//!
//! - Rows missing either id or name are skipped
//! - The id of the first row seen for a name is kept
//! - Sorted by count descending; ties keep first-seen order

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Category;
use crate::DEFAULT_TRENDING_WINDOW_DAYS;

/// The category columns of a product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryRow {
    pub mcat_id: Option<String>,
    pub mcat_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Groups rows into categories sorted by product count (descending).
pub fn aggregate_categories<I>(rows: I) -> Vec<Category>
where
    I: IntoIterator<Item = CategoryRow>,
{
    let mut categories: Vec<Category> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let (Some(mcat_id), Some(mcat_name)) = (row.mcat_id, row.mcat_name) else {
            continue;
        };

        match index_by_name.get(&mcat_name) {
            Some(&idx) => categories[idx].product_count += 1,
            None => {
                index_by_name.insert(mcat_name.clone(), categories.len());
                categories.push(Category {
                    mcat_id,
                    mcat_name,
                    product_count: 1,
                });
            }
        }
    }

    // sort_by is stable: equal counts stay in first-seen order
    categories.sort_by(|a, b| b.product_count.cmp(&a.product_count));
    categories
}

/// Groups rows and keeps the `limit` largest categories.
pub fn top_categories<I>(rows: I, limit: usize) -> Vec<Category>
where
    I: IntoIterator<Item = CategoryRow>,
{
    let mut categories = aggregate_categories(rows);
    categories.truncate(limit);
    categories
}

// =============================================================================
// Trending Window
// =============================================================================

/// Trailing time window used for "trending" and "recently joined".
///
/// The boundary is inclusive: a row created exactly at `now - days` is
/// inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendingWindow {
    days: i64,
}

impl TrendingWindow {
    /// Creates a window of `days` days. Negative values are treated as 0.
    pub fn new(days: i64) -> Self {
        TrendingWindow { days: days.max(0) }
    }

    /// Window length in days.
    pub fn days(&self) -> i64 {
        self.days
    }

    /// Earliest timestamp inside the window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days)
    }

    /// Whether `created_at` falls inside the window ending at `now`.
    pub fn contains(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        created_at >= self.cutoff(now)
    }
}

impl Default for TrendingWindow {
    fn default() -> Self {
        TrendingWindow::new(DEFAULT_TRENDING_WINDOW_DAYS)
    }
}

/// Categories of rows created inside `window`, largest first, at most `limit`.
pub fn trending_categories<I>(
    rows: I,
    window: TrendingWindow,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Category>
where
    I: IntoIterator<Item = CategoryRow>,
{
    top_categories(
        rows.into_iter()
            .filter(|row| window.contains(row.created_at, now)),
        limit,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn row(id: Option<&str>, name: Option<&str>, days_ago: i64) -> CategoryRow {
        CategoryRow {
            mcat_id: id.map(str::to_string),
            mcat_name: name.map(str::to_string),
            created_at: now() - Duration::days(days_ago),
        }
    }

    fn sample() -> Vec<CategoryRow> {
        vec![
            row(Some("m1"), Some("Pipes"), 1),
            row(Some("m2"), Some("Valves"), 40),
            row(Some("m1"), Some("Pipes"), 50),
            row(Some("m9"), Some("Tubes"), 2),
            row(Some("m7"), Some("Pipes"), 3),
            row(Some("m2"), Some("Valves"), 5),
            row(None, Some("Misc"), 1),
            row(Some("m3"), None, 1),
        ]
    }

    #[test]
    fn test_groups_by_name_keeping_first_id() {
        let categories = aggregate_categories(sample());
        assert_eq!(
            categories,
            vec![
                Category { mcat_id: "m1".into(), mcat_name: "Pipes".into(), product_count: 3 },
                Category { mcat_id: "m2".into(), mcat_name: "Valves".into(), product_count: 2 },
                Category { mcat_id: "m9".into(), mcat_name: "Tubes".into(), product_count: 1 },
            ]
        );
    }

    #[test]
    fn test_counts_sum_to_categorized_rows() {
        let rows = sample();
        let categorized = rows
            .iter()
            .filter(|r| r.mcat_id.is_some() && r.mcat_name.is_some())
            .count() as i64;
        let total: i64 = aggregate_categories(rows).iter().map(|c| c.product_count).sum();
        assert_eq!(total, categorized);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let rows = vec![
            row(Some("b"), Some("Bolts"), 1),
            row(Some("a"), Some("Anchors"), 1),
        ];
        let names: Vec<_> = aggregate_categories(rows)
            .into_iter()
            .map(|c| c.mcat_name)
            .collect();
        assert_eq!(names, vec!["Bolts", "Anchors"]);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let window = TrendingWindow::new(30);
        assert!(window.contains(now() - Duration::days(30), now()));
        assert!(!window.contains(now() - Duration::days(30) - Duration::seconds(1), now()));
    }

    #[test]
    fn test_trending_is_windowed_subset() {
        let window = TrendingWindow::default();
        let trending = trending_categories(sample(), window, now(), 10);

        // Pipes: 2 recent (1 and 3 days), Tubes: 1, Valves: 1 (5 days)
        assert_eq!(trending[0].mcat_name, "Pipes");
        assert_eq!(trending[0].product_count, 2);
        assert_eq!(trending.len(), 3);

        let full = aggregate_categories(sample());
        for category in &trending {
            let in_full = full
                .iter()
                .find(|c| c.mcat_name == category.mcat_name)
                .expect("trending category must exist in the full list");
            assert!(category.product_count <= in_full.product_count);
        }
        assert!(trending
            .windows(2)
            .all(|pair| pair[0].product_count >= pair[1].product_count));
    }

    #[test]
    fn test_trending_respects_limit() {
        let trending = trending_categories(sample(), TrendingWindow::default(), now(), 1);
        assert_eq!(trending.len(), 1);
        assert!(trending_categories(sample(), TrendingWindow::default(), now(), 0).is_empty());
    }
}
