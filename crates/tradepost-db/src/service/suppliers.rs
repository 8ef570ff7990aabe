//! # Supplier Directory
//!
//! Paginated supplier listing, supplier profiles, directory statistics and
//! the connectivity check.
//!
//! ## Listing Flow
//! ```text
//! SupplierQuery { page, limit, search, location, sort }
//!      │
//!      ▼  1. filter + backend order (sort.backend_order())
//! SupplierRepository::list ──► Vec<Supplier>, total
//!      │
//!      ▼  2. product counts
//!      │     per_supplier: one COUNT per row, join_all
//!      │     grouped:      one GROUP BY for the page
//!      ▼
//! Vec<SupplierListing>
//!      │
//!      ▼  3. sort.client_plan() re-sorts THIS PAGE only
//! SupplierPage
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use tradepost_core::stats::estimate_country_count;
use tradepost_core::validation::normalize_filter;
use tradepost_core::{
    ConnectionStatus, CoreError, FailureKind, PageRequest, Supplier, SupplierListing,
    SupplierLookup, SupplierPage, SupplierProfile, SupplierSort, SupplierStats,
};

use crate::config::{CatalogSettings, SupplierCountStrategy};
use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::supplier::SupplierFilter;
use crate::service::degrade;

/// Directory listing parameters, as read from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierQuery {
    /// 1-based page; 0 is treated as 1.
    pub page: u32,
    /// Page size; the configured size when absent.
    pub limit: Option<u32>,
    /// Substring of the supplier name.
    pub search: Option<String>,
    /// Substring of the address.
    pub location: Option<String>,
    pub sort: SupplierSort,
}

/// Supplier operations over a [`Database`].
#[derive(Debug, Clone)]
pub struct SupplierDirectory {
    db: Database,
    settings: CatalogSettings,
}

impl SupplierDirectory {
    pub fn new(db: Database, settings: CatalogSettings) -> Self {
        SupplierDirectory { db, settings }
    }

    /// One page of the directory with product counts, in the requested order.
    pub async fn suppliers(&self, query: SupplierQuery) -> SupplierPage {
        let request = PageRequest::new(query.page, query.limit.unwrap_or(self.settings.page_size));
        let filter = SupplierFilter {
            search: normalize_filter(query.search.as_deref()),
            location: normalize_filter(query.location.as_deref()),
        };

        let (suppliers, total) = match self
            .db
            .suppliers()
            .list(&filter, query.sort.backend_order(), request)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!(sort = %query.sort, error = %e, "Failed to list suppliers");
                return SupplierPage::failed(request, e.to_string());
            }
        };

        let mut listings = self.with_product_counts(suppliers).await;

        if let Some(plan) = query.sort.client_plan() {
            plan.sort(&mut listings);
        }

        debug!(count = listings.len(), total, sort = %query.sort, "Listed suppliers");
        SupplierPage::ok(listings, total, request)
    }

    /// Attaches product counts. A count that cannot be fetched is 0.
    async fn with_product_counts(&self, suppliers: Vec<Supplier>) -> Vec<SupplierListing> {
        let products = self.db.products();

        let counts: Vec<i64> = match self.settings.supplier_counts {
            SupplierCountStrategy::PerSupplier => {
                join_all(suppliers.iter().map(|supplier| {
                    let products = &products;
                    async move {
                        products
                            .count_for_supplier(supplier.id)
                            .await
                            .unwrap_or_else(|e| {
                                warn!(supplier_id = supplier.id, error = %e, "Product count failed, using 0");
                                0
                            })
                    }
                }))
                .await
            }
            SupplierCountStrategy::Grouped => {
                let ids: Vec<i64> = suppliers.iter().map(|s| s.id).collect();
                let grouped: HashMap<i64, i64> = products
                    .counts_for_suppliers(&ids)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "Grouped product count failed, using 0");
                        HashMap::new()
                    });
                ids.iter().map(|id| grouped.get(id).copied().unwrap_or(0)).collect()
            }
        };

        suppliers
            .into_iter()
            .zip(counts)
            .map(|(supplier, product_count)| SupplierListing {
                supplier,
                product_count,
            })
            .collect()
    }

    /// Supplier profile. A missing supplier is an error; missing products or
    /// about sections are not.
    pub async fn supplier_by_id(&self, id: i64) -> SupplierLookup {
        let supplier = match self.db.suppliers().get_by_id(id).await {
            Ok(Some(supplier)) => supplier,
            Ok(None) => return SupplierLookup::failed(CoreError::SupplierNotFound(id).to_string()),
            Err(e) => {
                error!(id, error = %e, "Failed to fetch supplier");
                return SupplierLookup::failed(e.to_string());
            }
        };

        let products = self.db.products();
        let suppliers = self.db.suppliers();
        let (products, about) =
            futures::join!(products.for_supplier(id), suppliers.about(id));

        SupplierLookup::ok(SupplierProfile {
            supplier,
            products: degrade(products, "supplier products", id),
            about: degrade(about, "supplier about sections", id),
        })
    }

    /// Directory header numbers. Any failing query fails the whole result.
    pub async fn supplier_stats(&self) -> SupplierStats {
        self.supplier_stats_at(Utc::now()).await
    }

    /// [`Self::supplier_stats`] with an explicit clock.
    pub async fn supplier_stats_at(&self, now: DateTime<Utc>) -> SupplierStats {
        match self.collect_stats(now).await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "Failed to compute supplier stats");
                SupplierStats::failed(e.to_string())
            }
        }
    }

    async fn collect_stats(&self, now: DateTime<Utc>) -> DbResult<SupplierStats> {
        let repo = self.db.suppliers();
        let cutoff = self.settings.trending_window().cutoff(now);

        let (total, active, addresses) = futures::try_join!(
            repo.count(),
            repo.count_created_since(cutoff),
            repo.addresses(),
        )?;

        let countries = estimate_country_count(addresses.iter().map(String::as_str));

        Ok(SupplierStats {
            total_suppliers: total,
            active_suppliers: active,
            countries_count: i64::try_from(countries).unwrap_or(i64::MAX),
            error: None,
        })
    }

    /// Probes the database by reading one supplier id.
    pub async fn test_connection(&self) -> ConnectionStatus {
        match self.db.suppliers().first_id().await {
            Ok(_) => ConnectionStatus::connected(),
            Err(e) => {
                let kind = if e.is_connection_error() {
                    FailureKind::Connection
                } else {
                    FailureKind::Query
                };
                error!(?kind, error = %e, "Connection check failed");
                ConnectionStatus::failed(kind, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{memory_db, product, supplier};
    use chrono::Duration;

    fn settings(counts: SupplierCountStrategy) -> CatalogSettings {
        CatalogSettings {
            supplier_counts: counts,
            ..CatalogSettings::default()
        }
    }

    #[test]
    fn test_query_from_partial_json() {
        let query: SupplierQuery =
            serde_json::from_str(r#"{"search": "steel", "sort": "response_rate"}"#).unwrap();
        assert_eq!(query.page, 0);
        assert_eq!(query.limit, None);
        assert_eq!(query.search.as_deref(), Some("steel"));
        assert_eq!(query.sort, SupplierSort::ResponseRate);

        let query: SupplierQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, SupplierQuery::default());
    }

    /// Three suppliers: "Busy" with 3 products, "Quiet" with 1, "Idle" with none.
    async fn seeded() -> Database {
        let db = memory_db().await;
        let now = Utc::now();

        let mut busy = supplier("Busy Pipes");
        busy.response_rate = None;
        busy.score = Some(4.0);
        busy.address = Some("Plot 4, Pune, India".into());
        busy.created_at = now - Duration::days(100);

        let mut quiet = supplier("Quiet Valves");
        quiet.response_rate = Some(0.0);
        quiet.score = Some(5.0);
        quiet.address = Some("Shenzhen, China".into());
        quiet.created_at = now - Duration::days(3);

        let mut idle = supplier("Idle Tubes");
        idle.response_rate = Some(90.0);
        idle.score = None;
        idle.address = Some("Noida, India".into());
        idle.created_at = now - Duration::days(10);

        let busy_id = db.suppliers().insert(&busy).await.unwrap();
        let quiet_id = db.suppliers().insert(&quiet).await.unwrap();
        db.suppliers().insert(&idle).await.unwrap();

        for title in ["A", "B", "C"] {
            db.products().insert(&product(title, None, Some(busy_id))).await.unwrap();
        }
        db.products().insert(&product("D", None, Some(quiet_id))).await.unwrap();
        db
    }

    fn names(page: &SupplierPage) -> Vec<&str> {
        page.suppliers.iter().map(|l| l.supplier.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_best_match_ranks_undisclosed_rate_last() {
        let db = seeded().await;
        let page = db
            .supplier_directory(CatalogSettings::default())
            .suppliers(SupplierQuery::default())
            .await;

        assert!(page.error.is_none());
        assert_eq!(page.total, 3);
        assert_eq!(names(&page), vec!["Idle Tubes", "Quiet Valves", "Busy Pipes"]);
    }

    #[tokio::test]
    async fn test_best_match_ties_on_rate_page_by_score() {
        let db = memory_db().await;
        let mut low = supplier("LowScore");
        low.response_rate = Some(50.0);
        low.score = Some(1.0);
        let mut high = supplier("HighScore");
        high.response_rate = Some(50.0);
        high.score = Some(5.0);
        db.suppliers().insert(&low).await.unwrap();
        db.suppliers().insert(&high).await.unwrap();

        let directory = db.supplier_directory(CatalogSettings::default());
        let page_one = directory
            .suppliers(SupplierQuery { page: 1, limit: Some(1), ..SupplierQuery::default() })
            .await;
        let page_two = directory
            .suppliers(SupplierQuery { page: 2, limit: Some(1), ..SupplierQuery::default() })
            .await;

        assert_eq!(page_one.total, 2);
        assert_eq!(names(&page_one), vec!["HighScore"]);
        assert_eq!(names(&page_two), vec!["LowScore"]);
    }

    #[tokio::test]
    async fn test_zero_product_supplier_gets_zero() {
        let db = seeded().await;
        for strategy in [SupplierCountStrategy::PerSupplier, SupplierCountStrategy::Grouped] {
            let page = db
                .supplier_directory(settings(strategy))
                .suppliers(SupplierQuery {
                    search: Some("idle".into()),
                    ..SupplierQuery::default()
                })
                .await;
            assert!(page.error.is_none());
            assert_eq!(page.suppliers.len(), 1);
            assert_eq!(page.suppliers[0].product_count, 0);
        }
    }

    #[tokio::test]
    async fn test_count_strategies_agree() {
        let db = seeded().await;
        let query = SupplierQuery {
            sort: SupplierSort::ProductCount,
            ..SupplierQuery::default()
        };

        let per_supplier = db
            .supplier_directory(settings(SupplierCountStrategy::PerSupplier))
            .suppliers(query.clone())
            .await;
        let grouped = db
            .supplier_directory(settings(SupplierCountStrategy::Grouped))
            .suppliers(query)
            .await;

        assert_eq!(per_supplier.suppliers, grouped.suppliers);
        let counts: Vec<i64> = grouped.suppliers.iter().map(|l| l.product_count).collect();
        assert_eq!(counts, vec![3, 1, 0]);
    }

    #[tokio::test]
    async fn test_backend_only_modes() {
        let db = seeded().await;
        let directory = db.supplier_directory(CatalogSettings::default());

        let by_name = directory
            .suppliers(SupplierQuery { sort: SupplierSort::Name, ..SupplierQuery::default() })
            .await;
        assert_eq!(names(&by_name), vec!["Busy Pipes", "Idle Tubes", "Quiet Valves"]);

        let newest = directory
            .suppliers(SupplierQuery { sort: SupplierSort::Newest, ..SupplierQuery::default() })
            .await;
        assert_eq!(names(&newest), vec!["Quiet Valves", "Idle Tubes", "Busy Pipes"]);

        let rating = directory
            .suppliers(SupplierQuery { sort: SupplierSort::Rating, ..SupplierQuery::default() })
            .await;
        assert_eq!(names(&rating), vec!["Quiet Valves", "Busy Pipes", "Idle Tubes"]);
    }

    #[tokio::test]
    async fn test_pagination_and_location_filter() {
        let db = seeded().await;
        let directory = db.supplier_directory(CatalogSettings::default());

        let page = directory
            .suppliers(SupplierQuery {
                page: 2,
                limit: Some(2),
                sort: SupplierSort::Name,
                ..SupplierQuery::default()
            })
            .await;
        assert_eq!(page.total, 3);
        assert_eq!(names(&page), vec!["Quiet Valves"]);

        let india = directory
            .suppliers(SupplierQuery {
                location: Some(" india ".into()),
                ..SupplierQuery::default()
            })
            .await;
        assert_eq!(india.total, 2);
    }

    #[tokio::test]
    async fn test_supplier_profile() {
        let db = seeded().await;
        let directory = db.supplier_directory(CatalogSettings::default());
        db.suppliers().insert_about(1, "Company", "Founded 1998").await.unwrap();

        let profile = directory.supplier_by_id(1).await.supplier.unwrap();
        assert_eq!(profile.supplier.name, "Busy Pipes");
        assert_eq!(profile.product_count(), 3);
        assert_eq!(profile.about.len(), 1);

        let missing = directory.supplier_by_id(999).await;
        assert!(missing.supplier.is_none());
        assert_eq!(missing.error.as_deref(), Some("Supplier not found: 999"));
    }

    #[tokio::test]
    async fn test_profile_survives_missing_about_table() {
        let db = seeded().await;
        sqlx::query("DROP TABLE supplier_about").execute(db.pool()).await.unwrap();

        let lookup = db
            .supplier_directory(CatalogSettings::default())
            .supplier_by_id(1)
            .await;
        assert_eq!(lookup.error, None);
        let profile = lookup.supplier.unwrap();
        assert_eq!(profile.supplier.name, "Busy Pipes");
        assert_eq!(profile.product_count(), 3);
        assert!(profile.about.is_empty());
    }

    #[tokio::test]
    async fn test_supplier_stats() {
        let db = seeded().await;
        let stats = db
            .supplier_directory(CatalogSettings::default())
            .supplier_stats()
            .await;

        assert_eq!(stats.error, None);
        assert_eq!(stats.total_suppliers, 3);
        assert_eq!(stats.active_suppliers, 2);
        assert_eq!(stats.countries_count, 2);
    }

    #[tokio::test]
    async fn test_connection_classifies_failures() {
        let db = memory_db().await;
        let directory = db.supplier_directory(CatalogSettings::default());
        assert!(directory.test_connection().await.connected);

        sqlx::query("DROP TABLE supplier_about").execute(db.pool()).await.unwrap();
        sqlx::query("DROP TABLE products").execute(db.pool()).await.unwrap();
        sqlx::query("DROP TABLE suppliers").execute(db.pool()).await.unwrap();
        let status = directory.test_connection().await;
        assert!(!status.connected);
        assert_eq!(status.failure, Some(FailureKind::Query));
        assert!(!status.needs_setup_guidance());

        db.close().await;
        let status = directory.test_connection().await;
        assert_eq!(status.failure, Some(FailureKind::Connection));
        assert!(status.needs_setup_guidance());

        let stats = directory.supplier_stats().await;
        assert_eq!((stats.total_suppliers, stats.active_suppliers, stats.countries_count), (0, 0, 0));
        assert!(stats.error.is_some());
    }
}
