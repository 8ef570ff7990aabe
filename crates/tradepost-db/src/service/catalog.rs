//! # Catalog Service
//!
//! Category listing, product browse and search, product pages.
//!
//! ## Category Strategies
//! ```text
//! in_process (default)                 database
//! ────────────────────                 ────────
//! SELECT mcat_id, mcat_name,           WITH filtered AS (...),
//!        created_at                         grouped AS (... GROUP BY)
//! FROM products ORDER BY id            SELECT ... ORDER BY count DESC
//!        │                                    │
//!        ▼                                    │
//! category::aggregate_categories              │
//!        │                                    │
//!        └──────────────┬─────────────────────┘
//!                       ▼
//!              identical Vec<Category>
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use tradepost_core::category::{aggregate_categories, trending_categories};
use tradepost_core::validation::{normalize_filter, validate_search_query};
use tradepost_core::{
    CategoryList, CoreError, ImageList, PageRequest, ProductDetail, ProductDetailLookup,
    ProductLookup, ProductPage, SpecificationList,
};

use crate::config::{CatalogSettings, CategoryAggregation};
use crate::pool::Database;
use crate::repository::product::ProductFilter;
use crate::service::degrade;

/// Catalog operations over a [`Database`].
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
    settings: CatalogSettings,
}

impl CatalogService {
    pub fn new(db: Database, settings: CatalogSettings) -> Self {
        CatalogService { db, settings }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Page request using the configured size when the caller gives none.
    fn page_request(&self, page: u32, limit: Option<u32>) -> PageRequest {
        PageRequest::new(page, limit.unwrap_or(self.settings.page_size))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Every category with its product count, largest first.
    pub async fn list_categories(&self) -> CategoryList {
        let result = match self.settings.category_aggregation {
            CategoryAggregation::InProcess => self
                .db
                .products()
                .category_rows(None)
                .await
                .map(aggregate_categories),
            CategoryAggregation::Database => {
                self.db.products().grouped_categories(None, None).await
            }
        };

        match result {
            Ok(categories) => {
                debug!(count = categories.len(), "Listed categories");
                CategoryList::ok(categories)
            }
            Err(e) => {
                error!(error = %e, "Failed to list categories");
                CategoryList::failed(e.to_string())
            }
        }
    }

    /// Categories of products created inside the trending window, largest
    /// first. `limit` defaults to the configured trending limit.
    pub async fn list_trending_categories(&self, limit: Option<usize>) -> CategoryList {
        self.trending_categories_at(Utc::now(), limit).await
    }

    /// [`Self::list_trending_categories`] with an explicit clock.
    pub async fn trending_categories_at(
        &self,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> CategoryList {
        let limit = limit.unwrap_or(self.settings.trending_limit);
        let window = self.settings.trending_window();
        let cutoff = window.cutoff(now);

        let result = match self.settings.category_aggregation {
            CategoryAggregation::InProcess => self
                .db
                .products()
                .category_rows(Some(cutoff))
                .await
                .map(|rows| trending_categories(rows, window, now, limit)),
            CategoryAggregation::Database => self
                .db
                .products()
                .grouped_categories(Some(cutoff), Some(limit))
                .await,
        };

        match result {
            Ok(categories) => CategoryList::ok(categories),
            Err(e) => {
                error!(error = %e, "Failed to list trending categories");
                CategoryList::failed(e.to_string())
            }
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Products of one category, newest first.
    pub async fn products_by_category(
        &self,
        category_id: &str,
        page: u32,
        limit: Option<u32>,
    ) -> ProductPage {
        let request = self.page_request(page, limit);
        let filter = ProductFilter::category(category_id);

        match self.db.products().page(&filter, request).await {
            Ok((products, total)) => ProductPage::ok(products, total, request),
            Err(e) => {
                error!(category_id, error = %e, "Failed to fetch category products");
                ProductPage::failed(request, e.to_string())
            }
        }
    }

    /// Case-insensitive substring search over title, description and
    /// category name, optionally restricted to one category.
    ///
    /// A blank query applies no text filter.
    pub async fn search_products(
        &self,
        query: &str,
        page: u32,
        limit: Option<u32>,
        category_filter: Option<&str>,
    ) -> ProductPage {
        let request = self.page_request(page, limit);

        let query = match validate_search_query(query) {
            Ok(query) => query,
            Err(e) => return ProductPage::failed(request, CoreError::from(e).to_string()),
        };

        let filter = ProductFilter {
            mcat_id: normalize_filter(category_filter),
            text: normalize_filter(Some(&query)),
        };

        match self.db.products().page(&filter, request).await {
            Ok((products, total)) => ProductPage::ok(products, total, request),
            Err(e) => {
                error!(query = %query, error = %e, "Product search failed");
                ProductPage::failed(request, e.to_string())
            }
        }
    }

    /// One product with its supplier.
    pub async fn product_by_id(&self, id: i64) -> ProductLookup {
        match self.db.products().get_by_id(id).await {
            Ok(Some(product)) => ProductLookup::ok(Some(product)),
            Ok(None) => ProductLookup::failed(CoreError::ProductNotFound(id).to_string()),
            Err(e) => {
                error!(id, error = %e, "Failed to fetch product");
                ProductLookup::failed(e.to_string())
            }
        }
    }

    pub async fn product_images(&self, id: i64) -> ImageList {
        match self.db.products().images(id).await {
            Ok(images) => ImageList::ok(images),
            Err(e) => {
                error!(id, error = %e, "Failed to fetch product images");
                ImageList::failed(e.to_string())
            }
        }
    }

    pub async fn product_specifications(&self, id: i64) -> SpecificationList {
        match self.db.products().specifications(id).await {
            Ok(specifications) => SpecificationList::ok(specifications),
            Err(e) => {
                error!(id, error = %e, "Failed to fetch product specifications");
                SpecificationList::failed(e.to_string())
            }
        }
    }

    /// Product page payload. The three fetches run concurrently; only the
    /// product fetch can fail the result.
    pub async fn product_detail(&self, id: i64) -> ProductDetailLookup {
        let products = self.db.products();
        let (product, images, specifications) = futures::join!(
            products.get_by_id(id),
            products.images(id),
            products.specifications(id),
        );

        match product {
            Ok(Some(product)) => ProductDetailLookup::ok(Some(ProductDetail {
                product,
                images: degrade(images, "product images", id),
                specifications: degrade(specifications, "product specifications", id),
            })),
            Ok(None) => ProductDetailLookup::failed(CoreError::ProductNotFound(id).to_string()),
            Err(e) => {
                error!(id, error = %e, "Failed to fetch product detail");
                ProductDetailLookup::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{memory_db, product, supplier};
    use chrono::Duration;

    async fn seeded(strategy: CategoryAggregation) -> (CatalogService, Database) {
        let db = memory_db().await;
        let sid = db.suppliers().insert(&supplier("Acme")).await.unwrap();
        let now = Utc::now();

        let rows = [
            ("m1", "Pipes", 1),
            ("m2", "Valves", 40),
            ("m1", "Pipes", 50),
            ("m9", "Tubes", 2),
            ("m7", "Pipes", 3),
            ("m2", "Valves", 5),
        ];
        for (i, (id, name, days_ago)) in rows.iter().enumerate() {
            let mut p = product(&format!("Item {}", i), Some((id, name)), Some(sid));
            p.created_at = now - Duration::days(*days_ago);
            db.products().insert(&p).await.unwrap();
        }
        let mut uncategorized = product("Loose", None, Some(sid));
        uncategorized.mcat_name = Some("Misc".into());
        db.products().insert(&uncategorized).await.unwrap();

        let settings = CatalogSettings {
            category_aggregation: strategy,
            ..CatalogSettings::default()
        };
        (db.catalog(settings), db)
    }

    #[tokio::test]
    async fn test_category_strategies_agree() {
        let (in_process, _db1) = seeded(CategoryAggregation::InProcess).await;
        let (database, _db2) = seeded(CategoryAggregation::Database).await;

        let a = in_process.list_categories().await;
        let b = database.list_categories().await;
        assert!(a.error.is_none());
        assert_eq!(a.categories, b.categories);

        let names: Vec<_> = a.categories.iter().map(|c| c.mcat_name.as_str()).collect();
        assert_eq!(names, vec!["Pipes", "Valves", "Tubes"]);
        assert_eq!(a.categories[0].mcat_id, "m1");
        assert_eq!(a.categories.iter().map(|c| c.product_count).sum::<i64>(), 6);

        let t1 = in_process.list_trending_categories(None).await;
        let t2 = database.list_trending_categories(None).await;
        assert_eq!(t1.categories, t2.categories);
        assert_eq!(t1.categories[0].mcat_name, "Pipes");
        assert_eq!(t1.categories[0].product_count, 2);

        let limited = database.list_trending_categories(Some(1)).await;
        assert_eq!(limited.categories.len(), 1);
    }

    #[tokio::test]
    async fn test_page_two_of_twenty_five() {
        let db = memory_db().await;
        let base = Utc::now();
        for i in 0..25 {
            let mut p = product(&format!("Pipe {:02}", i), Some(("m1", "Pipes")), None);
            p.created_at = base - Duration::minutes(i);
            db.products().insert(&p).await.unwrap();
        }
        let catalog = db.catalog(CatalogSettings::default());

        let page1 = catalog.products_by_category("m1", 1, None).await;
        let page2 = catalog.products_by_category("m1", 2, None).await;
        let page3 = catalog.products_by_category("m1", 3, None).await;

        assert_eq!(page2.products.len(), 12);
        assert_eq!(page3.products.len(), 1);
        assert!([&page1, &page2, &page3].iter().all(|p| p.total == 25));
        assert_eq!(page1.products[0].title.as_deref(), Some("Pipe 00"));
        assert_eq!(page2.products[0].title.as_deref(), Some("Pipe 12"));

        let beyond = catalog.products_by_category("m1", 9, None).await;
        assert!(beyond.products.is_empty());
        assert_eq!(beyond.total, 25);
        assert!(beyond.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_search_equals_browse() {
        let (catalog, _db) = seeded(CategoryAggregation::InProcess).await;

        let everything = catalog.search_products("", 1, Some(100), None).await;
        let blank = catalog.search_products("   ", 1, Some(100), None).await;
        let browse = catalog.db.products().count().await.unwrap();
        assert_eq!(everything.total, browse);
        assert_eq!(blank.total, browse);
    }

    #[tokio::test]
    async fn test_search_with_category_filter() {
        let (catalog, _db) = seeded(CategoryAggregation::InProcess).await;

        // "pipes" hits every Pipes product through mcat_name.
        let hits = catalog.search_products("PIPES", 1, None, None).await;
        assert_eq!(hits.total, 3);

        let narrowed = catalog.search_products("item", 1, None, Some("m2")).await;
        assert_eq!(narrowed.total, 2);
        assert!(narrowed
            .products
            .iter()
            .all(|p| p.mcat_id.as_deref() == Some("m2")));

        let too_long = catalog.search_products(&"x".repeat(500), 1, None, None).await;
        assert!(too_long.error.is_some());
        assert!(too_long.products.is_empty());
    }

    #[tokio::test]
    async fn test_product_detail() {
        let db = memory_db().await;
        let sid = db.suppliers().insert(&supplier("Acme")).await.unwrap();
        let id = db.products().insert(&product("Pipe", None, Some(sid))).await.unwrap();
        db.products().insert_image(id, Some("m.jpg"), Some("f.jpg")).await.unwrap();
        db.products().insert_specification(id, Some("Grade"), Some("304")).await.unwrap();
        let catalog = db.catalog(CatalogSettings::default());

        let detail = catalog.product_detail(id).await.detail.unwrap();
        assert_eq!(detail.product.supplier.unwrap().name, "Acme");
        assert_eq!(detail.images.len(), 1);
        assert_eq!(detail.specifications.len(), 1);

        let missing = catalog.product_by_id(id + 100).await;
        assert!(missing.product.is_none());
        assert_eq!(missing.error.as_deref(), Some(format!("Product not found: {}", id + 100).as_str()));
        assert!(catalog.product_images(id + 100).await.images.is_empty());
    }

    #[tokio::test]
    async fn test_detail_survives_missing_side_tables() {
        let db = memory_db().await;
        let id = db.products().insert(&product("Pipe", None, None)).await.unwrap();
        db.products().insert_image(id, Some("m.jpg"), Some("f.jpg")).await.unwrap();
        db.products().insert_specification(id, Some("Grade"), Some("304")).await.unwrap();
        let catalog = db.catalog(CatalogSettings::default());

        sqlx::query("DROP TABLE product_images").execute(db.pool()).await.unwrap();
        let lookup = catalog.product_detail(id).await;
        assert_eq!(lookup.error, None);
        let detail = lookup.detail.unwrap();
        assert_eq!(detail.product.title.as_deref(), Some("Pipe"));
        assert!(detail.images.is_empty());
        assert_eq!(detail.specifications.len(), 1);

        sqlx::query("DROP TABLE product_specifications").execute(db.pool()).await.unwrap();
        let lookup = catalog.product_detail(id).await;
        assert_eq!(lookup.error, None);
        assert!(lookup.detail.unwrap().specifications.is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_returned_not_raised() {
        let db = memory_db().await;
        let catalog = db.catalog(CatalogSettings::default());
        db.close().await;

        let categories = catalog.list_categories().await;
        assert!(categories.categories.is_empty());
        assert!(categories.error.is_some());

        let page = catalog.products_by_category("m1", 2, Some(10)).await;
        assert_eq!((page.page, page.limit, page.total), (2, 10, 0));
        assert!(page.error.is_some());

        assert!(catalog.product_detail(1).await.error.is_some());
    }
}
