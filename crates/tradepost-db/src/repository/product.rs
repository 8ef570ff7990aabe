//! # Product Repository
//!
//! Database operations for products and their child records.
//!
//! ## Paged Fetch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One statement per page                                  │
//! │                                                                         │
//! │  SELECT p.*, s.* AS s_*, COUNT(*) OVER () AS total_count                │
//! │  FROM products p LEFT JOIN suppliers s ON s.id = p.supplier_id         │
//! │  WHERE <filter>                                                        │
//! │  ORDER BY p.created_at DESC, p.id DESC                                  │
//! │  LIMIT ? OFFSET ?                                                      │
//! │       │                                                                 │
//! │       ├── rows returned → total_count of any row is the total          │
//! │       └── no rows, offset > 0 → page past the end, run COUNT(*)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Text Search
//! `LIKE` on title, description and category name (OR). User input is
//! escaped so `%` and `_` match literally. SQLite folds ASCII case only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tradepost_core::{
    Category, CategoryRow, PageRequest, Product, ProductImage, ProductSpecification, Supplier,
};

const PRODUCT_COLUMNS: &str = "p.id, p.product_display_id, p.item_id, p.url, p.title, \
     p.description, p.mcat_id, p.mcat_name, p.cat_id, p.main_image, p.brochure_url, \
     p.supplier_id, p.price_value, p.price_currency, p.price_unit, p.price_display_string, \
     p.created_at";

const SUPPLIER_COLUMNS: &str = "s.id AS s_id, s.name AS s_name, s.address AS s_address, \
     s.phone_number AS s_phone_number, s.website_url AS s_website_url, s.score AS s_score, \
     s.response_rate AS s_response_rate, s.created_at AS s_created_at";

const FROM_PRODUCTS_WITH_SUPPLIER: &str =
    " FROM products p LEFT JOIN suppliers s ON s.id = p.supplier_id";

const NEWEST_FIRST: &str = " ORDER BY p.created_at DESC, p.id DESC";

// =============================================================================
// Filters
// =============================================================================

/// Product filter. Empty fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category id.
    pub mcat_id: Option<String>,
    /// Substring of title, description or category name.
    pub text: Option<String>,
}

impl ProductFilter {
    pub fn category(mcat_id: impl Into<String>) -> Self {
        ProductFilter {
            mcat_id: Some(mcat_id.into()),
            text: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mcat_id.is_none() && self.text.is_none()
    }
}

/// Escapes `\`, `%` and `_` and wraps the text in `%...%` for
/// `LIKE ... ESCAPE '\'`.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(mcat_id) = &filter.mcat_id {
        qb.push(" AND p.mcat_id = ").push_bind(mcat_id.clone());
    }

    if let Some(text) = &filter.text {
        let pattern = like_pattern(text);
        qb.push(" AND (p.title LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR p.description LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR p.mcat_name LIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// A product row with the LEFT JOINed supplier columns.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    #[sqlx(flatten)]
    product: Product,
    s_id: Option<i64>,
    s_name: Option<String>,
    s_address: Option<String>,
    s_phone_number: Option<String>,
    s_website_url: Option<String>,
    s_score: Option<f64>,
    s_response_rate: Option<f64>,
    s_created_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    total_count: i64,
}

impl ProductRow {
    fn into_product(self) -> Product {
        let supplier = match (self.s_id, self.s_name, self.s_created_at) {
            (Some(id), Some(name), Some(created_at)) => Some(Supplier {
                id,
                name,
                address: self.s_address,
                phone_number: self.s_phone_number,
                website_url: self.s_website_url,
                score: self.s_score,
                response_rate: self.s_response_rate,
                created_at,
            }),
            _ => None,
        };

        Product {
            supplier,
            ..self.product
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let (products, total) = repo
///     .page(&ProductFilter::category("m1"), PageRequest::new(2, 12))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Fetches one page of matching products (with suppliers), newest first,
    /// plus the total number of matches.
    pub async fn page(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> DbResult<(Vec<Product>, i64)> {
        debug!(
            mcat_id = ?filter.mcat_id,
            text = ?filter.text,
            page = page.page(),
            limit = page.limit(),
            "Fetching product page"
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(PRODUCT_COLUMNS)
            .push(", ")
            .push(SUPPLIER_COLUMNS)
            .push(", COUNT(*) OVER () AS total_count")
            .push(FROM_PRODUCTS_WITH_SUPPLIER);
        push_filter(&mut qb, filter);
        qb.push(NEWEST_FIRST)
            .push(" LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let total = match rows.first() {
            Some(row) => row.total_count,
            None if page.offset() > 0 => self.count_matching(filter).await?,
            None => 0,
        };

        let products: Vec<Product> = rows.into_iter().map(ProductRow::into_product).collect();
        debug!(count = products.len(), total, "Product page fetched");
        Ok((products, total))
    }

    /// Number of products matching `filter`.
    pub async fn count_matching(&self, filter: &ProductFilter) -> DbResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products p");
        push_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Gets a product with its supplier.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {}, {}{} WHERE p.id = ?1",
            PRODUCT_COLUMNS, SUPPLIER_COLUMNS, FROM_PRODUCTS_WITH_SUPPLIER
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ProductRow::into_product))
    }

    /// Gallery images of a product, in insertion order.
    pub async fn images(&self, product_id: i64) -> DbResult<Vec<ProductImage>> {
        let images = sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT id, product_id, medium_url, full_url
            FROM product_images
            WHERE product_id = ?1
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Specification lines of a product, in insertion order.
    pub async fn specifications(&self, product_id: i64) -> DbResult<Vec<ProductSpecification>> {
        let specs = sqlx::query_as::<_, ProductSpecification>(
            r#"
            SELECT id, product_id, key, value
            FROM product_specifications
            WHERE product_id = ?1
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(specs)
    }

    /// Products of one supplier, newest first (supplier not joined).
    pub async fn for_supplier(&self, supplier_id: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products p WHERE p.supplier_id = ?1{}",
            PRODUCT_COLUMNS, NEWEST_FIRST
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Category columns of every categorized product, ordered by product id.
    ///
    /// With `since`, only products created at or after that instant.
    pub async fn category_rows(&self, since: Option<DateTime<Utc>>) -> DbResult<Vec<CategoryRow>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT mcat_id, mcat_name, created_at FROM products \
             WHERE mcat_id IS NOT NULL AND mcat_name IS NOT NULL",
        );
        if let Some(since) = since {
            qb.push(" AND created_at >= ").push_bind(since);
        }
        qb.push(" ORDER BY id");

        let rows: Vec<CategoryRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "Fetched category rows");
        Ok(rows)
    }

    /// Categories grouped in SQL.
    ///
    /// Same result as grouping [`Self::category_rows`] in process: the id of
    /// the lowest product id per name, count descending, ties by first
    /// appearance.
    pub async fn grouped_categories(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> DbResult<Vec<Category>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "WITH filtered AS (\
                 SELECT id, mcat_id, mcat_name FROM products \
                 WHERE mcat_id IS NOT NULL AND mcat_name IS NOT NULL",
        );
        if let Some(since) = since {
            qb.push(" AND created_at >= ").push_bind(since);
        }
        qb.push(
            "), grouped AS (\
                 SELECT mcat_name, COUNT(*) AS product_count, MIN(id) AS first_id \
                 FROM filtered GROUP BY mcat_name\
             ) \
             SELECT f.mcat_id AS mcat_id, g.mcat_name AS mcat_name, g.product_count AS product_count \
             FROM grouped g JOIN filtered f ON f.id = g.first_id \
             ORDER BY g.product_count DESC, g.first_id ASC",
        );
        if let Some(limit) = limit {
            qb.push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let categories: Vec<Category> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(categories)
    }

    // =========================================================================
    // Supplier Counts
    // =========================================================================

    /// Number of products referencing a supplier.
    pub async fn count_for_supplier(&self, supplier_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE supplier_id = ?1")
            .bind(supplier_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Product counts for several suppliers in one `GROUP BY` query.
    ///
    /// Suppliers without products are absent from the map.
    pub async fn counts_for_suppliers(&self, supplier_ids: &[i64]) -> DbResult<HashMap<i64, i64>> {
        if supplier_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT supplier_id, COUNT(*) FROM products WHERE supplier_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in supplier_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") GROUP BY supplier_id");

        let rows: Vec<(i64, i64)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().collect())
    }

    /// Total number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Writes (seeding and tests)
    // =========================================================================

    /// Inserts a product and returns its new id. `product.id` and
    /// `product.supplier` are ignored.
    pub async fn insert(&self, product: &Product) -> DbResult<i64> {
        debug!(display_id = %product.product_display_id, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                product_display_id, item_id, url, title, description,
                mcat_id, mcat_name, cat_id, main_image, brochure_url,
                supplier_id, price_value, price_currency, price_unit,
                price_display_string, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&product.product_display_id)
        .bind(&product.item_id)
        .bind(&product.url)
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.mcat_id)
        .bind(&product.mcat_name)
        .bind(&product.cat_id)
        .bind(&product.main_image)
        .bind(&product.brochure_url)
        .bind(product.supplier_id)
        .bind(product.price_value)
        .bind(&product.price_currency)
        .bind(&product.price_unit)
        .bind(&product.price_display_string)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_image(
        &self,
        product_id: i64,
        medium_url: Option<&str>,
        full_url: Option<&str>,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO product_images (product_id, medium_url, full_url) VALUES (?1, ?2, ?3)",
        )
        .bind(product_id)
        .bind(medium_url)
        .bind(full_url)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_specification(
        &self,
        product_id: i64,
        key: Option<&str>,
        value: Option<&str>,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO product_specifications (product_id, key, value) VALUES (?1, ?2, ?3)",
        )
        .bind(product_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

/// Generates a public product identifier.
pub fn generate_display_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{memory_db, product, supplier};
    use chrono::Duration;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pipe"), "%pipe%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[tokio::test]
    async fn test_page_joins_supplier_and_counts() {
        let db = memory_db().await;
        let sid = db.suppliers().insert(&supplier("Acme")).await.unwrap();
        for i in 0..5 {
            let mut p = product(&format!("Pipe {}", i), Some(("m1", "Pipes")), Some(sid));
            p.created_at = p.created_at + Duration::minutes(i);
            db.products().insert(&p).await.unwrap();
        }
        db.products()
            .insert(&product("Loose valve", None, None))
            .await
            .unwrap();

        let repo = db.products();
        let (page, total) = repo
            .page(&ProductFilter::category("m1"), PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title.as_deref(), Some("Pipe 4"));
        assert_eq!(page[0].supplier.as_ref().map(|s| s.name.as_str()), Some("Acme"));

        let (past_end, total) = repo
            .page(&ProductFilter::category("m1"), PageRequest::new(9, 2))
            .await
            .unwrap();
        assert!(past_end.is_empty());
        assert_eq!(total, 5);

        let (all, total) = repo
            .page(&ProductFilter::default(), PageRequest::new(1, 50))
            .await
            .unwrap();
        assert_eq!(total, 6);
        let loose = all.iter().find(|p| p.supplier_id.is_none()).unwrap();
        assert!(loose.supplier.is_none());
    }

    #[tokio::test]
    async fn test_search_matches_literally_and_ignores_ascii_case() {
        let db = memory_db().await;
        let repo = db.products();
        repo.insert(&product("100% Cotton Yarn", None, None)).await.unwrap();
        repo.insert(&product("1000 Cotton Bales", None, None)).await.unwrap();

        let filter = ProductFilter { mcat_id: None, text: Some("0%".into()) };
        assert_eq!(repo.count_matching(&filter).await.unwrap(), 1);

        let filter = ProductFilter { mcat_id: None, text: Some("COTTON".into()) };
        assert_eq!(repo.count_matching(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_grouped_counts_skip_suppliers_without_products() {
        let db = memory_db().await;
        let busy = db.suppliers().insert(&supplier("Busy")).await.unwrap();
        let idle = db.suppliers().insert(&supplier("Idle")).await.unwrap();
        db.products().insert(&product("A", None, Some(busy))).await.unwrap();
        db.products().insert(&product("B", None, Some(busy))).await.unwrap();

        let counts = db.products().counts_for_suppliers(&[busy, idle]).await.unwrap();
        assert_eq!(counts.get(&busy), Some(&2));
        assert_eq!(counts.get(&idle), None);
        assert!(db.products().counts_for_suppliers(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_children_in_insertion_order() {
        let db = memory_db().await;
        let repo = db.products();
        let id = repo.insert(&product("Pipe", None, None)).await.unwrap();
        repo.insert_image(id, Some("m1.jpg"), Some("f1.jpg")).await.unwrap();
        repo.insert_image(id, Some("m2.jpg"), None).await.unwrap();
        repo.insert_specification(id, Some("Grade"), Some("304")).await.unwrap();

        let images = repo.images(id).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].medium_url.as_deref(), Some("m1.jpg"));
        assert_eq!(repo.specifications(id).await.unwrap()[0].value.as_deref(), Some("304"));
        assert!(repo.images(id + 1).await.unwrap().is_empty());
    }
}
