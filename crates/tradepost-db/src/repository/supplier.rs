//! # Supplier Repository
//!
//! Database operations for suppliers and their profile sections.
//!
//! Directory ordering comes from [`BackendOrder`], whose columns are always
//! from a fixed set of identifiers. Nothing user-supplied is ever
//! formatted into SQL; filters go through `push_bind`.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::like_pattern;
use tradepost_core::ranking::BackendOrder;
use tradepost_core::{PageRequest, Supplier, SupplierAbout};

const SUPPLIER_COLUMNS: &str =
    "id, name, address, phone_number, website_url, score, response_rate, created_at";

/// Directory filter. Empty fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierFilter {
    /// Substring of the supplier name.
    pub search: Option<String>,
    /// Substring of the address.
    pub location: Option<String>,
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &SupplierFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(search) = &filter.search {
        qb.push(" AND name LIKE ")
            .push_bind(like_pattern(search))
            .push(r" ESCAPE '\'");
    }

    if let Some(location) = &filter.location {
        qb.push(" AND address LIKE ")
            .push_bind(like_pattern(location))
            .push(r" ESCAPE '\'");
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    #[sqlx(flatten)]
    supplier: Supplier,
    #[sqlx(default)]
    total_count: i64,
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Fetches one directory page in backend order, plus the total number
    /// of matching suppliers.
    ///
    /// SQLite places NULLs last on `DESC` and first on `ASC`. Ties fall back
    /// to id so pages never overlap.
    pub async fn list(
        &self,
        filter: &SupplierFilter,
        order: BackendOrder,
        page: PageRequest,
    ) -> DbResult<(Vec<Supplier>, i64)> {
        debug!(
            search = ?filter.search,
            location = ?filter.location,
            order = %order,
            page = page.page(),
            limit = page.limit(),
            "Fetching supplier page"
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(SUPPLIER_COLUMNS)
            .push(", COUNT(*) OVER () AS total_count FROM suppliers");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY ");
        for term in order.columns {
            qb.push(term.column)
                .push(" ")
                .push(term.direction.as_sql())
                .push(", ");
        }
        qb.push("id ASC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<SupplierRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let total = match rows.first() {
            Some(row) => row.total_count,
            None if page.offset() > 0 => self.count_matching(filter).await?,
            None => 0,
        };

        Ok((rows.into_iter().map(|row| row.supplier).collect(), total))
    }

    /// Number of suppliers matching `filter`.
    pub async fn count_matching(&self, filter: &SupplierFilter) -> DbResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM suppliers");
        push_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {} FROM suppliers WHERE id = ?1", SUPPLIER_COLUMNS);

        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// "About" sections of a supplier, in insertion order.
    pub async fn about(&self, supplier_id: i64) -> DbResult<Vec<SupplierAbout>> {
        let sections = sqlx::query_as::<_, SupplierAbout>(
            r#"
            SELECT id, supplier_id, title, data
            FROM supplier_about
            WHERE supplier_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Suppliers created at or after `cutoff`.
    pub async fn count_created_since(&self, cutoff: DateTime<Utc>) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE created_at >= ?1")
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Every non-null address.
    pub async fn addresses(&self) -> DbResult<Vec<String>> {
        let addresses: Vec<String> =
            sqlx::query_scalar("SELECT address FROM suppliers WHERE address IS NOT NULL")
                .fetch_all(&self.pool)
                .await?;

        Ok(addresses)
    }

    /// Reads a single supplier id. Used as the connectivity check.
    pub async fn first_id(&self) -> DbResult<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM suppliers LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    // =========================================================================
    // Writes (seeding and tests)
    // =========================================================================

    /// Inserts a supplier and returns its new id. `supplier.id` is ignored.
    pub async fn insert(&self, supplier: &Supplier) -> DbResult<i64> {
        debug!(name = %supplier.name, "Inserting supplier");

        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (
                name, address, phone_number, website_url,
                score, response_rate, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.phone_number)
        .bind(&supplier.website_url)
        .bind(supplier.score)
        .bind(supplier.response_rate)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_about(&self, supplier_id: i64, title: &str, data: &str) -> DbResult<i64> {
        let result =
            sqlx::query("INSERT INTO supplier_about (supplier_id, title, data) VALUES (?1, ?2, ?3)")
                .bind(supplier_id)
                .bind(title)
                .bind(data)
                .execute(&self.pool)
                .await?;

        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{memory_db, supplier};
    use tradepost_core::SupplierSort;

    #[tokio::test]
    async fn test_filters_and_total() {
        let db = memory_db().await;
        let repo = db.suppliers();
        let mut a = supplier("Acme Pipes");
        a.address = Some("Pune, Maharashtra, India".into());
        let mut b = supplier("Acme Valves");
        b.address = Some("Shenzhen, China".into());
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();
        repo.insert(&supplier("Zenith Tubes")).await.unwrap();

        let filter = SupplierFilter { search: Some("acme".into()), location: None };
        let (page, total) = repo
            .list(&filter, SupplierSort::Name.backend_order(), PageRequest::new(1, 1))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].name, "Acme Pipes");

        let filter = SupplierFilter { search: Some("acme".into()), location: Some("china".into()) };
        assert_eq!(repo.count_matching(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_score_order_puts_nulls_last() {
        let db = memory_db().await;
        let repo = db.suppliers();
        let mut unrated = supplier("Unrated");
        unrated.score = None;
        let mut rated = supplier("Rated");
        rated.score = Some(1.0);
        repo.insert(&unrated).await.unwrap();
        repo.insert(&rated).await.unwrap();

        let (page, _) = repo
            .list(
                &SupplierFilter::default(),
                SupplierSort::Rating.backend_order(),
                PageRequest::new(1, 10),
            )
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rated", "Unrated"]);
    }

    #[tokio::test]
    async fn test_about_sections_and_first_id() {
        let db = memory_db().await;
        let repo = db.suppliers();
        assert_eq!(repo.first_id().await.unwrap(), None);

        let id = repo.insert(&supplier("Acme")).await.unwrap();
        repo.insert_about(id, "Company", "Founded 1998").await.unwrap();
        repo.insert_about(id, "Factory", "Pune").await.unwrap();

        let about = repo.about(id).await.unwrap();
        assert_eq!(about.iter().map(|a| a.title.as_str()).collect::<Vec<_>>(), vec!["Company", "Factory"]);
        assert_eq!(repo.first_id().await.unwrap(), Some(id));
    }
}
