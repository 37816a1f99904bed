//! Postgres-backed product repository.
//!
//! Every write is a single statement, so each create/update/delete commits or
//! fails as a whole. Updates overwrite both columns at once. A listing reads its
//! count and its rows from one repeatable-read snapshot.

use std::sync::Arc;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use catalog_core::{Entity, Page, PageRequest, SortDirection};
use catalog_products::{Product, ProductId, ProductRepository, RepositoryError};

const SCHEMA: &str = include_str!("../../migrations/0001_create_product.sql");

#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
}

impl PostgresProductRepository {
    /// Create a repository over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `product` table and its category index if missing.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn fetch_page(
        &self,
        op: &'static str,
        category: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        // One snapshot for both statements, so the total always matches the rows.
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error(op, e))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(op, e))?;

        let count_row = sqlx::query(
            "SELECT COUNT(*) AS total FROM product WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(op, e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| map_sqlx_error(op, e))?;

        // Direction comes from a closed enum, never from caller text.
        let order = match request.direction() {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        let sql = format!(
            r#"
            SELECT id, category, name
            FROM product
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY id {order}
            LIMIT $2 OFFSET $3
            "#
        );

        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query(&sql)
            .bind(category)
            .bind(i64::from(request.size()))
            .bind(offset)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(op, e))?;

        tx.commit().await.map_err(|e| map_sqlx_error(op, e))?;

        let content = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total.max(0) as u64, request))
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("decode_product", e))?;
    let category: String = row
        .try_get("category")
        .map_err(|e| map_sqlx_error("decode_product", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("decode_product", e))?;

    Product::restore(ProductId::new(id), category, name)
        .map_err(|e| RepositoryError::backend("decode_product", e))
}

fn map_sqlx_error(op: &'static str, err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        tracing::warn!(
            operation = op,
            code = db_err.code().as_deref().unwrap_or("unknown"),
            "database error"
        );
    }
    RepositoryError::backend(op, err)
}

#[async_trait::async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT id, category, name FROM product WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self, page: PageRequest) -> Result<Page<Product>, RepositoryError> {
        self.fetch_page("find_all", None, page).await
    }

    #[instrument(skip(self))]
    async fn find_all_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        self.fetch_page("find_all_by_category", Some(category), page).await
    }

    #[instrument(skip(self), fields(id = ?product.id()))]
    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        match product.id() {
            Some(id) => {
                let result = sqlx::query("UPDATE product SET category = $2, name = $3 WHERE id = $1")
                    .bind(id.value())
                    .bind(product.category())
                    .bind(product.name())
                    .execute(&*self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("update_product", e))?;

                if result.rows_affected() == 0 {
                    return Err(RepositoryError::Missing(id));
                }
                Ok(product)
            }
            None => {
                let row = sqlx::query(
                    "INSERT INTO product (category, name) VALUES ($1, $2) RETURNING id",
                )
                .bind(product.category())
                .bind(product.name())
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("insert_product", e))?;

                let id: i64 = row
                    .try_get("id")
                    .map_err(|e| map_sqlx_error("insert_product", e))?;
                product
                    .identified(ProductId::new(id))
                    .map_err(|e| RepositoryError::backend("insert_product", e))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.value())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Missing(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_distinct_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT DISTINCT category FROM product ORDER BY category")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_distinct_categories", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("category")
                    .map_err(|e| map_sqlx_error("find_distinct_categories", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs only when `TEST_DATABASE_URL` points at a scratch Postgres.
    async fn repository() -> Option<PostgresProductRepository> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let repo = PostgresProductRepository::connect(&url, 4).await.unwrap();
        repo.migrate().await.unwrap();
        Some(repo)
    }

    #[tokio::test]
    async fn listing_total_matches_rows_under_concurrent_inserts() {
        let Some(repo) = repository().await else {
            return;
        };
        let category = format!(
            "snap-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .subsec_nanos()
        );

        let writer = {
            let repo = repo.clone();
            let category = category.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    let product = Product::new(category.as_str(), format!("item-{i}")).unwrap();
                    repo.save(product).await.unwrap();
                }
            })
        };

        let request = PageRequest::newest_first(0, 10_000).unwrap();
        while !writer.is_finished() {
            let page = repo.find_all_by_category(&category, request).await.unwrap();
            assert_eq!(page.content().len() as u64, page.total_elements());
        }
        writer.await.unwrap();

        let page = repo.find_all_by_category(&category, request).await.unwrap();
        assert_eq!(page.total_elements(), 200);
    }
}
