//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - CRUD operations
//! - Relative stock adjustment, optionally guarded against going negative
//!
//! ## Stock Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Unchecked:   UPDATE products SET stock = stock + ?delta WHERE id = ?   │
//! │               0 rows → product missing → NotFound                       │
//! │                                                                         │
//! │  NonNegative: UPDATE products SET stock = stock + ?delta                │
//! │               WHERE id = ? AND stock + ?delta >= 0                      │
//! │               0 rows → re-read: missing → NotFound                      │
//! │                                 present → StockConflict                 │
//! │                                                                         │
//! │  Both run inside the batch transaction; any error rolls it back.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use aura_core::{Product, ProductPatch, StockGuard};

const PRODUCT_COLUMNS: &str =
    "id, store_id, name, category, cost_cents, price_cents, stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool, STORE_ID);
/// let products = repo.list().await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    store_id: String,
}

impl ProductRepository {
    /// Creates a new ProductRepository scoped to one store.
    pub fn new(pool: SqlitePool, store_id: impl Into<String>) -> Self {
        ProductRepository {
            pool,
            store_id: store_id.into(),
        }
    }

    /// Lists the whole catalog ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE store_id = ?1 ORDER BY name, id",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&self.store_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE id = ?1 AND store_id = ?2",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&self.store_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE store_id = ?1")
            .bind(&self.store_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, name, category,
                cost_cents, price_cents, stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a patch and returns the stored result.
    ///
    /// Reads and writes inside one transaction so a concurrent stock
    /// adjustment is not overwritten by a stale value.
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let sql = format!(
            "SELECT {} FROM products WHERE id = ?1 AND store_id = ?2",
            PRODUCT_COLUMNS
        );
        let mut product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&self.store_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        patch.apply_to(&mut product);
        product.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                cost_cents = ?4,
                price_cents = ?5,
                stock = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(id = %id, "Product updated");
        Ok(product)
    }

    /// Deletes a product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(&self.store_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(id = %id, "Product deleted");
        Ok(())
    }

    /// Adds `delta` to a product's stock on an open transaction.
    ///
    /// See the module docs for how the guard changes the update.
    pub async fn adjust_stock(
        conn: &mut SqliteConnection,
        product_id: &str,
        delta: i64,
        guard: StockGuard,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = match guard {
            StockGuard::Unchecked => {
                sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(product_id)
                    .bind(delta)
                    .bind(now)
                    .execute(&mut *conn)
                    .await?
            }
            StockGuard::NonNegative => {
                sqlx::query(
                    r#"
                    UPDATE products SET stock = stock + ?2, updated_at = ?3
                    WHERE id = ?1 AND stock + ?2 >= 0
                    "#,
                )
                .bind(product_id)
                .bind(delta)
                .bind(now)
                .execute(&mut *conn)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;

            return Err(match available {
                None => DbError::not_found("Product", product_id),
                Some(available) => DbError::StockConflict {
                    product_id: product_id.to_string(),
                    available,
                    requested: -delta,
                },
            });
        }

        debug!(product_id = %product_id, delta, "Stock adjusted");
        Ok(())
    }
}
