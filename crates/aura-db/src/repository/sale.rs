//! # Sale Repository
//!
//! Database operations for the sale ledger.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. COMMIT (inside a batch transaction)                                │
//! │     └── insert() → sales row + one sale_items row per line             │
//! │                                                                         │
//! │  2. STATUS CHANGES (single statement)                                  │
//! │     └── update_status() → Pagado / Entregado / Pendiente               │
//! │                                                                         │
//! │  3. (OPTIONAL) REVERSAL (inside a batch transaction)                   │
//! │     └── delete() → sales row; sale_items cascade                       │
//! │                                                                         │
//! │  Totals and item snapshots are never rewritten after step 1.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use aura_core::{Sale, SaleItem, SaleStatus};

/// Header row of a sale, without its items.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    store_id: String,
    date: DateTime<Utc>,
    total_cents: i64,
    total_profit_cents: i64,
    customer_name: String,
    status: SaleStatus,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> Sale {
        Sale {
            id: self.id,
            store_id: self.store_id,
            date: self.date,
            items,
            total_cents: self.total_cents,
            total_profit_cents: self.total_profit_cents,
            customer_name: self.customer_name,
            status: self.status,
        }
    }
}

/// One stored line, tagged with the sale it belongs to.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    sale_id: String,
    product_id: String,
    name: String,
    price_cents: i64,
    cost_cents: i64,
    quantity: i64,
}

impl ItemRow {
    fn into_item(self) -> SaleItem {
        SaleItem {
            product_id: self.product_id,
            name: self.name,
            price_cents: self.price_cents,
            cost_cents: self.cost_cents,
            quantity: self.quantity,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    store_id: String,
}

impl SaleRepository {
    /// Creates a new SaleRepository scoped to one store.
    pub fn new(pool: SqlitePool, store_id: impl Into<String>) -> Self {
        SaleRepository {
            pool,
            store_id: store_id.into(),
        }
    }

    /// Lists all sales, newest first, with their items.
    ///
    /// Two queries: headers, then every item of the store grouped by sale.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, store_id, date, total_cents, total_profit_cents, customer_name, status
            FROM sales
            WHERE store_id = ?1
            ORDER BY date DESC, id
            "#,
        )
        .bind(&self.store_id)
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT i.sale_id, i.product_id, i.name, i.price_cents, i.cost_cents, i.quantity
            FROM sale_items i
            JOIN sales s ON s.id = i.sale_id
            WHERE s.store_id = ?1
            ORDER BY i.sale_id, i.position
            "#,
        )
        .bind(&self.store_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            items_by_sale
                .entry(row.sale_id.clone())
                .or_default()
                .push(row.into_item());
        }

        let sales: Vec<Sale> = rows
            .into_iter()
            .map(|row| {
                let items = items_by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect();

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets a sale by ID, with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, store_id, date, total_cents, total_profit_cents, customer_name, status
            FROM sales
            WHERE id = ?1 AND store_id = ?2
            "#,
        )
        .bind(id)
        .bind(&self.store_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT product_id, name, price_cents, cost_cents, quantity
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_sale(items)))
    }

    /// Rewrites the status of a sale. Nothing else on the row changes.
    pub async fn update_status(&self, id: &str, status: SaleStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE sales SET status = ?2 WHERE id = ?1 AND store_id = ?3")
            .bind(id)
            .bind(status)
            .bind(&self.store_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        debug!(id = %id, status = %status, "Sale status updated");
        Ok(())
    }

    /// Inserts a sale and its items on an open transaction.
    pub async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, items = sale.items.len(), "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, store_id, date,
                total_cents, total_profit_cents,
                customer_name, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.store_id)
        .bind(sale.date)
        .bind(sale.total_cents)
        .bind(sale.total_profit_cents)
        .bind(&sale.customer_name)
        .bind(sale.status)
        .execute(&mut *conn)
        .await?;

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, product_id, name,
                    price_cents, cost_cents, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&sale.id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.price_cents)
            .bind(item.cost_cents)
            .bind(item.quantity)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Deletes a sale on an open transaction. Its items cascade.
    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        // The cascade only fires with foreign_keys enabled.
        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        debug!(id = %id, "Sale deleted");
        Ok(())
    }
}
