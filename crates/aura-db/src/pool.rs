//! # Database Pool Management
//!
//! Connection pool creation and the SQLite-backed [`Store`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Startup                                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  atomic_batch ──► BEGIN … COMMIT on one connection                     │
//! │                   └── committed → ChangeFeed::publish_batch            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases run in WAL mode so readers never block the single
//! writer. In-memory databases keep the default journal.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use aura_core::{BatchOp, Product, ProductPatch, Sale, SaleStatus, Withdrawal, STORE_ID};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::withdrawal::WithdrawalRepository;
use crate::store::{ChangeFeed, Store, StoreChange};

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/aura.db")
///     .store_id("aura-beauty-store")
///     .max_connections(5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Store every record is scoped to.
    /// Default: `aura_core::STORE_ID`
    pub store_id: String,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections
    /// forever, which an in-memory database needs.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            store_id: STORE_ID.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    pub fn store_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = store_id.into();
        self
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated and vanishes with the pool
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            store_id: STORE_ID.to_string(),
            max_connections: 1, // Every connection would get its own database
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        Ok(options.foreign_keys(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// SQLite database handle. Implements [`Store`].
///
/// Cheap to clone: the pool and the change feed are both shared handles.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
    store_id: String,
    feed: ChangeFeed,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite (WAL, NORMAL synchronous, foreign keys)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            store_id = %config.store_id,
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            store_id: config.store_id,
            feed: ChangeFeed::new(),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.store_id.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.store_id.clone())
    }

    pub fn withdrawals(&self) -> WithdrawalRepository {
        WithdrawalRepository::new(self.pool.clone(), self.store_id.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, every store operation fails.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl Store for Database {
    async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.products().list().await
    }

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        self.products().get_by_id(id).await
    }

    async fn create_product(&self, product: &Product) -> DbResult<()> {
        self.products().insert(product).await?;
        self.feed.publish(StoreChange::ProductCreated {
            id: product.id.clone(),
        });
        Ok(())
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        let product = self.products().update(id, patch).await?;
        self.feed.publish(StoreChange::ProductUpdated { id: id.to_string() });
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> DbResult<()> {
        self.products().delete(id).await?;
        self.feed.publish(StoreChange::ProductDeleted { id: id.to_string() });
        Ok(())
    }

    async fn list_sales(&self) -> DbResult<Vec<Sale>> {
        self.sales().list().await
    }

    async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>> {
        self.sales().get_by_id(id).await
    }

    async fn update_sale_status(&self, id: &str, status: SaleStatus) -> DbResult<()> {
        self.sales().update_status(id, status).await?;
        self.feed.publish(StoreChange::SaleStatusChanged {
            id: id.to_string(),
            status,
        });
        Ok(())
    }

    async fn list_withdrawals(&self) -> DbResult<Vec<Withdrawal>> {
        self.withdrawals().list().await
    }

    async fn create_withdrawal(&self, withdrawal: &Withdrawal) -> DbResult<()> {
        self.withdrawals().insert(withdrawal).await?;
        self.feed.publish(StoreChange::WithdrawalCreated {
            id: withdrawal.id.clone(),
        });
        Ok(())
    }

    async fn delete_withdrawal(&self, id: &str) -> DbResult<()> {
        self.withdrawals().delete(id).await?;
        self.feed.publish(StoreChange::WithdrawalDeleted { id: id.to_string() });
        Ok(())
    }

    /// Runs every operation inside one transaction.
    ///
    /// Dropping the transaction on the error path rolls it back.
    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (index, op) in ops.iter().enumerate() {
            let applied = match op {
                BatchOp::InsertSale(sale) => SaleRepository::insert(&mut *tx, sale).await,
                BatchOp::DeleteSale(id) => SaleRepository::delete(&mut *tx, id).await,
                BatchOp::AdjustStock {
                    product_id,
                    delta,
                    guard,
                } => ProductRepository::adjust_stock(&mut *tx, product_id, *delta, *guard).await,
            };

            if let Err(e) = applied {
                warn!(index, op = op.kind(), error = %e, "Batch rolled back");
                return Err(e);
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(ops = ops.len(), "Batch committed");
        self.feed.publish_batch(&ops);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.feed.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{ProductDraft, SaleItem, StockGuard, WithdrawalKind};
    use chrono::{Duration as ChronoDuration, Utc};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product(id: &str, stock: i64) -> Product {
        ProductDraft {
            name: format!("Labial {}", id),
            category: Some("Maquillaje".to_string()),
            cost_cents: 2500,
            price_cents: Some(8500),
            stock,
        }
        .into_product(id.to_string(), STORE_ID, Utc::now())
        .unwrap()
    }

    fn sale(id: &str, product_id: &str, quantity: i64) -> Sale {
        Sale {
            id: id.to_string(),
            store_id: STORE_ID.to_string(),
            date: Utc::now(),
            items: vec![SaleItem {
                product_id: product_id.to_string(),
                name: format!("Labial {}", product_id),
                price_cents: 8500,
                cost_cents: 2500,
                quantity,
            }],
            total_cents: 8500 * quantity,
            total_profit_cents: 6000 * quantity,
            customer_name: "Cliente Casual".to_string(),
            status: SaleStatus::Paid,
        }
    }

    fn decrement(product_id: &str, by: i64, guard: StockGuard) -> BatchOp {
        BatchOp::AdjustStock {
            product_id: product_id.to_string(),
            delta: -by,
            guard,
        }
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = db().await;
        assert!(db.health_check().await);
        assert_eq!(db.store_id(), STORE_ID);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/aura.db")
            .store_id("otra-tienda")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.store_id, "otra-tienda");
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_product_crud() {
        let db = db().await;
        db.create_product(&product("a", 3)).await.unwrap();
        db.create_product(&product("b", 1)).await.unwrap();

        let listed = db.list_products().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Labial a");

        let patch = ProductPatch {
            price_cents: Some(9000),
            ..Default::default()
        };
        let updated = db.update_product("a", &patch).await.unwrap();
        assert_eq!(updated.price_cents, 9000);
        assert_eq!(updated.stock, 3);
        assert_eq!(db.get_product("a").await.unwrap().unwrap().price_cents, 9000);

        db.delete_product("b").await.unwrap();
        assert!(db.get_product("b").await.unwrap().is_none());
        assert!(matches!(
            db.delete_product("b").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_batch_inserts_sale_and_decrements_stock() {
        let db = db().await;
        db.create_product(&product("a", 5)).await.unwrap();
        let mut rx = db.subscribe();

        db.atomic_batch(vec![
            BatchOp::InsertSale(sale("s-1", "a", 2)),
            decrement("a", 2, StockGuard::Unchecked),
        ])
        .await
        .unwrap();

        assert_eq!(db.get_product("a").await.unwrap().unwrap().stock, 3);
        let stored = db.get_sale("s-1").await.unwrap().unwrap();
        let mut expected = sale("s-1", "a", 2);
        expected.date = stored.date;
        assert_eq!(stored, expected);

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreChange::SaleCreated { id: "s-1".to_string() }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreChange::StockAdjusted {
                product_id: "a".to_string(),
                delta: -2
            }
        );
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_nothing_behind() {
        let db = db().await;
        db.create_product(&product("a", 5)).await.unwrap();

        let result = db
            .atomic_batch(vec![
                BatchOp::InsertSale(sale("s-1", "a", 1)),
                decrement("a", 1, StockGuard::Unchecked),
                decrement("missing", 1, StockGuard::Unchecked),
            ])
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert!(db.get_sale("s-1").await.unwrap().is_none());
        assert_eq!(db.get_product("a").await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_guarded_decrement_conflict_rolls_back() {
        let db = db().await;
        db.create_product(&product("a", 1)).await.unwrap();

        let result = db
            .atomic_batch(vec![
                BatchOp::InsertSale(sale("s-1", "a", 2)),
                decrement("a", 2, StockGuard::NonNegative),
            ])
            .await;

        match result {
            Err(DbError::StockConflict {
                available, requested, ..
            }) => {
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("expected stock conflict, got {:?}", other),
        }
        assert!(db.list_sales().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unchecked_decrement_may_go_negative() {
        let db = db().await;
        db.create_product(&product("a", 1)).await.unwrap();

        db.atomic_batch(vec![decrement("a", 3, StockGuard::Unchecked)])
            .await
            .unwrap();

        assert_eq!(db.get_product("a").await.unwrap().unwrap().stock, -2);
    }

    #[tokio::test]
    async fn test_sales_listed_newest_first_with_items() {
        let db = db().await;
        db.create_product(&product("a", 10)).await.unwrap();

        let mut older = sale("old", "a", 1);
        older.date = Utc::now() - ChronoDuration::hours(2);
        let newer = sale("new", "a", 3);

        db.atomic_batch(vec![BatchOp::InsertSale(older)]).await.unwrap();
        db.atomic_batch(vec![BatchOp::InsertSale(newer)]).await.unwrap();

        let sales = db.list_sales().await.unwrap();
        let ids: Vec<&str> = sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(sales[0].items[0].quantity, 3);
        assert_eq!(sales[1].items[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_status_update_and_sale_delete() {
        let db = db().await;
        db.create_product(&product("a", 10)).await.unwrap();
        db.atomic_batch(vec![BatchOp::InsertSale(sale("s-1", "a", 1))])
            .await
            .unwrap();

        db.update_sale_status("s-1", SaleStatus::Pending).await.unwrap();
        let stored = db.get_sale("s-1").await.unwrap().unwrap();
        assert_eq!(stored.status, SaleStatus::Pending);
        assert_eq!(stored.total_cents, 8500);

        db.atomic_batch(vec![BatchOp::DeleteSale("s-1".to_string())])
            .await
            .unwrap();
        assert!(db.get_sale("s-1").await.unwrap().is_none());

        assert!(matches!(
            db.update_sale_status("s-1", SaleStatus::Paid).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sale_survives_product_delete() {
        let db = db().await;
        db.create_product(&product("a", 10)).await.unwrap();
        db.atomic_batch(vec![BatchOp::InsertSale(sale("s-1", "a", 1))])
            .await
            .unwrap();

        db.delete_product("a").await.unwrap();

        let stored = db.get_sale("s-1").await.unwrap().unwrap();
        assert_eq!(stored.items[0].name, "Labial a");
    }

    #[tokio::test]
    async fn test_withdrawal_roundtrip() {
        let db = db().await;
        let withdrawal = Withdrawal {
            id: "w-1".to_string(),
            store_id: STORE_ID.to_string(),
            date: Utc::now(),
            kind: WithdrawalKind::CompanyExpense,
            beneficiary: "Company".to_string(),
            amount_cents: 5000,
            description: "Bolsas".to_string(),
        };

        db.create_withdrawal(&withdrawal).await.unwrap();
        let listed = db.list_withdrawals().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, WithdrawalKind::CompanyExpense);
        assert_eq!(listed[0].amount_cents, 5000);

        db.delete_withdrawal("w-1").await.unwrap();
        assert!(db.list_withdrawals().await.unwrap().is_empty());
    }
}
