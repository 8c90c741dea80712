//! # Store Interface
//!
//! The collaborator the sale engine writes through. Two implementations
//! ship with this crate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         trait Store                                     │
//! │                                                                         │
//! │   ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │   │  Database (pool.rs)      │        │  MemoryStore (memory.rs) │      │
//! │   │  SQLite via sqlx         │        │  HashMaps behind a Mutex │      │
//! │   │  batch = 1 transaction   │        │  batch = stage + swap    │      │
//! │   └────────────┬─────────────┘        └────────────┬─────────────┘      │
//! │                │                                   │                    │
//! │                └──────────► ChangeFeed ◄───────────┘                    │
//! │                        broadcast::Sender<StoreChange>                   │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                      subscribers re-read and re-render                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Changes are published only after a write has committed. A subscriber
//! that falls behind receives `RecvError::Lagged` and should re-read
//! everything.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use aura_core::{BatchOp, Product, ProductPatch, Sale, SaleStatus, Withdrawal};

use crate::error::DbResult;

/// Capacity of the change channel before slow subscribers start lagging.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Store Changes
// =============================================================================

/// Which collection a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Products,
    Sales,
    Withdrawals,
}

/// A committed write, pushed to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreChange {
    ProductCreated { id: String },
    ProductUpdated { id: String },
    ProductDeleted { id: String },
    StockAdjusted { product_id: String, delta: i64 },
    SaleCreated { id: String },
    SaleDeleted { id: String },
    SaleStatusChanged { id: String, status: SaleStatus },
    WithdrawalCreated { id: String },
    WithdrawalDeleted { id: String },
}

impl StoreChange {
    pub fn collection(&self) -> Collection {
        match self {
            StoreChange::ProductCreated { .. }
            | StoreChange::ProductUpdated { .. }
            | StoreChange::ProductDeleted { .. }
            | StoreChange::StockAdjusted { .. } => Collection::Products,
            StoreChange::SaleCreated { .. }
            | StoreChange::SaleDeleted { .. }
            | StoreChange::SaleStatusChanged { .. } => Collection::Sales,
            StoreChange::WithdrawalCreated { .. } | StoreChange::WithdrawalDeleted { .. } => {
                Collection::Withdrawals
            }
        }
    }

    /// The change a committed batch operation produces.
    pub fn from_op(op: &BatchOp) -> StoreChange {
        match op {
            BatchOp::InsertSale(sale) => StoreChange::SaleCreated { id: sale.id.clone() },
            BatchOp::DeleteSale(id) => StoreChange::SaleDeleted { id: id.clone() },
            BatchOp::AdjustStock {
                product_id, delta, ..
            } => StoreChange::StockAdjusted {
                product_id: product_id.clone(),
                delta: *delta,
            },
        }
    }
}

/// Fan-out of committed changes.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<StoreChange>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        ChangeFeed { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.tx.subscribe()
    }

    /// Publishes a change. Having no subscribers is not an error.
    pub fn publish(&self, change: StoreChange) {
        trace!(?change, "Publishing store change");
        let _ = self.tx.send(change);
    }

    pub fn publish_batch(&self, ops: &[BatchOp]) {
        for op in ops {
            self.publish(StoreChange::from_op(op));
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Persistent state of the store: catalog, sale ledger, withdrawal ledger.
///
/// ## Contract
/// - Reads reflect the latest committed state.
/// - `atomic_batch` applies every operation or none.
/// - Every committed write publishes its [`StoreChange`]s afterwards.
/// - Inputs are already validated by the caller (see `aura_core`).
#[async_trait]
pub trait Store: Send + Sync {
    // ---- Catalog -----------------------------------------------------------

    /// All products, ordered by name.
    async fn list_products(&self) -> DbResult<Vec<Product>>;

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>>;

    /// Inserts a fully built product.
    async fn create_product(&self, product: &Product) -> DbResult<()>;

    /// Applies a patch and bumps `updated_at`. Returns the updated product.
    async fn update_product(&self, id: &str, patch: &ProductPatch) -> DbResult<Product>;

    /// Deletes a product. Past sales that reference it are kept.
    async fn delete_product(&self, id: &str) -> DbResult<()>;

    // ---- Sale ledger -------------------------------------------------------

    /// All sales, newest first.
    async fn list_sales(&self) -> DbResult<Vec<Sale>>;

    async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>>;

    /// Rewrites the status field and nothing else.
    async fn update_sale_status(&self, id: &str, status: SaleStatus) -> DbResult<()>;

    // ---- Withdrawal ledger -------------------------------------------------

    /// All withdrawals, newest first.
    async fn list_withdrawals(&self) -> DbResult<Vec<Withdrawal>>;

    async fn create_withdrawal(&self, withdrawal: &Withdrawal) -> DbResult<()>;

    async fn delete_withdrawal(&self, id: &str) -> DbResult<()>;

    // ---- Transactions ------------------------------------------------------

    /// Applies all operations atomically.
    ///
    /// ## Errors
    /// - `NotFound` when a stock adjustment names a missing product or a
    ///   delete names a missing sale
    /// - `StockConflict` when a guarded decrement would go negative
    /// - `BatchRejected` / `TransactionFailed` for store failures
    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> DbResult<()>;

    // ---- Notifications -----------------------------------------------------

    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::StockGuard;

    #[test]
    fn test_change_from_op() {
        let op = BatchOp::AdjustStock {
            product_id: "p-1".to_string(),
            delta: -2,
            guard: StockGuard::Unchecked,
        };
        let change = StoreChange::from_op(&op);
        assert_eq!(
            change,
            StoreChange::StockAdjusted {
                product_id: "p-1".to_string(),
                delta: -2
            }
        );
        assert_eq!(change.collection(), Collection::Products);
        assert_eq!(
            StoreChange::from_op(&BatchOp::DeleteSale("s-1".to_string())).collection(),
            Collection::Sales
        );
    }

    #[tokio::test]
    async fn test_feed_delivers_in_order() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.publish(StoreChange::SaleCreated { id: "a".to_string() });
        feed.publish(StoreChange::SaleDeleted { id: "a".to_string() });

        assert_eq!(rx.recv().await.unwrap(), StoreChange::SaleCreated { id: "a".to_string() });
        assert_eq!(rx.recv().await.unwrap(), StoreChange::SaleDeleted { id: "a".to_string() });
    }

    #[test]
    fn test_publish_without_subscribers() {
        ChangeFeed::new().publish(StoreChange::ProductDeleted { id: "x".to_string() });
    }

    #[test]
    fn test_change_serializes_with_tag() {
        let json = serde_json::to_value(StoreChange::SaleStatusChanged {
            id: "s-1".to_string(),
            status: SaleStatus::Pending,
        })
        .unwrap();
        assert_eq!(json["type"], "sale_status_changed");
        assert_eq!(json["status"], "Pendiente");
    }
}
