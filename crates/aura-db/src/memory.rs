//! In-process store.
//!
//! Used by tests and demos. A batch is applied to a copy of the state and
//! the copy replaces the live state only if every operation succeeded, so
//! a failure midway leaves nothing behind.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::debug;

use aura_core::{BatchOp, Product, ProductPatch, Sale, SaleStatus, StockGuard, Withdrawal};

use crate::error::{DbError, DbResult};
use crate::store::{ChangeFeed, Store, StoreChange};

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<String, Product>,
    sales: HashMap<String, Sale>,
    withdrawals: HashMap<String, Withdrawal>,
}

impl State {
    fn apply(&mut self, op: &BatchOp) -> DbResult<()> {
        match op {
            BatchOp::InsertSale(sale) => {
                if self.sales.contains_key(&sale.id) {
                    return Err(DbError::UniqueViolation {
                        field: "sales.id".to_string(),
                        value: sale.id.clone(),
                    });
                }
                self.sales.insert(sale.id.clone(), sale.clone());
            }
            BatchOp::DeleteSale(id) => {
                self.sales
                    .remove(id)
                    .ok_or_else(|| DbError::not_found("Sale", id.as_str()))?;
            }
            BatchOp::AdjustStock {
                product_id,
                delta,
                guard,
            } => {
                let product = self
                    .products
                    .get_mut(product_id)
                    .ok_or_else(|| DbError::not_found("Product", product_id.as_str()))?;
                let new_stock = product.stock + delta;
                if *guard == StockGuard::NonNegative && new_stock < 0 {
                    return Err(DbError::StockConflict {
                        product_id: product_id.clone(),
                        available: product.stock,
                        requested: -delta,
                    });
                }
                product.stock = new_stock;
                product.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

/// Failure injection for the next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    /// Reject before applying anything.
    RejectBatch,
    /// Apply this many operations, then fail.
    FailAfter(usize),
}

/// A [`Store`] kept entirely in memory.
///
/// ## Usage
/// ```rust
/// use aura_db::MemoryStore;
///
/// let store = MemoryStore::new();
/// // the next checkout against this store will fail and write nothing
/// store.fail_next_batch();
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fault: Mutex<Option<Fault>>,
    feed: ChangeFeed,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            for p in products {
                state.products.insert(p.id.clone(), p);
            }
        }
        store
    }

    /// Makes the next `atomic_batch` call fail without applying anything.
    pub fn fail_next_batch(&self) {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = Some(Fault::RejectBatch);
        }
    }

    /// Makes the next `atomic_batch` call fail after `applied` operations
    /// have been staged. Used to prove partial batches never leak.
    pub fn fail_next_batch_after(&self, applied: usize) {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = Some(Fault::FailAfter(applied));
        }
    }

    fn state(&self) -> DbResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| DbError::Internal("memory store lock poisoned".to_string()))
    }

    fn take_fault(&self) -> DbResult<Option<Fault>> {
        let mut fault = self
            .fault
            .lock()
            .map_err(|_| DbError::Internal("memory store lock poisoned".to_string()))?;
        Ok(fault.take())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_products(&self) -> DbResult<Vec<Product>> {
        let mut products: Vec<Product> = self.state()?.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        Ok(self.state()?.products.get(id).cloned())
    }

    async fn create_product(&self, product: &Product) -> DbResult<()> {
        {
            let mut state = self.state()?;
            if state.products.contains_key(&product.id) {
                return Err(DbError::UniqueViolation {
                    field: "products.id".to_string(),
                    value: product.id.clone(),
                });
            }
            state.products.insert(product.id.clone(), product.clone());
        }
        self.feed.publish(StoreChange::ProductCreated {
            id: product.id.clone(),
        });
        Ok(())
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        let updated = {
            let mut state = self.state()?;
            let product = state
                .products
                .get_mut(id)
                .ok_or_else(|| DbError::not_found("Product", id))?;
            patch.apply_to(product);
            product.updated_at = Utc::now();
            product.clone()
        };
        self.feed.publish(StoreChange::ProductUpdated { id: id.to_string() });
        Ok(updated)
    }

    async fn delete_product(&self, id: &str) -> DbResult<()> {
        self.state()?
            .products
            .remove(id)
            .ok_or_else(|| DbError::not_found("Product", id))?;
        self.feed.publish(StoreChange::ProductDeleted { id: id.to_string() });
        Ok(())
    }

    async fn list_sales(&self) -> DbResult<Vec<Sale>> {
        let mut sales: Vec<Sale> = self.state()?.sales.values().cloned().collect();
        sales.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(sales)
    }

    async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>> {
        Ok(self.state()?.sales.get(id).cloned())
    }

    async fn update_sale_status(&self, id: &str, status: SaleStatus) -> DbResult<()> {
        {
            let mut state = self.state()?;
            let sale = state
                .sales
                .get_mut(id)
                .ok_or_else(|| DbError::not_found("Sale", id))?;
            sale.status = status;
        }
        self.feed.publish(StoreChange::SaleStatusChanged {
            id: id.to_string(),
            status,
        });
        Ok(())
    }

    async fn list_withdrawals(&self) -> DbResult<Vec<Withdrawal>> {
        let mut withdrawals: Vec<Withdrawal> = self.state()?.withdrawals.values().cloned().collect();
        withdrawals.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(withdrawals)
    }

    async fn create_withdrawal(&self, withdrawal: &Withdrawal) -> DbResult<()> {
        self.state()?
            .withdrawals
            .insert(withdrawal.id.clone(), withdrawal.clone());
        self.feed.publish(StoreChange::WithdrawalCreated {
            id: withdrawal.id.clone(),
        });
        Ok(())
    }

    async fn delete_withdrawal(&self, id: &str) -> DbResult<()> {
        self.state()?
            .withdrawals
            .remove(id)
            .ok_or_else(|| DbError::not_found("Withdrawal", id))?;
        self.feed.publish(StoreChange::WithdrawalDeleted { id: id.to_string() });
        Ok(())
    }

    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> DbResult<()> {
        let fault = self.take_fault()?;
        if fault == Some(Fault::RejectBatch) {
            debug!(ops = ops.len(), "Injected batch rejection");
            return Err(DbError::BatchRejected("injected failure".to_string()));
        }

        {
            let mut state = self.state()?;
            let mut staged = state.clone();

            for (applied, op) in ops.iter().enumerate() {
                if fault == Some(Fault::FailAfter(applied)) {
                    debug!(applied, "Injected failure mid-batch");
                    return Err(DbError::BatchRejected(format!(
                        "injected failure after {} operations",
                        applied
                    )));
                }
                staged.apply(op)?;
            }

            *state = staged;
        }

        debug!(ops = ops.len(), "Memory batch committed");
        self.feed.publish_batch(&ops);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{SaleItem, STORE_ID};

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            store_id: STORE_ID.to_string(),
            name: format!("Producto {}", id),
            category: "General".to_string(),
            cost_cents: 100,
            price_cents: 340,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(id: &str) -> Sale {
        Sale {
            id: id.to_string(),
            store_id: STORE_ID.to_string(),
            date: Utc::now(),
            items: vec![SaleItem {
                product_id: "a".to_string(),
                name: "Producto a".to_string(),
                price_cents: 340,
                cost_cents: 100,
                quantity: 1,
            }],
            total_cents: 340,
            total_profit_cents: 240,
            customer_name: "Cliente Casual".to_string(),
            status: SaleStatus::Paid,
        }
    }

    fn decrement(id: &str, by: i64, guard: StockGuard) -> BatchOp {
        BatchOp::AdjustStock {
            product_id: id.to_string(),
            delta: -by,
            guard,
        }
    }

    #[tokio::test]
    async fn test_batch_commits_all_ops() {
        let store = MemoryStore::with_products([product("a", 5)]);
        let mut rx = store.subscribe();

        store
            .atomic_batch(vec![
                BatchOp::InsertSale(sale("s-1")),
                decrement("a", 1, StockGuard::Unchecked),
            ])
            .await
            .unwrap();

        assert_eq!(store.get_product("a").await.unwrap().unwrap().stock, 4);
        assert!(store.get_sale("s-1").await.unwrap().is_some());
        assert_eq!(rx.recv().await.unwrap(), StoreChange::SaleCreated { id: "s-1".to_string() });
    }

    #[tokio::test]
    async fn test_missing_product_rolls_back_batch() {
        let store = MemoryStore::with_products([product("a", 5)]);

        let err = store
            .atomic_batch(vec![
                BatchOp::InsertSale(sale("s-1")),
                decrement("a", 1, StockGuard::Unchecked),
                decrement("missing", 1, StockGuard::Unchecked),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(store.get_product("a").await.unwrap().unwrap().stock, 5);
        assert!(store.get_sale("s-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unchecked_decrement_can_go_negative() {
        let store = MemoryStore::with_products([product("a", 1)]);
        store
            .atomic_batch(vec![decrement("a", 3, StockGuard::Unchecked)])
            .await
            .unwrap();
        assert_eq!(store.get_product("a").await.unwrap().unwrap().stock, -2);
    }

    #[tokio::test]
    async fn test_guarded_decrement_conflicts() {
        let store = MemoryStore::with_products([product("a", 1)]);
        let err = store
            .atomic_batch(vec![decrement("a", 2, StockGuard::NonNegative)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StockConflict { available: 1, requested: 2, .. }));
        assert_eq!(store.get_product("a").await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_injected_faults_are_one_shot() {
        let store = MemoryStore::with_products([product("a", 5)]);

        store.fail_next_batch_after(1);
        let ops = vec![
            BatchOp::InsertSale(sale("s-1")),
            decrement("a", 1, StockGuard::Unchecked),
        ];
        assert!(store.atomic_batch(ops.clone()).await.is_err());
        assert!(store.get_sale("s-1").await.unwrap().is_none());

        store.atomic_batch(ops).await.unwrap();
        assert!(store.get_sale("s-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sales_listed_newest_first() {
        let store = MemoryStore::new();
        let mut older = sale("old");
        older.date = Utc::now() - chrono::Duration::hours(1);
        store
            .atomic_batch(vec![BatchOp::InsertSale(older), BatchOp::InsertSale(sale("new"))])
            .await
            .unwrap();

        let ids: Vec<String> = store.list_sales().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["new", "old"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let store = MemoryStore::new();
        assert!(store.delete_product("x").await.is_err());
        assert!(store.delete_withdrawal("x").await.is_err());
        assert!(store.update_sale_status("x", SaleStatus::Pending).await.is_err());
        assert!(store
            .update_product("x", &ProductPatch::default())
            .await
            .is_err());
    }
}
