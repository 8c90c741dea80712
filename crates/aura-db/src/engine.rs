//! # Sale Engine
//!
//! Runs the pure plans from `aura_core` against a [`Store`].
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SaleEngine<S: Store>                             │
//! │                                                                         │
//! │  commit_sale(cart)                                                     │
//! │     ├── plan_commit(cart) ──► [InsertSale, AdjustStock(-q) …]          │
//! │     ├── store.atomic_batch(ops)   all or nothing                       │
//! │     └── Ok → cart.clear()         Err → cart untouched                 │
//! │                                                                         │
//! │  reverse_sale(sale)                                                    │
//! │     ├── catalog ids ──► plan_reversal ──► [AdjustStock(+q) …, Delete]  │
//! │     ├── store.atomic_batch(ops)                                        │
//! │     └── ReversalReport { restored, skipped }                           │
//! │                                                                         │
//! │  distribution() / record_withdrawal()                                  │
//! │     └── re-read both ledgers, Distribution::compute, never cached      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is passed in; there is no global client.

use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use aura_core::ledger::{plan_commit, plan_reversal};
use aura_core::summary::low_stock;
use aura_core::validation::validate_patch;
use aura_core::{
    Cart, Confirmation, Distribution, InventorySummary, Product, ProductDraft, ProductPatch,
    ProfitSplit, Sale, SaleHeader, SaleItem, SaleStatus, StockGuard, Withdrawal, WithdrawalCheck,
    WithdrawalOutcome, WithdrawalRequest, LOW_STOCK_THRESHOLD, STORE_ID,
};

use crate::error::{DbError, EngineResult};
use crate::store::Store;

// =============================================================================
// Options
// =============================================================================

/// Knobs the engine reads on every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Store every new record is written under.
    pub store_id: String,
    /// Policy for checkout stock decrements.
    pub stock_guard: StockGuard,
    /// Products with stock below this count as low stock.
    pub low_stock_threshold: i64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            store_id: STORE_ID.to_string(),
            stock_guard: StockGuard::default(),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

/// Outcome of a reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReversalReport {
    pub sale_id: String,
    /// `(product_id, quantity)` put back on the shelf.
    pub restored: Vec<(String, i64)>,
    /// Lines whose product was deleted. Their stock could not be restored.
    pub skipped: Vec<SaleItem>,
}

impl ReversalReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Entry point for every mutating operation of the POS.
pub struct SaleEngine<S: Store> {
    store: S,
    split: ProfitSplit,
    options: EngineOptions,
}

impl<S: Store> SaleEngine<S> {
    /// Creates an engine with the default partner split and options.
    pub fn new(store: S) -> Self {
        Self::with_options(store, ProfitSplit::default(), EngineOptions::default())
    }

    pub fn with_options(store: S, split: ProfitSplit, options: EngineOptions) -> Self {
        SaleEngine {
            store,
            split,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn split(&self) -> &ProfitSplit {
        &self.split
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // ---- Catalog -----------------------------------------------------------

    pub async fn products(&self) -> EngineResult<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    /// Validates a draft and stores the product it builds.
    pub async fn create_product(&self, draft: ProductDraft) -> EngineResult<Product> {
        let product = draft.into_product(Uuid::new_v4().to_string(), &self.options.store_id, Utc::now())?;
        self.store.create_product(&product).await?;

        info!(
            id = %product.id,
            name = %product.name,
            price = %product.price(),
            stock = product.stock,
            "Product created"
        );
        Ok(product)
    }

    pub async fn update_product(&self, id: &str, patch: ProductPatch) -> EngineResult<Product> {
        validate_patch(&patch)?;
        let product = self.store.update_product(id, &patch).await?;

        info!(id = %id, "Product updated");
        Ok(product)
    }

    /// Deletes a product. Its past sales keep their snapshot.
    pub async fn delete_product(&self, id: &str) -> EngineResult<()> {
        self.store.delete_product(id).await?;
        info!(id = %id, "Product deleted");
        Ok(())
    }

    // ---- Cart --------------------------------------------------------------

    /// Adds one unit of a product to the cart, using the product's live
    /// stock for the guard.
    pub async fn add_to_cart(&self, cart: &mut Cart, product_id: &str) -> EngineResult<()> {
        let product = self.require_product(product_id).await?;
        cart.add_product(&product)?;
        debug!(product_id = %product_id, lines = cart.line_count(), "Added to cart");
        Ok(())
    }

    /// Changes the quantity of a cart line by `delta`, checked against
    /// the product's live stock.
    pub async fn update_cart_quantity(&self, cart: &mut Cart, product_id: &str, delta: i64) -> EngineResult<()> {
        let product = self.require_product(product_id).await?;
        cart.update_quantity(&product, delta)?;
        Ok(())
    }

    // ---- Sales -------------------------------------------------------------

    pub async fn sales(&self) -> EngineResult<Vec<Sale>> {
        Ok(self.store.list_sales().await?)
    }

    /// Commits the cart as one sale.
    ///
    /// ## Behavior
    /// - Empty cart: `CoreError::EmptyCart`, nothing written
    /// - Sale insert and every stock decrement go in one batch
    /// - Success clears the cart; failure leaves it as it was
    ///
    /// Stock is not re-read here. The cart guards are advisory and the
    /// configured [`StockGuard`] decides what the store enforces.
    pub async fn commit_sale(
        &self,
        cart: &mut Cart,
        customer_name: Option<&str>,
        status: Option<SaleStatus>,
    ) -> EngineResult<Sale> {
        let header = SaleHeader {
            id: Uuid::new_v4().to_string(),
            store_id: &self.options.store_id,
            date: Utc::now(),
            customer_name,
            status: status.unwrap_or_default(),
        };
        let plan = plan_commit(cart, header, self.options.stock_guard)?;

        if let Err(e) = self.store.atomic_batch(plan.ops).await {
            warn!(sale_id = %plan.sale.id, error = %e, "Sale commit failed, cart kept");
            return Err(e.into());
        }

        cart.clear();
        info!(
            sale_id = %plan.sale.id,
            total = %plan.sale.total(),
            profit = %plan.sale.total_profit(),
            items = plan.sale.items.len(),
            status = %plan.sale.status,
            "Sale committed"
        );
        Ok(plan.sale)
    }

    /// Undoes a sale: puts its units back and deletes the record.
    ///
    /// Lines whose product has since been deleted are skipped and reported;
    /// the sale is deleted anyway.
    pub async fn reverse_sale(&self, sale: &Sale) -> EngineResult<ReversalReport> {
        let existing: HashSet<String> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let plan = plan_reversal(sale, &existing);
        let restored: Vec<(String, i64)> = sale
            .items
            .iter()
            .filter(|item| existing.contains(&item.product_id))
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();

        self.store.atomic_batch(plan.ops).await?;

        for item in &plan.skipped {
            warn!(
                sale_id = %sale.id,
                product_id = %item.product_id,
                name = %item.name,
                quantity = item.quantity,
                "Product no longer exists, stock not restored"
            );
        }
        info!(
            sale_id = %sale.id,
            restored = restored.len(),
            skipped = plan.skipped.len(),
            "Sale reversed"
        );

        Ok(ReversalReport {
            sale_id: sale.id.clone(),
            restored,
            skipped: plan.skipped,
        })
    }

    /// Moves a sale to the next status in the cycle and returns it.
    pub async fn advance_sale_status(&self, sale_id: &str) -> EngineResult<SaleStatus> {
        let sale = self
            .store
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        let next = sale.status.next();
        self.store.update_sale_status(sale_id, next).await?;

        info!(sale_id = %sale_id, from = %sale.status, to = %next, "Sale status advanced");
        Ok(next)
    }

    /// Sets a sale's status directly.
    pub async fn set_sale_status(&self, sale_id: &str, status: SaleStatus) -> EngineResult<()> {
        self.store.update_sale_status(sale_id, status).await?;
        info!(sale_id = %sale_id, status = %status, "Sale status set");
        Ok(())
    }

    // ---- Partners ----------------------------------------------------------

    pub async fn withdrawals(&self) -> EngineResult<Vec<Withdrawal>> {
        Ok(self.store.list_withdrawals().await?)
    }

    /// Current profit distribution, recomputed from both ledgers.
    pub async fn distribution(&self) -> EngineResult<Distribution> {
        let sales = self.store.list_sales().await?;
        let withdrawals = self.store.list_withdrawals().await?;
        Ok(Distribution::compute(&sales, &withdrawals, &self.split))
    }

    /// Records a partner payment or company expense.
    ///
    /// An amount above cash in hand needs `Confirmation::Confirmed`;
    /// without it nothing is written and `NeedsConfirmation` comes back.
    pub async fn record_withdrawal(
        &self,
        request: WithdrawalRequest,
        confirmation: Confirmation,
    ) -> EngineResult<WithdrawalOutcome> {
        request.validate(&self.split)?;

        let cash_in_hand = self.distribution().await?.cash_in_hand;
        let check = WithdrawalCheck::evaluate(request.amount(), cash_in_hand);
        if check.blocks(confirmation) {
            debug!(amount = %request.amount(), cash_in_hand = %cash_in_hand, "Withdrawal awaits confirmation");
            return Ok(WithdrawalOutcome::NeedsConfirmation {
                amount: request.amount(),
                cash_in_hand,
            });
        }
        if check != WithdrawalCheck::WithinCash {
            warn!(amount = %request.amount(), cash_in_hand = %cash_in_hand, "Confirmed withdrawal exceeds cash in hand");
        }

        let withdrawal = request.into_withdrawal(
            Uuid::new_v4().to_string(),
            &self.options.store_id,
            Utc::now(),
            &self.split,
        )?;
        self.store.create_withdrawal(&withdrawal).await?;

        info!(
            id = %withdrawal.id,
            kind = withdrawal.kind.as_str(),
            beneficiary = %withdrawal.beneficiary,
            amount = %withdrawal.amount(),
            "Withdrawal recorded"
        );
        Ok(WithdrawalOutcome::Recorded(withdrawal))
    }

    pub async fn delete_withdrawal(&self, id: &str) -> EngineResult<()> {
        self.store.delete_withdrawal(id).await?;
        info!(id = %id, "Withdrawal deleted");
        Ok(())
    }

    // ---- Dashboard ---------------------------------------------------------

    pub async fn inventory_summary(&self) -> EngineResult<InventorySummary> {
        let products = self.store.list_products().await?;
        let sales = self.store.list_sales().await?;
        Ok(InventorySummary::compute_with_threshold(
            &products,
            &sales,
            self.options.low_stock_threshold,
        ))
    }

    /// Products under the low-stock threshold, lowest stock first.
    pub async fn low_stock_products(&self) -> EngineResult<Vec<Product>> {
        let products = self.store.list_products().await?;
        Ok(low_stock(&products, self.options.low_stock_threshold)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn require_product(&self, id: &str) -> EngineResult<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
