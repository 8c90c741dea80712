//! # Sale Ledger Plans
//!
//! Turns a checkout or a reversal into the list of writes the store must
//! apply as one atomic batch. This module decides WHAT to write; the store
//! crate decides HOW.
//!
//! ## Commit and Reverse
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  plan_commit(cart)                    plan_reversal(sale)               │
//! │                                                                         │
//! │  ┌─────────────────────────┐          ┌─────────────────────────┐       │
//! │  │ InsertSale(sale)        │          │ AdjustStock(p1, +2)     │       │
//! │  │ AdjustStock(p1, −2)     │          │ AdjustStock(p2, +1)     │       │
//! │  │ AdjustStock(p2, −1)     │          │ DeleteSale(sale.id)     │       │
//! │  └───────────┬─────────────┘          └───────────┬─────────────┘       │
//! │              │                                    │                     │
//! │              ▼                                    ▼                     │
//! │        ONE atomic batch                    ONE atomic batch             │
//! │     (all applied or none)               (all applied or none)           │
//! │                                                                         │
//! │  Lines whose product was deleted are left out of the reversal and      │
//! │  reported back instead; the sale is still deleted.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::status::SaleStatus;
use crate::types::{Sale, SaleItem};
use crate::validation::normalize_customer_name;

// =============================================================================
// Batch Operations
// =============================================================================

/// How a stock decrement treats the current stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockGuard {
    /// Apply the delta unconditionally. Concurrent checkouts can drive
    /// stock below zero.
    #[default]
    Unchecked,
    /// Reject the whole batch if the delta would leave stock below zero.
    NonNegative,
}

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Write a new sale record.
    InsertSale(Sale),
    /// Delete a sale record by id.
    DeleteSale(String),
    /// Add `delta` to a product's stock (negative to decrement).
    ///
    /// The product must exist; a missing product fails the batch.
    AdjustStock {
        product_id: String,
        delta: i64,
        guard: StockGuard,
    },
}

impl BatchOp {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchOp::InsertSale(_) => "insert_sale",
            BatchOp::DeleteSale(_) => "delete_sale",
            BatchOp::AdjustStock { .. } => "adjust_stock",
        }
    }
}

// =============================================================================
// Commit Plan
// =============================================================================

/// Everything needed to record one checkout.
#[derive(Debug, Clone)]
pub struct CommitPlan {
    /// The sale that will exist once the batch succeeds.
    pub sale: Sale,
    /// Sale insert followed by one stock decrement per line.
    pub ops: Vec<BatchOp>,
}

/// Identity and metadata for a sale being committed.
///
/// Ids and timestamps are passed in so planning stays deterministic.
#[derive(Debug, Clone)]
pub struct SaleHeader<'a> {
    pub id: String,
    pub store_id: &'a str,
    pub date: DateTime<Utc>,
    pub customer_name: Option<&'a str>,
    pub status: SaleStatus,
}

/// Plans a checkout from the cart.
///
/// Totals are taken from the cart snapshot: `total = Σ price·qty` and
/// `total_profit = Σ (price−cost)·qty`. Stock is not re-read here.
///
/// ## Errors
/// `EmptyCart` if there is nothing to sell.
pub fn plan_commit(cart: &Cart, header: SaleHeader<'_>, guard: StockGuard) -> CoreResult<CommitPlan> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let items: Vec<SaleItem> = cart.lines().iter().map(|l| l.to_sale_item()).collect();

    let sale = Sale {
        id: header.id,
        store_id: header.store_id.to_string(),
        date: header.date,
        total_cents: cart.total().cents(),
        total_profit_cents: cart.profit().cents(),
        customer_name: normalize_customer_name(header.customer_name),
        status: header.status,
        items,
    };

    let mut ops = Vec::with_capacity(sale.items.len() + 1);
    ops.push(BatchOp::InsertSale(sale.clone()));
    ops.extend(sale.items.iter().map(|item| BatchOp::AdjustStock {
        product_id: item.product_id.clone(),
        delta: -item.quantity,
        guard,
    }));

    Ok(CommitPlan { sale, ops })
}

// =============================================================================
// Reversal Plan
// =============================================================================

/// Writes needed to undo a sale, plus the lines that could not be undone.
#[derive(Debug, Clone)]
pub struct ReversalPlan {
    /// Stock increments for surviving products, then the sale delete.
    pub ops: Vec<BatchOp>,
    /// Lines whose product no longer exists. Their stock is lost.
    pub skipped: Vec<SaleItem>,
}

/// Plans the reversal of a sale.
///
/// `existing_products` is the set of product ids currently in the catalog.
/// Increments never need a guard, so they are always `Unchecked`.
pub fn plan_reversal(sale: &Sale, existing_products: &HashSet<String>) -> ReversalPlan {
    let (restorable, skipped): (Vec<&SaleItem>, Vec<&SaleItem>) = sale
        .items
        .iter()
        .partition(|item| existing_products.contains(&item.product_id));

    let mut ops: Vec<BatchOp> = restorable
        .into_iter()
        .map(|item| BatchOp::AdjustStock {
            product_id: item.product_id.clone(),
            delta: item.quantity,
            guard: StockGuard::Unchecked,
        })
        .collect();
    ops.push(BatchOp::DeleteSale(sale.id.clone()));

    ReversalPlan {
        ops,
        skipped: skipped.into_iter().cloned().collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
