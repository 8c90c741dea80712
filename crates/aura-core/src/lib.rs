//! # aura-core: Pure Business Logic for Aura POS
//!
//! This crate holds the accounting and inventory rules of the Aura beauty
//! store as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Aura POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Presentation (screens, receipts)                 │   │
//! │  │   Catalog ──► Cart ──► Checkout ──► Sales list ──► Partners     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 aura-db (SaleEngine + Store)                    │   │
//! │  │     executes plans as one atomic batch, publishes changes      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ aura-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌────────┐ ┌────────┐ ┌──────────────┐ ┌─────────┐ │   │
//! │  │  │ money  │ │  cart  │ │ ledger │ │ distribution │ │ status  │ │   │
//! │  │  │ Money  │ │  Cart  │ │BatchOp │ │ Distribution │ │ Pagado  │ │   │
//! │  │  │ Rate   │ │CartLine│ │ plans  │ │ ProfitSplit  │ │ cycle   │ │   │
//! │  │  └────────┘ └────────┘ └────────┘ └──────────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS IN CALCULATIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Sale, Withdrawal) and `Rate`
//! - [`money`] - Money type with integer arithmetic
//! - [`status`] - Sale status workflow
//! - [`cart`] - In-memory cart with stock guards
//! - [`ledger`] - Sale commit/reversal plans expressed as batch operations
//! - [`distribution`] - Partner profit distribution
//! - [`withdrawal`] - Withdrawal requests and the cash-in-hand check
//! - [`summary`] - Inventory dashboard figures and suggested pricing
//! - [`validation`] - Field-level input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use aura_core::distribution::{Distribution, ProfitSplit};
//!
//! let split = ProfitSplit::default(); // 60 / 40
//! let summary = Distribution::compute(&[], &[], &split);
//! assert!(summary.cash_in_hand.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod distribution;
pub mod error;
pub mod ledger;
pub mod money;
pub mod status;
pub mod summary;
pub mod types;
pub mod validation;
pub mod withdrawal;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use distribution::{Distribution, PartnerBalance, PartnerShare, ProfitSplit};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{BatchOp, CommitPlan, ReversalPlan, SaleHeader, StockGuard};
pub use money::Money;
pub use status::SaleStatus;
pub use summary::InventorySummary;
pub use types::*;
pub use withdrawal::{Confirmation, WithdrawalCheck, WithdrawalOutcome, WithdrawalRequest};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Identifier of the single store this deployment serves.
///
/// Every record carries it so the data can be partitioned later, but only
/// one store is ever active.
pub const STORE_ID: &str = "aura-beauty-store";

/// Currency symbol used when displaying money (Guatemalan quetzal).
pub const CURRENCY_SYMBOL: &str = "Q";

/// Customer name recorded when the operator leaves the field blank.
pub const DEFAULT_CUSTOMER_NAME: &str = "Cliente Casual";

/// Beneficiary recorded on every company expense.
pub const COMPANY_BENEFICIARY: &str = "Company";

/// Category given to products created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Products with stock strictly below this count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum distinct products in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum units of one product in a single cart line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest stock count an operator can enter.
pub const MAX_STOCK: i64 = 1_000_000;

/// Largest single amount accepted for a price, cost or withdrawal
/// (Q100,000,000.00).
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

/// Markup used to suggest a retail price from cost (×3.40).
pub const SUGGESTED_MARKUP_BPS: u32 = 34_000;
