//! # Domain Types
//!
//! Core records used throughout Aura POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   Withdrawal    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name, category │   │  items[]  ◄─────┼── │  kind           │       │
//! │  │  cost_cents     │   │  total_cents    │   │  beneficiary    │       │
//! │  │  price_cents    │   │  profit_cents   │   │  amount_cents   │       │
//! │  │  stock          │   │  status         │   │  description    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │    SaleItem     │   │ WithdrawalKind  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  frozen copy of │   │  PartnerPayment │       │
//! │  │  6000 = 60%     │   │  name/price/    │   │  CompanyExpense │       │
//! │  └─────────────────┘   │  cost at sale   │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A sale copies the name, price and cost of every product it sells. Later
//! edits to the catalog never change what a past sale says it earned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::status::SaleStatus;

// =============================================================================
// Rate
// =============================================================================

/// A ratio represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 6000 bps = 60% (a partner share), 34000 bps = ×3.40 (catalog markup)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// 100%.
    pub const ONE: Rate = Rate(10_000);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage.
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this product belongs to.
    pub store_id: String,

    /// Display name shown to the operator and on receipts.
    pub name: String,

    /// Free-form grouping ("Labiales", "Cuidado de la piel", ...).
    pub category: String,

    /// What the store paid per unit, in cents.
    pub cost_cents: i64,

    /// Retail price per unit, in cents.
    pub price_cents: i64,

    /// Units on hand. Can drop below zero on an unguarded store.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Profit earned on one unit at current catalog values.
    #[inline]
    pub fn unit_profit(&self) -> Money {
        self.price() - self.cost()
    }

    /// Capital tied up in this product's stock (cost × stock).
    ///
    /// Negative stock contributes a negative value, matching what the
    /// dashboard shows when inventory has been oversold.
    pub fn stock_value(&self) -> Money {
        self.cost().multiply_quantity(self.stock)
    }

    /// True when there is nothing left to sell.
    #[inline]
    pub fn is_sold_out(&self) -> bool {
        self.stock <= 0
    }

    /// True when stock is strictly below the given threshold.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }
}

/// Input for creating a product.
///
/// `category` falls back to "General" and `price_cents` to the suggested
/// markup over cost when absent. See [`crate::validation::validate_draft`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub cost_cents: i64,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub stock: i64,
}

impl ProductDraft {
    /// Validates the draft and builds the product it describes.
    ///
    /// Blank category becomes "General"; a missing price becomes the
    /// suggested price for the given cost.
    pub fn into_product(
        self,
        id: String,
        store_id: &str,
        now: DateTime<Utc>,
    ) -> crate::validation::ValidationResult<Product> {
        crate::validation::validate_draft(&self)?;
        let cost = Money::from_cents(self.cost_cents);
        let price_cents = self
            .price_cents
            .unwrap_or_else(|| crate::summary::suggested_price(cost).cents());

        Ok(Product {
            id,
            store_id: store_id.to_string(),
            name: self.name.trim().to_string(),
            category: crate::validation::normalize_category(self.category.as_deref()),
            cost_cents: self.cost_cents,
            price_cents,
            stock: self.stock,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of a product. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
}

impl ProductPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.cost_cents.is_none()
            && self.price_cents.is_none()
            && self.stock.is_none()
    }

    /// Applies the patch to a product in place. Does not touch `updated_at`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            product.category = crate::validation::normalize_category(Some(category.as_str()));
        }
        if let Some(cost) = self.cost_cents {
            product.cost_cents = cost;
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    /// Product this line was sold from. The product may since be deleted.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,
    /// Unit cost in cents at time of sale (frozen).
    pub cost_cents: i64,
    pub quantity: i64,
}

impl SaleItem {
    /// price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }

    /// (price − cost) × quantity
    #[inline]
    pub fn line_profit(&self) -> Money {
        (Money::from_cents(self.price_cents) - Money::from_cents(self.cost_cents)).multiply_quantity(self.quantity)
    }
}

/// A recorded sale.
///
/// `total_cents` and `total_profit_cents` are computed once when the sale is
/// created and never recomputed, even if the catalog changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub items: Vec<SaleItem>,
    pub total_cents: i64,
    pub total_profit_cents: i64,
    pub customer_name: String,
    /// Sales recorded before statuses existed carry none; they count as paid.
    #[serde(default)]
    pub status: SaleStatus,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn total_profit(&self) -> Money {
        Money::from_cents(self.total_profit_cents)
    }

    /// Number of units sold across all lines.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Withdrawal
// =============================================================================

/// What a withdrawal pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum WithdrawalKind {
    /// Money handed to one of the partners out of their share.
    PartnerPayment,
    /// Money spent on the business; reduces distributable profit.
    CompanyExpense,
}

impl WithdrawalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalKind::PartnerPayment => "PartnerPayment",
            WithdrawalKind::CompanyExpense => "CompanyExpense",
        }
    }
}

/// A recorded cash outflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Withdrawal {
    pub id: String,
    pub store_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub kind: WithdrawalKind,
    /// Partner name, or "Company" for expenses.
    pub beneficiary: String,
    pub amount_cents: i64,
    pub description: String,
}

impl Withdrawal {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn is_expense(&self) -> bool {
        self.kind == WithdrawalKind::CompanyExpense
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            store_id: crate::STORE_ID.to_string(),
            name: "Base Líquida".to_string(),
            category: "Maquillaje".to_string(),
            cost_cents: 4500,
            price_cents: 15300,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rate_from_percent() {
        let rate = Rate::from_percent(60);
        assert_eq!(rate.bps(), 6000);
        assert!((rate.percentage() - 60.0).abs() < 0.001);
        assert_eq!(Rate::ONE.bps(), 10_000);
    }

    #[test]
    fn test_product_money_helpers() {
        let p = product(4);
        assert_eq!(p.unit_profit().cents(), 10800);
        assert_eq!(p.stock_value().cents(), 18000);
        assert!(p.is_low_stock(crate::LOW_STOCK_THRESHOLD));
        assert!(!p.is_low_stock(4));
        assert!(!p.is_sold_out());
        assert!(product(0).is_sold_out());
        assert!(product(-2).is_sold_out());
    }

    #[test]
    fn test_draft_defaults() {
        let draft = ProductDraft {
            name: "  Mascarilla  ".to_string(),
            cost_cents: 2500,
            stock: 12,
            ..Default::default()
        };
        let p = draft.into_product("p-9".to_string(), crate::STORE_ID, Utc::now()).unwrap();
        assert_eq!(p.name, "Mascarilla");
        assert_eq!(p.category, "General");
        assert_eq!(p.price_cents, 8500);
        assert_eq!(p.stock, 12);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn test_draft_keeps_explicit_price() {
        let draft = ProductDraft {
            name: "Rímel".to_string(),
            category: Some("Ojos".to_string()),
            cost_cents: 2500,
            price_cents: Some(7000),
            stock: 1,
        };
        let p = draft.into_product("p-10".to_string(), crate::STORE_ID, Utc::now()).unwrap();
        assert_eq!(p.price_cents, 7000);
        assert_eq!(p.category, "Ojos");
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut p = product(10);
        let patch = ProductPatch {
            price_cents: Some(16000),
            category: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut p);
        assert_eq!(p.price_cents, 16000);
        assert_eq!(p.category, crate::DEFAULT_CATEGORY);
        assert_eq!(p.cost_cents, 4500);
        assert_eq!(p.stock, 10);
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_sale_item_totals() {
        let item = SaleItem {
            product_id: "p-1".to_string(),
            name: "Rubor".to_string(),
            price_cents: 1000,
            cost_cents: 400,
            quantity: 3,
        };
        assert_eq!(item.line_total().cents(), 3000);
        assert_eq!(item.line_profit().cents(), 1800);
    }

    #[test]
    fn test_legacy_sale_without_status_is_paid() {
        let json = r#"{
            "id": "s-1",
            "store_id": "aura-beauty-store",
            "date": "2024-05-01T10:00:00Z",
            "items": [],
            "total_cents": 0,
            "total_profit_cents": 0,
            "customer_name": "Cliente Casual"
        }"#;
        let sale: Sale = serde_json::from_str(json).unwrap();
        assert_eq!(sale.status, SaleStatus::Paid);
    }

    #[test]
    fn test_withdrawal_kind_serializes_by_name() {
        let json = serde_json::to_string(&WithdrawalKind::CompanyExpense).unwrap();
        assert_eq!(json, "\"CompanyExpense\"");
        assert_eq!(WithdrawalKind::PartnerPayment.as_str(), "PartnerPayment");
    }
}
