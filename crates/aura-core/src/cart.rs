//! # Cart
//!
//! The in-memory cart the operator builds before checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Method                  Guard                 │
//! │  ───────────────          ──────                  ─────                 │
//! │                                                                         │
//! │  Click product ─────────► add_product() ────────► stock ≤ 0 → SoldOut  │
//! │                                                   qty ≥ stock → Insuff. │
//! │                                                                         │
//! │  +1 / −1 buttons ───────► update_quantity() ────► qty > stock → Insuff. │
//! │                                                   qty < 1 → invalid     │
//! │                                                                         │
//! │  Trash icon ────────────► remove_line()                                 │
//! │                                                                         │
//! │  Checkout succeeded ────► clear()                                       │
//! │                                                                         │
//! │  NOTE: every guard leaves the cart untouched when it fails.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guards use the stock the operator was looking at. They are advisory:
//! checkout does not re-read stock, so two operators can still oversell
//! unless the store runs with a non-negative stock guard.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, SaleItem};
use crate::validation::{validate_cart_size, validate_quantity};
use crate::MAX_CART_LINES;

/// A product in the cart.
///
/// ## Design Notes
/// Name, price and cost are copied when the line is created so the cart
/// shows consistent figures even if the catalog is edited meanwhile. That
/// copy is what ends up frozen in the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    /// Always at least 1.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line with quantity 1 from a product.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price_cents: product.price_cents,
            cost_cents: product.cost_cents,
            quantity: 1,
        }
    }

    /// price × quantity
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }

    /// (price − cost) × quantity
    pub fn line_profit(&self) -> Money {
        (Money::from_cents(self.price_cents) - Money::from_cents(self.cost_cents)).multiply_quantity(self.quantity)
    }

    /// The frozen sale line for this cart line.
    pub fn to_sale_item(&self) -> SaleItem {
        SaleItem {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price_cents: self.price_cents,
            cost_cents: self.cost_cents,
            quantity: self.quantity,
        }
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every quantity is ≥ 1
/// - At most 100 lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of a product, or a new line if it is not in the cart.
    ///
    /// ## Errors
    /// - `SoldOut` when the product has no stock
    /// - `InsufficientStock` when the cart already holds all of it
    /// - `Validation` when the line already holds 999 units
    /// - `CartTooLarge` when a new line would exceed the line limit
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if product.is_sold_out() {
            return Err(CoreError::SoldOut {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            if line.quantity >= product.stock {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity + 1,
                });
            }
            validate_quantity(line.quantity + 1)?;
            line.quantity += 1;
            return Ok(());
        }

        validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_LINES,
        })?;

        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Changes a line's quantity by `delta` (usually +1 or −1).
    ///
    /// `product` supplies the stock to check against. A result above stock,
    /// above 999 or below 1 is rejected and the line keeps its quantity;
    /// removing a line is an explicit [`Cart::remove_line`].
    pub fn update_quantity(&mut self, product: &Product, delta: i64) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
            .ok_or_else(|| CoreError::NotInCart(product.id.clone()))?;

        let new_qty = match line.quantity.checked_add(delta) {
            Some(qty) if qty <= product.stock => qty,
            _ => {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity.saturating_add(delta),
                })
            }
        };
        validate_quantity(new_qty)?;

        line.quantity = new_qty;
        Ok(())
    }

    /// Removes a product's line. Returns false if it was not in the cart.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ price × quantity
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Σ (price − cost) × quantity
    pub fn profit(&self) -> Money {
        self.lines.iter().map(CartLine::line_profit).sum()
    }
}

/// Cart totals summary for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub unit_count: i64,
    pub total_cents: i64,
    pub profit_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            unit_count: cart.unit_count(),
            total_cents: cart.total().cents(),
            profit_cents: cart.profit().cents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(id: &str, price_cents: i64, cost_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            store_id: crate::STORE_ID.to_string(),
            name: format!("Producto {}", id),
            category: crate::DEFAULT_CATEGORY.to_string(),
            cost_cents,
            price_cents,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_product_creates_then_increments() {
        let mut cart = Cart::new();
        let product = test_product("1", 1000, 400, 5);

        cart.add_product(&product).unwrap();
        cart.add_product(&product).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line("1").map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_sold_out_product_is_rejected() {
        let mut cart = Cart::new();
        let product = test_product("1", 1000, 400, 0);

        let err = cart.add_product(&product).unwrap_err();
        assert!(matches!(err, CoreError::SoldOut { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_beyond_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        let product = test_product("1", 1000, 400, 2);

        cart.add_product(&product).unwrap();
        cart.add_product(&product).unwrap();
        let before = cart.clone();

        let err = cart.add_product(&product).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 2, requested: 3, .. }
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_guards() {
        let mut cart = Cart::new();
        let product = test_product("1", 1000, 400, 3);
        cart.add_product(&product).unwrap();

        cart.update_quantity(&product, 2).unwrap();
        assert_eq!(cart.line("1").map(|l| l.quantity), Some(3));

        // above stock
        assert!(cart.update_quantity(&product, 1).is_err());
        assert_eq!(cart.line("1").map(|l| l.quantity), Some(3));

        // below one
        let err = cart.update_quantity(&product, -3).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(cart.line("1").map(|l| l.quantity), Some(3));
    }

    #[test]
    fn test_huge_delta_is_rejected_not_overflowed() {
        let mut cart = Cart::new();
        let product = test_product("1", 1000, 400, 5);
        cart.add_product(&product).unwrap();

        let err = cart.update_quantity(&product, i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, requested: i64::MAX, .. }
        ));
        assert!(cart.update_quantity(&product, i64::MIN).is_err());
        assert_eq!(cart.line("1").map(|l| l.quantity), Some(1));
    }

    #[test]
    fn test_line_quantity_is_capped() {
        let mut cart = Cart::new();
        let product = test_product("1", 100, 50, crate::MAX_STOCK);
        cart.add_product(&product).unwrap();

        cart.update_quantity(&product, crate::MAX_ITEM_QUANTITY - 1).unwrap();
        let err = cart.update_quantity(&product, 1).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = cart.add_product(&product).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(cart.line("1").map(|l| l.quantity), Some(crate::MAX_ITEM_QUANTITY));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let mut cart = Cart::new();
        let product = test_product("1", i64::MAX / 2 + 1, 0, 2);
        cart.add_product(&product).unwrap();
        cart.add_product(&product).unwrap();

        assert_eq!(cart.total().cents(), i64::MAX);
        assert_eq!(cart.profit().cents(), i64::MAX);
    }

    #[test]
    fn test_update_quantity_of_missing_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 1000, 400, 3);
        assert!(matches!(
            cart.update_quantity(&product, 1),
            Err(CoreError::NotInCart(_))
        ));
    }

    #[test]
    fn test_totals_and_profit() {
        let mut cart = Cart::new();
        let lipstick = test_product("1", 1000, 400, 10);
        let blush = test_product("2", 2550, 1000, 10);

        cart.add_product(&lipstick).unwrap();
        cart.add_product(&lipstick).unwrap();
        cart.add_product(&blush).unwrap();

        assert_eq!(cart.total().cents(), 2 * 1000 + 2550);
        assert_eq!(cart.profit().cents(), 2 * 600 + 1550);

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.unit_count, 3);
        assert_eq!(totals.total_cents, 4550);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 1000, 400, 10)).unwrap();
        cart.add_product(&test_product("2", 1000, 400, 10)).unwrap();

        assert!(cart.remove_line("1"));
        assert!(!cart.remove_line("1"));
        assert_eq!(cart.line_count(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            cart.add_product(&test_product(&i.to_string(), 100, 50, 1)).unwrap();
        }
        let err = cart.add_product(&test_product("extra", 100, 50, 1)).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }

    #[test]
    fn test_snapshot_survives_catalog_edit() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 1000, 400, 10);
        cart.add_product(&product).unwrap();

        product.price_cents = 5000;
        cart.add_product(&product).unwrap();

        // the line keeps the price it was created with
        assert_eq!(cart.total().cents(), 2000);
    }
}
