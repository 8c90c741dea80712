//! Dashboard figures for the catalog and the sale history, plus the
//! suggested-price helper used by the product form.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, Rate, Sale};
use crate::SUGGESTED_MARKUP_BPS;

/// Retail price suggested for a cost: cost × 3.40, rounded to the cent.
///
/// ```rust
/// use aura_core::money::Money;
/// use aura_core::summary::suggested_price;
///
/// assert_eq!(suggested_price(Money::from_cents(1000)).cents(), 3400);
/// ```
pub fn suggested_price(cost: Money) -> Money {
    cost.scale(Rate::from_bps(SUGGESTED_MARKUP_BPS))
}

/// Raw dashboard totals.
///
/// Unlike [`crate::distribution::Distribution`], sales totals here include
/// every sale regardless of status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub sales_total: Money,
    pub profit_total: Money,
    pub sale_count: usize,
    /// Σ cost × stock over the catalog.
    pub stock_value: Money,
    pub product_count: usize,
    pub low_stock_count: usize,
}

impl InventorySummary {
    /// Computes the summary using the default low-stock threshold (5).
    pub fn compute(products: &[Product], sales: &[Sale]) -> Self {
        Self::compute_with_threshold(products, sales, crate::LOW_STOCK_THRESHOLD)
    }

    pub fn compute_with_threshold(products: &[Product], sales: &[Sale], low_stock_threshold: i64) -> Self {
        InventorySummary {
            sales_total: sales.iter().map(Sale::total).sum(),
            profit_total: sales.iter().map(Sale::total_profit).sum(),
            sale_count: sales.len(),
            stock_value: products.iter().map(Product::stock_value).sum(),
            product_count: products.len(),
            low_stock_count: products
                .iter()
                .filter(|p| p.is_low_stock(low_stock_threshold))
                .count(),
        }
    }
}

/// Products below the threshold, lowest stock first.
pub fn low_stock(products: &[Product], threshold: i64) -> Vec<&Product> {
    let mut low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock(threshold)).collect();
    low.sort_by_key(|p| p.stock);
    low
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::SaleStatus;
    use chrono::Utc;

    fn product(id: &str, cost: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            store_id: crate::STORE_ID.to_string(),
            name: id.to_string(),
            category: "General".to_string(),
            cost_cents: cost,
            price_cents: cost * 3,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(total: i64, profit: i64, status: SaleStatus) -> Sale {
        Sale {
            id: uuid::Uuid::new_v4().to_string(),
            store_id: crate::STORE_ID.to_string(),
            date: Utc::now(),
            items: Vec::new(),
            total_cents: total,
            total_profit_cents: profit,
            customer_name: "Ana".to_string(),
            status,
        }
    }

    #[test]
    fn test_suggested_price_rounds_to_cent() {
        assert_eq!(suggested_price(Money::from_cents(2500)).cents(), 8500);
        // 333 × 3.4 = 1132.2
        assert_eq!(suggested_price(Money::from_cents(333)).cents(), 1132);
        // 5 × 3.4 = 17
        assert_eq!(suggested_price(Money::from_cents(5)).cents(), 17);
        assert!(suggested_price(Money::zero()).is_zero());
    }

    #[test]
    fn test_summary_counts_every_sale() {
        let products = vec![product("a", 1000, 2), product("b", 500, 10), product("c", 100, 5)];
        let sales = vec![
            sale(3000, 2000, SaleStatus::Paid),
            sale(1000, 400, SaleStatus::Pending),
        ];

        let s = InventorySummary::compute(&products, &sales);

        assert_eq!(s.sales_total.cents(), 4000);
        assert_eq!(s.profit_total.cents(), 2400);
        assert_eq!(s.sale_count, 2);
        assert_eq!(s.stock_value.cents(), 2000 + 5000 + 500);
        assert_eq!(s.product_count, 3);
        // stock 5 is not low; only strictly below
        assert_eq!(s.low_stock_count, 1);
    }

    #[test]
    fn test_low_stock_sorted() {
        let products = vec![product("a", 1, 4), product("b", 1, 0), product("c", 1, 9)];
        let names: Vec<&str> = low_stock(&products, 5).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
