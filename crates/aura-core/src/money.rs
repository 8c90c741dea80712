//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing sale profits as floats:                                        │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                   │
//! │                                                                         │
//! │  A partner who was paid exactly their share would then show a          │
//! │  "remaining" balance of 0.0000000000000001 and the dashboard needs a   │
//! │  clamp to hide it.                                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    30 cents - 30 cents = 0 cents, always                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use aura_core::money::Money;
//!
//! let price = Money::from_cents(1099); // Q10.99
//! let line = price * 3_i64;            // Q32.97
//! let total = line + Money::from_cents(500);
//! assert_eq!(total.cents(), 3797);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos of a quetzal).
///
/// ## Design Decisions
/// - **i64 (signed)**: partner balances may legitimately go negative when
///   expenses exceed profit, so the type must carry a sign
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Saturating arithmetic**: sums and products pin at the i64 bounds
///   and never panic
///
/// ## Where Money Flows
/// ```text
/// Product.price_cents ──► CartLine ──► Sale.total_cents ──► Distribution
/// Product.cost_cents  ──► CartLine ──► Sale.total_profit_cents ─┘
/// Withdrawal.amount_cents ─────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use aura_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use aura_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Scales the amount by a rate, rounding half away from zero.
    ///
    /// Used for partner shares (6000 bps = 60%) and the catalog markup
    /// (34000 bps = ×3.40). Rounding is symmetric so a negative
    /// distributable profit splits into mirror-image negative shares.
    ///
    /// ## Example
    /// ```rust
    /// use aura_core::money::Money;
    /// use aura_core::types::Rate;
    ///
    /// let profit = Money::from_cents(13000);
    /// assert_eq!(profit.scale(Rate::from_bps(6000)).cents(), 7800);
    /// assert_eq!(Money::from_cents(-13000).scale(Rate::from_bps(6000)).cents(), -7800);
    /// ```
    pub fn scale(&self, rate: Rate) -> Money {
        // i128 keeps large ledgers from overflowing during the multiply
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        Money::from_cents(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with the store currency symbol and two decimals.
///
/// Rounding to two places is a display concern only; there is nothing to
/// round internally because every amount is already whole cents.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            crate::CURRENCY_SYMBOL,
            self.units().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by i64 (quantities).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "Q10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "Q5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-Q5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "Q0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);
        let result: Money = a * 3_i64;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_cents(10), Money::from_cents(20), Money::from_cents(-5)];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref.cents(), 25);
        assert_eq!(by_value.cents(), 25);
    }

    #[test]
    fn test_scale_rounds_half_away_from_zero() {
        // 0.5 cent cases in both directions
        assert_eq!(Money::from_cents(1).scale(Rate::from_bps(5000)).cents(), 1);
        assert_eq!(Money::from_cents(-1).scale(Rate::from_bps(5000)).cents(), -1);
        // 101 × 0.6 = 60.6 → 61
        assert_eq!(Money::from_cents(101).scale(Rate::from_bps(6000)).cents(), 61);
        // Markup ×3.40
        assert_eq!(Money::from_cents(2500).scale(Rate::from_bps(34000)).cents(), 8500);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);
        assert_eq!((-Money::from_cents(i64::MIN)).cents(), i64::MAX);
        assert_eq!((max * 2_i64).cents(), i64::MAX);

        let total: Money = [max, max, Money::from_cents(-5)].iter().sum();
        assert_eq!(total.cents(), i64::MAX - 5);
    }

    /// Float arithmetic needs a noise clamp for balances that should be
    /// exactly zero; cents do not.
    #[test]
    fn test_no_float_noise() {
        let ten = Money::from_cents(10);
        let twenty = Money::from_cents(20);
        let paid = Money::from_cents(30);
        assert!((ten + twenty - paid).is_zero());
    }
}
