//! # Profit Distribution
//!
//! Derives partner balances and recoverable capital from the sale and
//! withdrawal ledgers. Nothing here is stored: every figure is recomputed
//! from the full history on each call.
//!
//! ## Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales ──► drop Pendiente ──► revenue, profit                          │
//! │                                    │                                    │
//! │                                    ├──► cost recovered = revenue−profit │
//! │                                    │                                    │
//! │  withdrawals ──► expenses ─────────┼──► distributable = profit−expenses │
//! │       │                            │          │                         │
//! │       │                            │          ├──► share[A] (60%)       │
//! │       │                            │          └──► share[B] (40%)       │
//! │       │                            │                    │               │
//! │       ├──► paid[p] ────────────────┼────────────────────┴─► remaining[p]│
//! │       │                            │                                    │
//! │       └──► withdrawn ──────────────┴──► cash in hand = profit−withdrawn │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A negative distributable profit (expenses above profit) produces negative
//! shares and remaining balances. No floor is applied: a negative remaining
//! means the partner has been paid ahead of their share.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Rate, Sale, Withdrawal, WithdrawalKind};
use crate::COMPANY_BENEFICIARY;

// =============================================================================
// Profit Split
// =============================================================================

/// One partner's fraction of distributable profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PartnerShare {
    pub name: String,
    pub share: Rate,
}

impl PartnerShare {
    pub fn new(name: impl Into<String>, share: Rate) -> Self {
        PartnerShare {
            name: name.into(),
            share,
        }
    }
}

/// The fixed partner split. Shares always add up to exactly 100%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ProfitSplit {
    partners: Vec<PartnerShare>,
}

impl ProfitSplit {
    /// Builds a split after checking it.
    ///
    /// ## Errors
    /// `InvalidSplit` when there are no partners, a name is blank, reserved
    /// or repeated, or the shares do not sum to 100%.
    pub fn new(partners: Vec<PartnerShare>) -> CoreResult<Self> {
        if partners.is_empty() {
            return Err(CoreError::InvalidSplit {
                reason: "at least one partner is required".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for partner in &partners {
            let name = partner.name.trim();
            if name.is_empty() {
                return Err(CoreError::InvalidSplit {
                    reason: "partner name cannot be blank".to_string(),
                });
            }
            if name == COMPANY_BENEFICIARY {
                return Err(CoreError::InvalidSplit {
                    reason: format!("'{}' is reserved for expenses", COMPANY_BENEFICIARY),
                });
            }
            if !seen.insert(name) {
                return Err(CoreError::InvalidSplit {
                    reason: format!("partner '{}' is listed twice", name),
                });
            }
        }

        let total: u32 = partners.iter().map(|p| p.share.bps()).sum();
        if total != Rate::ONE.bps() {
            return Err(CoreError::InvalidSplit {
                reason: format!("shares add up to {}%, expected 100%", total as f64 / 100.0),
            });
        }

        Ok(ProfitSplit { partners })
    }

    pub fn partners(&self) -> &[PartnerShare] {
        &self.partners
    }

    /// Looks a partner up by exact name.
    pub fn partner(&self, name: &str) -> Option<&PartnerShare> {
        self.partners.iter().find(|p| p.name == name)
    }

    /// Splits an amount by share.
    ///
    /// Each share is rounded half away from zero to the cent, except the
    /// last partner's, which takes whatever is left. The parts therefore
    /// always sum to `amount` exactly.
    pub fn allocate(&self, amount: Money) -> Vec<Money> {
        let mut parts = Vec::with_capacity(self.partners.len());
        let mut allocated = Money::zero();
        let last = self.partners.len() - 1;

        for (i, partner) in self.partners.iter().enumerate() {
            let part = if i == last {
                amount - allocated
            } else {
                amount.scale(partner.share)
            };
            allocated += part;
            parts.push(part);
        }

        parts
    }
}

impl Default for ProfitSplit {
    /// The store's 60 / 40 partnership.
    fn default() -> Self {
        ProfitSplit {
            partners: vec![
                PartnerShare::new("Partner A", Rate::from_percent(60)),
                PartnerShare::new("Partner B", Rate::from_percent(40)),
            ],
        }
    }
}

// =============================================================================
// Distribution
// =============================================================================

/// One partner's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PartnerBalance {
    pub name: String,
    pub share_rate: Rate,
    /// Portion of distributable profit owed to this partner.
    pub share: Money,
    /// Sum of partner payments made to this partner.
    pub paid: Money,
    /// share − paid. Negative when paid ahead.
    pub remaining: Money,
}

/// Derived profit figures for the partner screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Distribution {
    /// Σ total over non-pending sales.
    pub total_revenue: Money,
    /// Σ total_profit over non-pending sales.
    pub total_profit: Money,
    /// Capital to reinvest in stock: revenue − profit.
    pub total_cost_recovered: Money,
    /// Σ every withdrawal.
    pub total_withdrawn: Money,
    /// Σ company expenses.
    pub company_expenses: Money,
    /// profit − company expenses.
    pub distributable: Money,
    /// In split order.
    pub partners: Vec<PartnerBalance>,
    /// profit − everything withdrawn.
    pub cash_in_hand: Money,
}

impl Distribution {
    /// Computes the distribution from the full ledgers.
    ///
    /// ## Example
    /// ```rust
    /// use aura_core::distribution::{Distribution, ProfitSplit};
    ///
    /// let d = Distribution::compute(&[], &[], &ProfitSplit::default());
    /// assert_eq!(d.partners.len(), 2);
    /// assert!(d.distributable.is_zero());
    /// ```
    pub fn compute(sales: &[Sale], withdrawals: &[Withdrawal], split: &ProfitSplit) -> Distribution {
        let relevant = sales.iter().filter(|s| s.status.counts_toward_profit());

        let (total_revenue, total_profit) = relevant.fold(
            (Money::zero(), Money::zero()),
            |(revenue, profit), sale| (revenue + sale.total(), profit + sale.total_profit()),
        );

        let total_withdrawn: Money = withdrawals.iter().map(Withdrawal::amount).sum();
        let company_expenses: Money = withdrawals
            .iter()
            .filter(|w| w.kind == WithdrawalKind::CompanyExpense)
            .map(Withdrawal::amount)
            .sum();

        let distributable = total_profit - company_expenses;
        let shares = split.allocate(distributable);

        let partners = split
            .partners()
            .iter()
            .zip(shares)
            .map(|(partner, share)| {
                let paid: Money = withdrawals
                    .iter()
                    .filter(|w| w.kind == WithdrawalKind::PartnerPayment && w.beneficiary == partner.name)
                    .map(Withdrawal::amount)
                    .sum();
                PartnerBalance {
                    name: partner.name.clone(),
                    share_rate: partner.share,
                    share,
                    paid,
                    remaining: share - paid,
                }
            })
            .collect();

        Distribution {
            total_revenue,
            total_profit,
            total_cost_recovered: total_revenue - total_profit,
            total_withdrawn,
            company_expenses,
            distributable,
            partners,
            cash_in_hand: total_profit - total_withdrawn,
        }
    }

    /// Balance of one partner by name.
    pub fn partner(&self, name: &str) -> Option<&PartnerBalance> {
        self.partners.iter().find(|p| p.name == name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
