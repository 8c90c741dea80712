//! # Withdrawals
//!
//! Operator requests to take cash out of the business, either as a
//! partner payment or as a company expense.
//!
//! ## Recording Flow
//! ```text
//! WithdrawalRequest
//!      │
//!      ▼
//! validate ──► amount ≤ 0 / unknown partner ──► rejected, nothing written
//!      │
//!      ▼
//! WithdrawalCheck::evaluate(amount, cash_in_hand)
//!      │
//!      ├── within cash ─────────────────────────────► write
//!      │
//!      └── exceeds cash ──► Confirmation::Confirmed? ──► write
//!                                  │
//!                                  └── no ──► NeedsConfirmation
//! ```
//!
//! Exceeding cash in hand is a soft warning. The ledger records what the
//! operator decided even when the business is technically overdrawn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::distribution::ProfitSplit;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Withdrawal, WithdrawalKind};
use crate::validation::{validate_description, validate_withdrawal_amount};
use crate::COMPANY_BENEFICIARY;

/// What the operator typed into the withdrawal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WithdrawalRequest {
    pub kind: WithdrawalKind,
    /// Partner name for payments. Ignored for expenses.
    #[serde(default)]
    pub beneficiary: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub description: String,
}

impl WithdrawalRequest {
    pub fn partner_payment(partner: impl Into<String>, amount: Money, description: impl Into<String>) -> Self {
        WithdrawalRequest {
            kind: WithdrawalKind::PartnerPayment,
            beneficiary: partner.into(),
            amount_cents: amount.cents(),
            description: description.into(),
        }
    }

    pub fn company_expense(amount: Money, description: impl Into<String>) -> Self {
        WithdrawalRequest {
            kind: WithdrawalKind::CompanyExpense,
            beneficiary: COMPANY_BENEFICIARY.to_string(),
            amount_cents: amount.cents(),
            description: description.into(),
        }
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Checks the request against the configured partners.
    ///
    /// ## Rules
    /// - amount must be positive and at most Q100,000,000.00
    /// - a partner payment must name a configured partner
    /// - description at most 500 characters
    pub fn validate(&self, split: &ProfitSplit) -> CoreResult<()> {
        validate_withdrawal_amount(self.amount_cents)?;
        validate_description(&self.description)?;

        if self.kind == WithdrawalKind::PartnerPayment {
            let name = self.beneficiary.trim();
            if split.partner(name).is_none() {
                return Err(CoreError::UnknownPartner(name.to_string()));
            }
        }
        Ok(())
    }

    /// Validates the request and builds the record to store.
    ///
    /// Expenses always get "Company" as beneficiary whatever was typed.
    pub fn into_withdrawal(
        self,
        id: String,
        store_id: &str,
        date: DateTime<Utc>,
        split: &ProfitSplit,
    ) -> CoreResult<Withdrawal> {
        self.validate(split)?;

        let beneficiary = match self.kind {
            WithdrawalKind::PartnerPayment => self.beneficiary.trim().to_string(),
            WithdrawalKind::CompanyExpense => COMPANY_BENEFICIARY.to_string(),
        };

        Ok(Withdrawal {
            id,
            store_id: store_id.to_string(),
            date,
            kind: self.kind,
            beneficiary,
            amount_cents: self.amount_cents,
            description: self.description.trim().to_string(),
        })
    }
}

/// Whether the operator has acknowledged the cash-in-hand warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Confirmation {
    #[default]
    Unconfirmed,
    Confirmed,
}

/// Result of the soft cash-in-hand check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalCheck {
    WithinCash,
    ExceedsCash { amount: Money, cash_in_hand: Money },
}

impl WithdrawalCheck {
    pub fn evaluate(amount: Money, cash_in_hand: Money) -> Self {
        if amount > cash_in_hand {
            WithdrawalCheck::ExceedsCash { amount, cash_in_hand }
        } else {
            WithdrawalCheck::WithinCash
        }
    }

    /// True when the write must wait for the operator.
    pub fn blocks(&self, confirmation: Confirmation) -> bool {
        matches!(self, WithdrawalCheck::ExceedsCash { .. }) && confirmation == Confirmation::Unconfirmed
    }
}

/// What happened to a withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum WithdrawalOutcome {
    /// Amount exceeds cash in hand. Nothing was written; ask the operator
    /// and resubmit with `Confirmation::Confirmed` to proceed.
    NeedsConfirmation { amount: Money, cash_in_hand: Money },
    /// The withdrawal was written.
    Recorded(Withdrawal),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::PartnerShare;
    use crate::types::Rate;

    fn split() -> ProfitSplit {
        ProfitSplit::new(vec![
            PartnerShare::new("Ana", Rate::from_percent(60)),
            PartnerShare::new("Bea", Rate::from_percent(40)),
        ])
        .unwrap()
    }

    #[test]
    fn test_amount_must_be_positive() {
        let req = WithdrawalRequest::company_expense(Money::zero(), "Bolsas");
        assert!(matches!(req.validate(&split()), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_partner_must_be_configured() {
        let req = WithdrawalRequest::partner_payment("Carla", Money::from_cents(100), "");
        assert!(matches!(req.validate(&split()), Err(CoreError::UnknownPartner(name)) if name == "Carla"));

        let req = WithdrawalRequest::partner_payment(" Ana ", Money::from_cents(100), "");
        assert!(req.validate(&split()).is_ok());
    }

    #[test]
    fn test_expense_beneficiary_is_company() {
        let req = WithdrawalRequest {
            kind: WithdrawalKind::CompanyExpense,
            beneficiary: "Ana".to_string(),
            amount_cents: 2500,
            description: " Renta ".to_string(),
        };
        let w = req
            .into_withdrawal("w-1".to_string(), crate::STORE_ID, Utc::now(), &split())
            .unwrap();
        assert_eq!(w.beneficiary, COMPANY_BENEFICIARY);
        assert_eq!(w.description, "Renta");
        assert!(w.is_expense());
    }

    #[test]
    fn test_soft_check() {
        let cash = Money::from_cents(1000);
        assert_eq!(WithdrawalCheck::evaluate(Money::from_cents(1000), cash), WithdrawalCheck::WithinCash);

        let over = WithdrawalCheck::evaluate(Money::from_cents(1001), cash);
        assert!(over.blocks(Confirmation::Unconfirmed));
        assert!(!over.blocks(Confirmation::Confirmed));
        assert!(!WithdrawalCheck::WithinCash.blocks(Confirmation::Unconfirmed));
    }
}
