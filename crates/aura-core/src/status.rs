//! # Sale Status Workflow
//!
//! A sale's fulfillment tag. The operator cycles it by hand; nothing moves
//! it automatically.
//!
//! ```text
//!        ┌──────────┐  next()  ┌───────────┐  next()  ┌───────────┐
//!   ───► │  Pagado  │ ───────► │ Entregado │ ───────► │ Pendiente │
//!        └──────────┘          └───────────┘          └─────┬─────┘
//!             ▲                                             │
//!             └─────────────────── next() ──────────────────┘
//! ```
//!
//! There is no terminal state. A transition rewrites the `status` field of
//! the sale and nothing else: stock and money are untouched. Only
//! `Pendiente` sales are left out of profit distribution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// The fulfillment status of a sale.
///
/// Stored and serialized under the labels the store has always used
/// ("Pagado", "Entregado", "Pendiente").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum SaleStatus {
    /// Customer has paid. Initial state.
    #[serde(rename = "Pagado")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pagado"))]
    Paid,
    /// Goods handed over.
    #[serde(rename = "Entregado")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Entregado"))]
    Delivered,
    /// Payment outstanding.
    #[serde(rename = "Pendiente")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pendiente"))]
    Pending,
}

impl SaleStatus {
    /// All statuses in cycle order.
    pub const ALL: [SaleStatus; 3] = [SaleStatus::Paid, SaleStatus::Delivered, SaleStatus::Pending];

    /// The status the operator's toggle moves to.
    pub const fn next(self) -> SaleStatus {
        match self {
            SaleStatus::Paid => SaleStatus::Delivered,
            SaleStatus::Delivered => SaleStatus::Pending,
            SaleStatus::Pending => SaleStatus::Paid,
        }
    }

    /// Whether a sale in this status feeds profit distribution.
    pub const fn counts_toward_profit(self) -> bool {
        !matches!(self, SaleStatus::Pending)
    }

    /// Label shown to the operator and stored in the database.
    pub const fn label(self) -> &'static str {
        match self {
            SaleStatus::Paid => "Pagado",
            SaleStatus::Delivered => "Entregado",
            SaleStatus::Pending => "Pendiente",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Paid
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SaleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pagado" => Ok(SaleStatus::Paid),
            "Entregado" => Ok(SaleStatus::Delivered),
            "Pendiente" => Ok(SaleStatus::Pending),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown sale status '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_order() {
        assert_eq!(SaleStatus::Paid.next(), SaleStatus::Delivered);
        assert_eq!(SaleStatus::Delivered.next(), SaleStatus::Pending);
        assert_eq!(SaleStatus::Pending.next(), SaleStatus::Paid);
    }

    #[test]
    fn test_cycle_visits_every_label_and_closes() {
        let walk: Vec<&str> = std::iter::successors(Some(SaleStatus::Paid), |s| Some(s.next()))
            .take(4)
            .map(SaleStatus::label)
            .collect();
        assert_eq!(walk, ["Pagado", "Entregado", "Pendiente", "Pagado"]);
    }

    #[test]
    fn test_full_cycle_is_identity() {
        for start in SaleStatus::ALL {
            assert_eq!(start.next().next().next(), start);
        }
    }

    #[test]
    fn test_only_pending_is_excluded_from_profit() {
        assert!(SaleStatus::Paid.counts_toward_profit());
        assert!(SaleStatus::Delivered.counts_toward_profit());
        assert!(!SaleStatus::Pending.counts_toward_profit());
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for status in SaleStatus::ALL {
            assert_eq!(status.label().parse::<SaleStatus>().unwrap(), status);
        }
        assert!("Cancelado".parse::<SaleStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_spanish_labels() {
        assert_eq!(serde_json::to_string(&SaleStatus::Pending).unwrap(), "\"Pendiente\"");
        let parsed: SaleStatus = serde_json::from_str("\"Entregado\"").unwrap();
        assert_eq!(parsed, SaleStatus::Delivered);
    }
}
