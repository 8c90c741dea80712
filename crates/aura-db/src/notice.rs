//! # Operator Notices
//!
//! What the presentation layer shows after an operation: a transient
//! notification with a level, a machine-readable code and a message.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error → Notice                                       │
//! │                                                                         │
//! │  EngineError::Core(SoldOut)            → WARNING  SOLD_OUT              │
//! │  EngineError::Core(InsufficientStock)  → WARNING  INSUFFICIENT_STOCK    │
//! │  EngineError::Core(Validation(..))     → WARNING  VALIDATION_ERROR      │
//! │  EngineError::Db(StockConflict)        → WARNING  INSUFFICIENT_STOCK    │
//! │  EngineError::Db(NotFound)             → WARNING  NOT_FOUND             │
//! │  EngineError::Db(other)                → ERROR    STORE_ERROR           │
//! │                                                                         │
//! │  Nothing is fatal. Store details are logged, not shown.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! { "level": "warning", "code": "SOLD_OUT", "message": "¡Producto agotado! ..." }
//! ```

use serde::Serialize;
use tracing::error;

use aura_core::{CoreError, WithdrawalOutcome};

use crate::engine::ReversalReport;
use crate::error::{DbError, EngineError};

/// How loudly to show a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Codes the presentation layer can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeCode {
    Ok,
    SoldOut,
    InsufficientStock,
    CartError,
    ValidationError,
    NotFound,
    PartnerError,
    NeedsConfirmation,
    PartialReversal,
    StoreError,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub code: NoticeCode,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, code: NoticeCode, message: impl Into<String>) -> Self {
        Notice {
            level,
            code,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Success, NoticeCode::Ok, message)
    }

    pub fn warning(code: NoticeCode, message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Warning, code, message)
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    /// Notice for a finished reversal: success, or a warning listing the
    /// lines whose stock could not be restored.
    pub fn for_reversal(report: &ReversalReport) -> Self {
        if report.is_complete() {
            return Notice::success("Venta anulada, stock restaurado");
        }
        let names: Vec<&str> = report.skipped.iter().map(|item| item.name.as_str()).collect();
        Notice::warning(
            NoticeCode::PartialReversal,
            format!(
                "Venta anulada. Stock no restaurado para productos eliminados: {}",
                names.join(", ")
            ),
        )
    }

    /// Notice for a withdrawal attempt.
    pub fn for_withdrawal(outcome: &WithdrawalOutcome) -> Self {
        match outcome {
            WithdrawalOutcome::NeedsConfirmation { amount, cash_in_hand } => Notice::warning(
                NoticeCode::NeedsConfirmation,
                format!(
                    "El monto {} supera el efectivo disponible ({}). ¿Continuar de todos modos?",
                    amount, cash_in_hand
                ),
            ),
            WithdrawalOutcome::Recorded(w) => {
                Notice::success(format!("Retiro registrado: {} a {}", w.amount(), w.beneficiary))
            }
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl From<CoreError> for Notice {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::SoldOut { .. } => NoticeCode::SoldOut,
            CoreError::InsufficientStock { .. } => NoticeCode::InsufficientStock,
            CoreError::NotInCart(_) | CoreError::EmptyCart | CoreError::CartTooLarge { .. } => {
                NoticeCode::CartError
            }
            CoreError::UnknownPartner(_) | CoreError::InvalidSplit { .. } => NoticeCode::PartnerError,
            CoreError::Validation(_) => NoticeCode::ValidationError,
        };
        Notice::warning(code, err.to_string())
    }
}

impl From<DbError> for Notice {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                Notice::warning(NoticeCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::StockConflict {
                available, requested, ..
            } => Notice::warning(
                NoticeCode::InsufficientStock,
                format!(
                    "Stock insuficiente: {} disponibles, {} solicitados. No se guardó la venta",
                    available, requested
                ),
            ),
            DbError::UniqueViolation { field, value } => Notice::warning(
                NoticeCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            other => {
                error!(error = %other, retryable = other.is_retryable(), "Store operation failed");
                Notice::new(
                    NoticeLevel::Error,
                    NoticeCode::StoreError,
                    "No se pudo guardar. Nada fue modificado, intente de nuevo",
                )
            }
        }
    }
}

impl From<EngineError> for Notice {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::Db(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{Money, SaleItem, ValidationError};

    #[test]
    fn test_core_errors_are_warnings() {
        let notice: Notice = EngineError::Core(CoreError::SoldOut {
            product_id: "p-1".to_string(),
            name: "Labial".to_string(),
        })
        .into();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.code, NoticeCode::SoldOut);
        assert!(notice.message.contains("Labial"));

        let notice: Notice = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(notice.code, NoticeCode::ValidationError);
    }

    #[test]
    fn test_store_failure_hides_details() {
        let notice: Notice = EngineError::Db(DbError::QueryFailed("disk I/O error".to_string())).into();
        assert!(notice.is_error());
        assert_eq!(notice.code, NoticeCode::StoreError);
        assert!(!notice.message.contains("disk"));
    }

    #[test]
    fn test_stock_conflict_notice() {
        let notice: Notice = DbError::StockConflict {
            product_id: "p-1".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert_eq!(notice.code, NoticeCode::InsufficientStock);
        assert!(!notice.is_error());
    }

    #[test]
    fn test_partial_reversal_names_products() {
        let report = ReversalReport {
            sale_id: "s-1".to_string(),
            restored: vec![],
            skipped: vec![SaleItem {
                product_id: "gone".to_string(),
                name: "Perfume Rosa".to_string(),
                price_cents: 30_000,
                cost_cents: 10_000,
                quantity: 1,
            }],
        };
        let notice = Notice::for_reversal(&report);
        assert_eq!(notice.code, NoticeCode::PartialReversal);
        assert!(notice.message.contains("Perfume Rosa"));
    }

    #[test]
    fn test_confirmation_notice() {
        let notice = Notice::for_withdrawal(&WithdrawalOutcome::NeedsConfirmation {
            amount: Money::from_cents(90_000),
            cash_in_hand: Money::from_cents(50_000),
        });
        assert_eq!(notice.code, NoticeCode::NeedsConfirmation);
        assert!(notice.message.contains("Q900.00"));
    }

    #[test]
    fn test_serializes_for_presentation_layer() {
        let json = serde_json::to_value(Notice::success("ok")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["code"], "OK");
    }
}
