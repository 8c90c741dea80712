//! # Error Types
//!
//! Domain-specific error types for aura-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  aura-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations (stock, cart, ...)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  aura-db errors (separate crate)                                        │
//! │  ├── DbError          - Store operation failures                       │
//! │  ├── EngineError      - CoreError | DbError at the engine boundary     │
//! │  └── Notice           - What the operator sees (level, code, message)  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → Notice              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this file is fatal. Every variant is caught at the operation
//! boundary and shown as a transient message; the operator re-triggers the
//! action if they want to retry.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these mutate state: the cart and the store are left exactly as
/// they were before the call that produced the error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product has no stock at all.
    ///
    /// Raised when adding a product whose stock is zero or negative. Stock
    /// can be negative after concurrent checkouts on an unguarded store.
    #[error("¡Producto agotado! {name} has no stock")]
    SoldOut { product_id: String, name: String },

    /// Requested quantity exceeds available stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add "Labial Mate" (already 3 in cart)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Labial Mate", available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// Operator sees: "Stock insuficiente"
    /// ```
    #[error("Stock insuficiente for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Checkout was attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has reached the maximum number of distinct products.
    #[error("Cart cannot have more than {max} products")]
    CartTooLarge { max: usize },

    /// Withdrawal names a beneficiary that is not a configured partner.
    #[error("Unknown partner: {0}")]
    UnknownPartner(String),

    /// Profit split configuration is unusable.
    #[error("Invalid profit split: {reason}")]
    InvalidSplit { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for errors caused by stock levels rather than bad input.
    pub fn is_stock_error(&self) -> bool {
        matches!(
            self,
            CoreError::SoldOut { .. } | CoreError::InsufficientStock { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input doesn't meet requirements and are
/// raised before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., unknown status label).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate partner name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            name: "Labial Mate".to_string(),
            available: 3,
            requested: 4,
        };
        assert_eq!(
            err.to_string(),
            "Stock insuficiente for Labial Mate: available 3, requested 4"
        );
        assert!(err.is_stock_error());
        assert!(!CoreError::EmptyCart.is_stock_error());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Negative {
            field: "stock".to_string(),
        };
        assert_eq!(err.to_string(), "stock cannot be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
