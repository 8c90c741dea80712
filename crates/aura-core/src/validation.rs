//! # Validation Module
//!
//! Input validation and normalisation for operator-entered data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                  │
//! │  ├── Form parsing (numbers, empty fields)                              │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Field rules (lengths, signs, ranges)                              │
//! │  └── Defaults (category, customer name, beneficiary)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store (SQLite)                                                │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use aura_core::validation::{normalize_customer_name, validate_quantity};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert_eq!(normalize_customer_name(Some("   ")), "Cliente Casual");
//! ```

use crate::error::ValidationError;
use crate::types::{ProductDraft, ProductPatch};
use crate::{
    DEFAULT_CATEGORY, DEFAULT_CUSTOMER_NAME, MAX_AMOUNT_CENTS, MAX_CART_LINES, MAX_ITEM_QUANTITY, MAX_STOCK,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use aura_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Labial Mate Rosa").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a category. Blank is fine (it becomes "General").
pub fn validate_category(category: &str) -> ValidationResult<()> {
    if category.trim().chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LEN,
        });
    }
    Ok(())
}

/// Trims a category and substitutes "General" when nothing is left.
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Trims a customer name and substitutes "Cliente Casual" when blank.
pub fn normalize_customer_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => DEFAULT_CUSTOMER_NAME.to_string(),
    }
}

/// Validates a free-text description (withdrawal notes).
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.trim().chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be at least 1
/// - At most [`MAX_ITEM_QUANTITY`] (999)
///
/// Product stock is a further bound; see
/// [`crate::cart::Cart::update_quantity`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a money amount in cents that may be zero but not negative,
/// and is at most [`MAX_AMOUNT_CENTS`].
///
/// ## Example
/// ```rust
/// use aura_core::validation::validate_non_negative_cents;
///
/// assert!(validate_non_negative_cents("price", 1099).is_ok());
/// assert!(validate_non_negative_cents("price", 0).is_ok());
/// assert!(validate_non_negative_cents("price", -100).is_err());
/// assert!(validate_non_negative_cents("price", i64::MAX).is_err());
/// ```
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a stock count entered by the operator.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    if stock > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }
    Ok(())
}

/// Validates a withdrawal amount.
///
/// ## Rules
/// - Must be strictly positive
/// - At most [`MAX_AMOUNT_CENTS`]
///
/// Whether the amount fits in cash-in-hand is a separate, soft check made
/// by [`crate::withdrawal::WithdrawalCheck`].
pub fn validate_withdrawal_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every field of a product draft.
pub fn validate_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_product_name(&draft.name)?;
    if let Some(category) = &draft.category {
        validate_category(category)?;
    }
    validate_non_negative_cents("cost", draft.cost_cents)?;
    if let Some(price) = draft.price_cents {
        validate_non_negative_cents("price", price)?;
    }
    validate_stock(draft.stock)?;
    Ok(())
}

/// Validates the fields a patch provides. Absent fields are not checked.
pub fn validate_patch(patch: &ProductPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_product_name(name)?;
    }
    if let Some(category) = &patch.category {
        validate_category(category)?;
    }
    if let Some(cost) = patch.cost_cents {
        validate_non_negative_cents("cost", cost)?;
    }
    if let Some(price) = patch.price_cents {
        validate_non_negative_cents("price", price)?;
    }
    if let Some(stock) = patch.stock {
        validate_stock(stock)?;
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct product fits in the cart.
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
