//! # Store Error Types
//!
//! Error types for store operations and for the sale engine that sits on
//! top of them.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError (aura-core)                │
//! │       │                                 │                               │
//! │       ▼                                 │                               │
//! │  DbError (this module)                  │                               │
//! │       │                                 │                               │
//! │       └──────────────┬──────────────────┘                               │
//! │                      ▼                                                  │
//! │              EngineError (this module)                                  │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │              Notice (notice.rs) ← What the operator sees                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use aura_core::{CoreError, ValidationError};
use thiserror::Error;

/// Store operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and operator feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the store.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - A batch adjusts stock of a deleted product
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A guarded stock decrement would have left stock below zero.
    ///
    /// The whole batch is rolled back.
    #[error("Stock conflict on product {product_id}: {available} available, {requested} requested")]
    StockConflict {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Store connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The store refused the batch as a whole (injected failure, closed
    /// store). Nothing in the batch was applied.
    #[error("Batch rejected: {0}")]
    BatchRejected(String),

    /// Stored data could not be decoded into a domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True if nothing could have been written (the operator can retry).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::TransactionFailed(_)
                | DbError::BatchRejected(_)
                | DbError::PoolExhausted
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::ColumnDecode   → DbError::Corrupt
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => DbError::Corrupt(err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors from [`crate::engine::SaleEngine`] operations.
///
/// Either a business rule rejected the request before anything was written,
/// or the store failed and rolled the batch back.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", "p-1");
        assert_eq!(err.to_string(), "Product not found: p-1");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_engine_error_wraps_both_layers() {
        let err: EngineError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cart is empty");

        let err: EngineError = DbError::BatchRejected("injected".to_string()).into();
        assert!(matches!(err, EngineError::Db(ref e) if e.is_retryable()));

        let err: EngineError = ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));
    }
}
