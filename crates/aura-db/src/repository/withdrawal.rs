//! # Withdrawal Repository
//!
//! Database operations for partner payments and company expenses.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use aura_core::Withdrawal;

/// Repository for withdrawal database operations.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    pool: SqlitePool,
    store_id: String,
}

impl WithdrawalRepository {
    pub fn new(pool: SqlitePool, store_id: impl Into<String>) -> Self {
        WithdrawalRepository {
            pool,
            store_id: store_id.into(),
        }
    }

    /// Lists all withdrawals, newest first.
    pub async fn list(&self) -> DbResult<Vec<Withdrawal>> {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT id, store_id, date, kind, beneficiary, amount_cents, description
            FROM withdrawals
            WHERE store_id = ?1
            ORDER BY date DESC, id
            "#,
        )
        .bind(&self.store_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = withdrawals.len(), "Listed withdrawals");
        Ok(withdrawals)
    }

    pub async fn insert(&self, withdrawal: &Withdrawal) -> DbResult<()> {
        debug!(
            id = %withdrawal.id,
            kind = withdrawal.kind.as_str(),
            amount_cents = withdrawal.amount_cents,
            "Inserting withdrawal"
        );

        sqlx::query(
            r#"
            INSERT INTO withdrawals (
                id, store_id, date, kind,
                beneficiary, amount_cents, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&withdrawal.id)
        .bind(&withdrawal.store_id)
        .bind(withdrawal.date)
        .bind(withdrawal.kind)
        .bind(&withdrawal.beneficiary)
        .bind(withdrawal.amount_cents)
        .bind(&withdrawal.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM withdrawals WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(&self.store_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Withdrawal", id));
        }

        debug!(id = %id, "Withdrawal deleted");
        Ok(())
    }
}
