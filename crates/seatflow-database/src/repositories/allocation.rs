//! PostgreSQL allocation store.
//!
//! Row locks are taken with `SELECT ... FOR UPDATE` inside a sqlx
//! transaction; dropping the transaction without commit aborts it and
//! discards every staged write, which is what makes phase-1 failures
//! need no explicit compensation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use seatflow_core::error::{AppError, ErrorKind};
use seatflow_core::result::AppResult;
use seatflow_core::traits::{AllocationStore, AllocationTx};
use seatflow_entity::code::RedemptionCode;
use seatflow_entity::team::Team;

/// Allocation store backed by PostgreSQL row locks.
#[derive(Debug, Clone)]
pub struct PgAllocationStore {
    pool: PgPool,
}

impl PgAllocationStore {
    /// Create a new allocation store on the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AllocationStore for PgAllocationStore {
    async fn begin(&self) -> AppResult<Box<dyn AllocationTx>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgAllocationTx { tx }))
    }
}

/// One allocation transaction holding row locks until commit or drop.
struct PgAllocationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AllocationTx for PgAllocationTx {
    async fn lock_team(&mut self, team_id: i64) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1 FOR UPDATE")
            .bind(team_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock team", e))
    }

    async fn lock_code(&mut self, code: &str) -> AppResult<Option<RedemptionCode>> {
        sqlx::query_as::<_, RedemptionCode>(
            "SELECT * FROM redemption_codes WHERE code = $1 FOR UPDATE",
        )
        .bind(code)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock code", e))
    }

    async fn update_team(&mut self, team: &Team) -> AppResult<()> {
        sqlx::query("UPDATE teams SET status = $2, current_members = $3 WHERE id = $1")
            .bind(team.id)
            .bind(team.status)
            .bind(team.current_members)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update team", e))?;
        Ok(())
    }

    async fn update_code(&mut self, code: &RedemptionCode) -> AppResult<()> {
        sqlx::query(
            "UPDATE redemption_codes \
             SET status = $2, warranty_expires_at = $3, used_by_email = $4, \
                 used_team_id = $5, used_at = $6 \
             WHERE code = $1",
        )
        .bind(&code.code)
        .bind(code.status)
        .bind(code.warranty_expires_at)
        .bind(&code.used_by_email)
        .bind(code.used_team_id)
        .bind(code.used_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update code", e))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}
