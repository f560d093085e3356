//! Redemption record repository implementation.
//!
//! The table is append-only; there are deliberately no update or delete
//! statements here.

use async_trait::async_trait;
use sqlx::PgPool;

use seatflow_core::error::{AppError, ErrorKind};
use seatflow_core::result::AppResult;
use seatflow_core::traits::RecordRepository;
use seatflow_entity::record::{NewRedemptionRecord, RedemptionRecord};

/// Repository for the append-only redemption history.
#[derive(Debug, Clone)]
pub struct PgRecordRepository {
    pool: PgPool,
}

impl PgRecordRepository {
    /// Create a new record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn append(&self, record: &NewRedemptionRecord) -> AppResult<RedemptionRecord> {
        sqlx::query_as::<_, RedemptionRecord>(
            "INSERT INTO redemption_records (email, code, team_id, account_id, is_warranty_redemption) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&record.email)
        .bind(&record.code)
        .bind(record.team_id)
        .bind(&record.account_id)
        .bind(record.is_warranty_redemption)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append record", e))
    }

    async fn list_by_code(&self, code: &str) -> AppResult<Vec<RedemptionRecord>> {
        sqlx::query_as::<_, RedemptionRecord>(
            "SELECT * FROM redemption_records WHERE code = $1 \
             ORDER BY redeemed_at DESC, id DESC",
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query records", e))
    }

    async fn list_by_code_and_email(
        &self,
        code: &str,
        email: &str,
    ) -> AppResult<Vec<RedemptionRecord>> {
        sqlx::query_as::<_, RedemptionRecord>(
            "SELECT * FROM redemption_records WHERE code = $1 AND email = $2 \
             ORDER BY redeemed_at DESC, id DESC",
        )
        .bind(code)
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query records", e))
    }

    async fn list_by_email(&self, email: &str) -> AppResult<Vec<RedemptionRecord>> {
        sqlx::query_as::<_, RedemptionRecord>(
            "SELECT * FROM redemption_records WHERE email = $1 \
             ORDER BY redeemed_at DESC, id DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query records", e))
    }
}
