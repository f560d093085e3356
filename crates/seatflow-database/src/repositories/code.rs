//! Redemption code repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use seatflow_core::error::{AppError, ErrorKind};
use seatflow_core::result::AppResult;
use seatflow_core::traits::CodeRepository;
use seatflow_entity::code::{CreateCode, RedemptionCode};

/// Repository for redemption code rows.
#[derive(Debug, Clone)]
pub struct PgCodeRepository {
    pool: PgPool,
}

impl PgCodeRepository {
    /// Create a new code repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issue a new code (provisioning path).
    pub async fn create(&self, data: &CreateCode) -> AppResult<RedemptionCode> {
        sqlx::query_as::<_, RedemptionCode>(
            "INSERT INTO redemption_codes (code, has_warranty) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.code)
        .bind(data.has_warranty)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create code", e))
    }
}

#[async_trait]
impl CodeRepository for PgCodeRepository {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<RedemptionCode>> {
        sqlx::query_as::<_, RedemptionCode>("SELECT * FROM redemption_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find code", e))
    }
}
