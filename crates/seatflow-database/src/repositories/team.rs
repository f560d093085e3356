//! Team repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use seatflow_core::error::{AppError, ErrorKind};
use seatflow_core::result::AppResult;
use seatflow_core::traits::TeamRepository;
use seatflow_entity::team::{CreateTeam, Team, TeamStatus};

/// Repository for team rows.
#[derive(Debug, Clone)]
pub struct PgTeamRepository {
    pool: PgPool,
}

impl PgTeamRepository {
    /// Create a new team repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new team (provisioning path; not part of the
    /// allocation flow).
    pub async fn create(&self, data: &CreateTeam) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name, account_id, credential_encrypted, max_members, expires_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.account_id)
        .bind(&data.credential_encrypted)
        .bind(data.max_members)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create team", e))
    }
}

#[async_trait]
impl TeamRepository for PgTeamRepository {
    async fn find_by_id(&self, team_id: i64) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find team", e))
    }

    async fn list_available(&self) -> AppResult<Vec<Team>> {
        // Soonest-expiring first so teams are drained before they lapse;
        // equal expiries resolve to the lowest id.
        sqlx::query_as::<_, Team>(
            "SELECT * FROM teams \
             WHERE status = 'active' AND current_members < max_members \
             ORDER BY expires_at ASC NULLS LAST, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list teams", e))
    }

    async fn update_health(
        &self,
        team_id: i64,
        status: TeamStatus,
        last_sync: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE teams SET status = $2, last_sync = $3 WHERE id = $1")
            .bind(team_id)
            .bind(status)
            .bind(last_sync)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update team health", e)
            })?;
        Ok(())
    }
}
