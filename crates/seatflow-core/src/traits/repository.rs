//! Read-side and append-side repository traits.
//!
//! These traits never take row locks; locked mutation goes through
//! [`crate::traits::allocation::AllocationStore`] exclusively.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use seatflow_entity::code::RedemptionCode;
use seatflow_entity::record::{NewRedemptionRecord, RedemptionRecord};
use seatflow_entity::team::{Team, TeamStatus};

use crate::result::AppResult;

/// Lookup access to redemption codes.
#[async_trait]
pub trait CodeRepository: Send + Sync + 'static {
    /// Find a code by its unique code string.
    async fn find_by_code(&self, code: &str) -> AppResult<Option<RedemptionCode>>;
}

/// Lookup and health-update access to teams.
#[async_trait]
pub trait TeamRepository: Send + Sync + 'static {
    /// Find a team by id.
    async fn find_by_id(&self, team_id: i64) -> AppResult<Option<Team>>;

    /// List teams accepting members: `status = active` with open seats,
    /// ordered soonest-expiring first (NULL expiries last), then lowest
    /// id first.
    async fn list_available(&self) -> AppResult<Vec<Team>>;

    /// Record the outcome of a health probe: new status plus the probe
    /// timestamp. Used by the health-sync collaborator only; membership
    /// bookkeeping never goes through this method.
    async fn update_health(
        &self,
        team_id: i64,
        status: TeamStatus,
        last_sync: DateTime<Utc>,
    ) -> AppResult<()>;
}

/// Append-only access to redemption records.
///
/// Records are never updated or deleted; they are the source of truth for
/// reconstructing a code's confirmed holder after a rollback.
#[async_trait]
pub trait RecordRepository: Send + Sync + 'static {
    /// Append one immutable record. Called only on confirmed success.
    async fn append(&self, record: &NewRedemptionRecord) -> AppResult<RedemptionRecord>;

    /// All records for a code, newest first.
    async fn list_by_code(&self, code: &str) -> AppResult<Vec<RedemptionRecord>>;

    /// All records for a (code, email) pair, newest first.
    async fn list_by_code_and_email(
        &self,
        code: &str,
        email: &str,
    ) -> AppResult<Vec<RedemptionRecord>>;

    /// All records for an email, newest first.
    async fn list_by_email(&self, email: &str) -> AppResult<Vec<RedemptionRecord>>;
}
