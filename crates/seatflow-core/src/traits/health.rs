//! Team health sync trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Probes a team's provider-side health and updates its stored status.
///
/// Banned and error statuses enter the system through this collaborator;
/// the orchestrator itself only ever moves teams between `active` and
/// `full`.
#[async_trait]
pub trait TeamHealthSync: Send + Sync + 'static {
    /// Re-check one team against the provider, persisting the resulting
    /// status and probe timestamp as a side effect.
    async fn sync_team(&self, team_id: i64) -> AppResult<()>;
}
