//! Automatic team selection.

use std::sync::Arc;

use tracing::debug;

use seatflow_core::result::AppResult;
use seatflow_core::traits::TeamRepository;

/// Picks a team for callers that do not name one.
///
/// Selection is the soonest-expiring team with an open seat, so capacity
/// is drained before it lapses; equal expiries resolve to the lowest id.
/// The ordering lives in `TeamRepository::list_available`, making the
/// choice deterministic across backends.
#[derive(Clone)]
pub struct TeamSelector {
    teams: Arc<dyn TeamRepository>,
}

impl TeamSelector {
    /// Creates a new selector.
    pub fn new(teams: Arc<dyn TeamRepository>) -> Self {
        Self { teams }
    }

    /// Pick the best available team, or `None` when every team is full,
    /// inactive, or absent.
    pub async fn select_auto(&self) -> AppResult<Option<i64>> {
        let available = self.teams.list_available().await?;
        let picked = available.first().map(|team| team.id);
        if let Some(team_id) = picked {
            debug!(team_id, candidates = available.len(), "Auto-selected team");
        }
        Ok(picked)
    }
}
