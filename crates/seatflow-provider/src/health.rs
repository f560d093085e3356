//! Team health probe.
//!
//! Re-checks a team's workspace against the provider and persists the
//! resulting status. This is the only writer of the `banned` and `error`
//! statuses; membership bookkeeping never passes through here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use seatflow_core::config::provider::ProviderConfig;
use seatflow_core::error::AppError;
use seatflow_core::result::AppResult;
use seatflow_core::traits::{CredentialVault, TeamHealthSync, TeamRepository};
use seatflow_entity::team::{Team, TeamStatus};

/// Health sync backed by the provider HTTP API.
pub struct HttpTeamHealthSync {
    client: Client,
    base_url: String,
    teams: Arc<dyn TeamRepository>,
    vault: Arc<dyn CredentialVault>,
}

impl HttpTeamHealthSync {
    /// Build a health sync from configuration and its storage/vault
    /// collaborators.
    pub fn new(
        config: &ProviderConfig,
        teams: Arc<dyn TeamRepository>,
        vault: Arc<dyn CredentialVault>,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build provider HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            teams,
            vault,
        })
    }

    async fn probe(&self, team: &Team) -> AppResult<u16> {
        let secret = self.vault.decrypt(&team.credential_encrypted)?;
        let url = format!("{}/accounts/{}", self.base_url, team.account_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(secret)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Health probe failed: {e}")))?;
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl TeamHealthSync for HttpTeamHealthSync {
    async fn sync_team(&self, team_id: i64) -> AppResult<()> {
        let team = self
            .teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Team {team_id} does not exist")))?;

        let status = match self.probe(&team).await {
            Ok(http_status) => classify_probe(http_status, &team),
            Err(e) => {
                warn!(team_id, error = %e, "Health probe did not complete");
                TeamStatus::Error
            }
        };

        if status != team.status {
            info!(team_id, from = %team.status, to = %status, "Team health transition");
        }
        self.teams.update_health(team_id, status, Utc::now()).await
    }
}

/// Map a probe's HTTP status onto a team status. A 2xx recovers an
/// `error` team; `banned` is entered on 401/403 and never left here.
fn classify_probe(http_status: u16, team: &Team) -> TeamStatus {
    match http_status {
        401 | 403 => TeamStatus::Banned,
        s if (200..300).contains(&s) => match team.status {
            TeamStatus::Error => {
                if team.has_capacity() {
                    TeamStatus::Active
                } else {
                    TeamStatus::Full
                }
            }
            other => other,
        },
        _ => TeamStatus::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn team(status: TeamStatus, current: i32, max: i32) -> Team {
        Team {
            id: 1,
            name: "alpha".to_string(),
            account_id: "acct-1".to_string(),
            credential_encrypted: String::new(),
            status,
            current_members: current,
            max_members: max,
            expires_at: None,
            last_sync: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_auth_rejection_means_banned() {
        assert_eq!(
            classify_probe(401, &team(TeamStatus::Active, 0, 5)),
            TeamStatus::Banned
        );
        assert_eq!(
            classify_probe(403, &team(TeamStatus::Full, 5, 5)),
            TeamStatus::Banned
        );
    }

    #[test]
    fn test_success_keeps_serving_status() {
        assert_eq!(
            classify_probe(200, &team(TeamStatus::Active, 1, 5)),
            TeamStatus::Active
        );
        assert_eq!(
            classify_probe(200, &team(TeamStatus::Full, 5, 5)),
            TeamStatus::Full
        );
        // Banned stays banned even when a probe succeeds.
        assert_eq!(
            classify_probe(200, &team(TeamStatus::Banned, 0, 5)),
            TeamStatus::Banned
        );
    }

    #[test]
    fn test_success_recovers_error_team() {
        assert_eq!(
            classify_probe(204, &team(TeamStatus::Error, 2, 5)),
            TeamStatus::Active
        );
        assert_eq!(
            classify_probe(204, &team(TeamStatus::Error, 5, 5)),
            TeamStatus::Full
        );
    }

    #[test]
    fn test_server_failure_means_error() {
        assert_eq!(
            classify_probe(500, &team(TeamStatus::Active, 0, 5)),
            TeamStatus::Error
        );
        assert_eq!(
            classify_probe(429, &team(TeamStatus::Active, 0, 5)),
            TeamStatus::Error
        );
    }
}
