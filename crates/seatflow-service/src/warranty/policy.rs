//! Warranty reuse policy.
//!
//! Decides, from the append-only redemption history, whether a warranty
//! code may be redeemed again by a given requester. Pure reads; the
//! orchestrator calls this under its allocation lock, but the policy
//! itself never takes locks.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use seatflow_core::result::AppResult;
use seatflow_core::traits::{CodeRepository, RecordRepository, TeamRepository};
use seatflow_entity::team::Team;

/// Outcome of a reuse-eligibility check.
#[derive(Debug, Clone, Serialize)]
pub enum ReuseDecision {
    /// Reuse is permitted.
    Allowed {
        /// Why the reuse is permitted.
        reason: String,
    },
    /// Reuse is refused.
    Denied {
        /// Why the reuse is refused.
        reason: String,
    },
}

impl ReuseDecision {
    fn allowed(reason: impl Into<String>) -> Self {
        Self::Allowed {
            reason: reason.into(),
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }

    /// Whether the code may be reused.
    pub fn can_reuse(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// The stated reason.
    pub fn reason(&self) -> &str {
        match self {
            Self::Allowed { reason } | Self::Denied { reason } => reason,
        }
    }
}

/// History-driven warranty reuse policy.
#[derive(Clone)]
pub struct WarrantyPolicy {
    codes: Arc<dyn CodeRepository>,
    teams: Arc<dyn TeamRepository>,
    records: Arc<dyn RecordRepository>,
}

impl WarrantyPolicy {
    /// Creates a new policy.
    pub fn new(
        codes: Arc<dyn CodeRepository>,
        teams: Arc<dyn TeamRepository>,
        records: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            codes,
            teams,
            records,
        }
    }

    /// Decide whether `email` may redeem `code` again.
    ///
    /// Rules, in strict order: the code must carry an unexpired warranty;
    /// a requester with no history gets first use; a requester whose
    /// recorded team is still serving and unexpired is already served;
    /// a recorded team that failed (banned/error) opens the warranty;
    /// teams that merely expired on schedule do not.
    pub async fn reuse_allowed(&self, code: &str, email: &str) -> AppResult<ReuseDecision> {
        let Some(row) = self.codes.find_by_code(code).await? else {
            return Ok(ReuseDecision::denied("Redemption code does not exist"));
        };

        if !row.has_warranty {
            return Ok(ReuseDecision::denied("Code carries no warranty"));
        }

        let now = Utc::now();
        if row.warranty_expired_at(now) {
            return Ok(ReuseDecision::denied("Warranty has expired"));
        }

        let records = self.records.list_by_code_and_email(code, email).await?;
        if records.is_empty() {
            return Ok(ReuseDecision::allowed("First use"));
        }

        let mut teams: Vec<Team> = Vec::new();
        for record in &records {
            if teams.iter().any(|t| t.id == record.team_id) {
                continue;
            }
            if let Some(team) = self.teams.find_by_id(record.team_id).await? {
                teams.push(team);
            }
        }

        if let Some(team) = teams
            .iter()
            .find(|t| t.status.is_serving() && !t.is_expired_at(now))
        {
            return Ok(ReuseDecision::denied(format!(
                "Already served by team {} ({})",
                team.name, team.id
            )));
        }

        if teams.iter().any(|t| t.status.is_failed()) {
            return Ok(ReuseDecision::allowed(
                "A previously joined team has failed",
            ));
        }

        Ok(ReuseDecision::denied(
            "Warranty does not cover teams that expired on schedule",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use seatflow_core::traits::TeamRepository as _;
    use seatflow_database::memory::MemoryStore;
    use seatflow_entity::code::{CodeStatus, CreateCode};
    use seatflow_entity::record::NewRedemptionRecord;
    use seatflow_entity::team::{CreateTeam, TeamStatus};

    fn policy(store: &MemoryStore) -> WarrantyPolicy {
        let shared = Arc::new(store.clone());
        WarrantyPolicy::new(shared.clone(), shared.clone(), shared)
    }

    fn create_team(name: &str, expires_in_days: i64) -> CreateTeam {
        CreateTeam {
            name: name.to_string(),
            account_id: format!("acct-{name}"),
            credential_encrypted: "cipher".to_string(),
            max_members: 5,
            expires_at: Some(Utc::now() + Duration::days(expires_in_days)),
        }
    }

    async fn seed_warranty_redemption(store: &MemoryStore, team_id: i64, email: &str) {
        let mut row = store.insert_code(&CreateCode {
            code: "W-1".to_string(),
            has_warranty: true,
        });
        row.status = CodeStatus::WarrantyActive;
        row.warranty_expires_at = Some(Utc::now() + Duration::days(30));
        row.used_by_email = Some(email.to_string());
        row.used_team_id = Some(team_id);
        row.used_at = Some(Utc::now());
        store.put_code(row);
        seatflow_core::traits::RecordRepository::append(
            store,
            &NewRedemptionRecord {
                email: email.to_string(),
                code: "W-1".to_string(),
                team_id,
                account_id: "acct".to_string(),
                is_warranty_redemption: true,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_plain_code_is_never_reusable() {
        let store = MemoryStore::new();
        store.insert_code(&CreateCode {
            code: "PLAIN".to_string(),
            has_warranty: false,
        });
        let decision = policy(&store).reuse_allowed("PLAIN", "a@x.com").await.unwrap();
        assert!(!decision.can_reuse());
    }

    #[tokio::test]
    async fn test_expired_warranty_denied() {
        let store = MemoryStore::new();
        let mut row = store.insert_code(&CreateCode {
            code: "W-1".to_string(),
            has_warranty: true,
        });
        row.warranty_expires_at = Some(Utc::now() - Duration::days(1));
        store.put_code(row);

        let decision = policy(&store).reuse_allowed("W-1", "a@x.com").await.unwrap();
        assert!(!decision.can_reuse());
        assert_eq!(decision.reason(), "Warranty has expired");
    }

    #[tokio::test]
    async fn test_first_use_allowed() {
        let store = MemoryStore::new();
        store.insert_code(&CreateCode {
            code: "W-1".to_string(),
            has_warranty: true,
        });
        let decision = policy(&store).reuse_allowed("W-1", "a@x.com").await.unwrap();
        assert!(decision.can_reuse());
        assert_eq!(decision.reason(), "First use");
    }

    #[tokio::test]
    async fn test_denied_while_recorded_team_still_serves() {
        let store = MemoryStore::new();
        let team = store.insert_team(&create_team("alpha", 60));
        seed_warranty_redemption(&store, team.id, "a@x.com").await;

        let decision = policy(&store).reuse_allowed("W-1", "a@x.com").await.unwrap();
        assert!(!decision.can_reuse());

        // A different requester with no history still gets first use.
        let other = policy(&store).reuse_allowed("W-1", "b@x.com").await.unwrap();
        assert!(other.can_reuse());
    }

    #[tokio::test]
    async fn test_allowed_after_recorded_team_is_banned() {
        let store = MemoryStore::new();
        let team = store.insert_team(&create_team("alpha", 60));
        seed_warranty_redemption(&store, team.id, "a@x.com").await;

        store
            .update_health(team.id, TeamStatus::Banned, Utc::now())
            .await
            .unwrap();

        let decision = policy(&store).reuse_allowed("W-1", "a@x.com").await.unwrap();
        assert!(decision.can_reuse());
    }

    #[tokio::test]
    async fn test_scheduled_expiry_not_covered() {
        let store = MemoryStore::new();
        let mut team = store.insert_team(&create_team("alpha", 60));
        team.expires_at = Some(Utc::now() - Duration::days(1));
        store.put_team(team.clone());
        seed_warranty_redemption(&store, team.id, "a@x.com").await;

        let decision = policy(&store).reuse_allowed("W-1", "a@x.com").await.unwrap();
        assert!(!decision.can_reuse());
        assert_eq!(
            decision.reason(),
            "Warranty does not cover teams that expired on schedule"
        );
    }
}
