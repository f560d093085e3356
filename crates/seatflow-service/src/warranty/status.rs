//! Warranty status query.
//!
//! Read-side aggregation answering "is this code or email still under
//! warranty, and is any associated team banned". Never holds the
//! orchestration locks; team health is re-checked live through the
//! health-sync collaborator before reporting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use seatflow_core::result::AppResult;
use seatflow_core::traits::{CodeRepository, RecordRepository, TeamHealthSync, TeamRepository};
use seatflow_entity::code::RedemptionCode;
use seatflow_entity::team::TeamStatus;

use super::limiter::{LookupKind, QueryRateLimiter};

/// The subject of a warranty status lookup.
#[derive(Debug, Clone)]
pub enum WarrantyLookup {
    /// Look up by requester email.
    Email(String),
    /// Look up by redemption code.
    Code(String),
}

impl WarrantyLookup {
    fn kind(&self) -> LookupKind {
        match self {
            Self::Email(_) => LookupKind::Email,
            Self::Code(_) => LookupKind::Code,
        }
    }

    fn value(&self) -> &str {
        match self {
            Self::Email(v) | Self::Code(v) => v,
        }
    }
}

/// A team reported banned by the status query.
#[derive(Debug, Clone, Serialize)]
pub struct BannedTeam {
    /// The banned team's id.
    pub team_id: i64,
    /// The banned team's display name.
    pub name: String,
    /// When the ban was observed (last health probe).
    pub banned_at: Option<DateTime<Utc>>,
}

/// Aggregated warranty status for a code or email.
#[derive(Debug, Clone, Serialize)]
pub struct WarrantyStatus {
    /// Whether a warranty code was resolved.
    pub has_warranty: bool,
    /// Whether the warranty window is still open.
    pub warranty_valid: bool,
    /// The warranty cutoff, if any.
    pub warranty_expires_at: Option<DateTime<Utc>>,
    /// Teams from the code's history that are currently banned.
    pub banned_teams: Vec<BannedTeam>,
    /// Whether the code can be redeemed again right now.
    pub can_reuse: bool,
    /// The resolved code, when one was found.
    pub original_code: Option<String>,
}

impl WarrantyStatus {
    fn without_warranty(original_code: Option<String>) -> Self {
        Self {
            has_warranty: false,
            warranty_valid: false,
            warranty_expires_at: None,
            banned_teams: Vec::new(),
            can_reuse: false,
            original_code,
        }
    }
}

/// Rate-limited warranty status aggregation.
pub struct WarrantyStatusQuery {
    codes: Arc<dyn CodeRepository>,
    teams: Arc<dyn TeamRepository>,
    records: Arc<dyn RecordRepository>,
    health: Arc<dyn TeamHealthSync>,
    limiter: Arc<QueryRateLimiter>,
}

impl WarrantyStatusQuery {
    /// Creates a new status query.
    pub fn new(
        codes: Arc<dyn CodeRepository>,
        teams: Arc<dyn TeamRepository>,
        records: Arc<dyn RecordRepository>,
        health: Arc<dyn TeamHealthSync>,
        limiter: Arc<QueryRateLimiter>,
    ) -> Self {
        Self {
            codes,
            teams,
            records,
            health,
            limiter,
        }
    }

    /// Resolve the warranty status for a code or email.
    pub async fn check(&self, lookup: &WarrantyLookup) -> AppResult<WarrantyStatus> {
        self.limiter.acquire(lookup.kind(), lookup.value()).await?;

        let Some(code_row) = self.resolve_code(lookup).await? else {
            return Ok(WarrantyStatus::without_warranty(None));
        };
        if !code_row.has_warranty {
            return Ok(WarrantyStatus::without_warranty(Some(code_row.code)));
        }

        let warranty_valid = !code_row.warranty_expired_at(Utc::now());
        let banned_teams = self.collect_banned_teams(&code_row.code).await?;
        let can_reuse = warranty_valid && !banned_teams.is_empty();

        Ok(WarrantyStatus {
            has_warranty: true,
            warranty_valid,
            warranty_expires_at: code_row.warranty_expires_at,
            banned_teams,
            can_reuse,
            original_code: Some(code_row.code),
        })
    }

    /// Resolve the lookup subject to a code row. An email resolves to the
    /// first of its recorded codes that carries a warranty.
    async fn resolve_code(&self, lookup: &WarrantyLookup) -> AppResult<Option<RedemptionCode>> {
        match lookup {
            WarrantyLookup::Code(code) => self.codes.find_by_code(code).await,
            WarrantyLookup::Email(email) => {
                for record in self.records.list_by_email(email).await? {
                    if let Some(row) = self.codes.find_by_code(&record.code).await? {
                        if row.has_warranty {
                            return Ok(Some(row));
                        }
                    }
                }
                Ok(None)
            }
        }
    }

    /// Walk every team linked to the code's records, re-checking health
    /// live for teams not already banned, and collect the banned ones.
    async fn collect_banned_teams(&self, code: &str) -> AppResult<Vec<BannedTeam>> {
        let mut banned = Vec::new();
        let mut seen: Vec<i64> = Vec::new();

        for record in self.records.list_by_code(code).await? {
            if seen.contains(&record.team_id) {
                continue;
            }
            seen.push(record.team_id);

            let Some(team) = self.teams.find_by_id(record.team_id).await? else {
                continue;
            };
            if team.status != TeamStatus::Banned {
                // Live probe; on failure the stored status stands.
                if let Err(e) = self.health.sync_team(team.id).await {
                    warn!(team_id = team.id, error = %e, "Health re-check failed");
                }
            }

            if let Some(team) = self.teams.find_by_id(record.team_id).await? {
                if team.status == TeamStatus::Banned {
                    banned.push(BannedTeam {
                        team_id: team.id,
                        name: team.name,
                        banned_at: team.last_sync,
                    });
                }
            }
        }
        Ok(banned)
    }
}
