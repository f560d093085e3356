//! Seat-allocation orchestration.
//!
//! The redemption flow is a three-phase saga: reserve the seat in one
//! short row-locked transaction, make the external invitation call with
//! no locks held, then finalize by appending the immutable redemption
//! record, or compensate by reverting the reservation. Lock order is
//! always Team-then-Code.
//!
//! There is no durable in-flight marker: a process crash between the
//! phase-1 commit and phase 3 leaves an orphaned reservation that needs
//! manual repair.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use seatflow_core::config::warranty::WarrantyConfig;
use seatflow_core::error::AppError;
use seatflow_core::result::AppResult;
use seatflow_core::traits::{
    AllocationStore, CredentialVault, InviteNotifier, RecordRepository, TeamRepository,
};
use seatflow_entity::code::{CodeStatus, RedemptionCode};
use seatflow_entity::record::NewRedemptionRecord;
use seatflow_entity::team::{Team, TeamStatus};

use crate::warranty::policy::{ReuseDecision, WarrantyPolicy};

use super::selector::TeamSelector;
use super::validator::{CodeValidation, RedemptionValidator};

/// A team as presented to a requester choosing where to redeem.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    /// Team id.
    pub team_id: i64,
    /// Display name.
    pub name: String,
    /// Seats currently occupied.
    pub current_members: i32,
    /// Seat cap.
    pub max_members: i32,
    /// Subscription expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            team_id: team.id,
            name: team.name.clone(),
            current_members: team.current_members,
            max_members: team.max_members,
            expires_at: team.expires_at,
        }
    }
}

/// Outcome of verifying a code before redemption.
#[derive(Debug, Clone, Serialize)]
pub struct RedeemPrecheck {
    /// Whether the code may enter the redemption flow.
    pub valid: bool,
    /// Denial reason when invalid.
    pub reason: Option<String>,
    /// Teams currently accepting members.
    pub teams: Vec<TeamSummary>,
}

/// Result of a confirmed redemption.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionReceipt {
    /// Human-readable confirmation.
    pub message: String,
    /// The joined team's id.
    pub team_id: i64,
    /// The joined team's display name.
    pub team_name: String,
    /// The joined team's provider account id.
    pub account_id: String,
    /// The joined team's subscription expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Snapshot of a committed phase-1 reservation, carried into phase 2
/// so no database read happens while the invitation is in flight.
#[derive(Debug, Clone)]
struct Reservation {
    team_id: i64,
    team_name: String,
    account_id: String,
    team_expires_at: Option<DateTime<Utc>>,
    credential_encrypted: String,
    is_warranty: bool,
}

/// The seat-allocation orchestrator.
#[derive(Clone)]
pub struct RedeemService {
    store: Arc<dyn AllocationStore>,
    teams: Arc<dyn TeamRepository>,
    records: Arc<dyn RecordRepository>,
    validator: RedemptionValidator,
    selector: TeamSelector,
    policy: WarrantyPolicy,
    vault: Arc<dyn CredentialVault>,
    notifier: Arc<dyn InviteNotifier>,
    grace_period: Duration,
}

impl RedeemService {
    /// Creates a new orchestrator from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn AllocationStore>,
        teams: Arc<dyn TeamRepository>,
        records: Arc<dyn RecordRepository>,
        validator: RedemptionValidator,
        selector: TeamSelector,
        policy: WarrantyPolicy,
        vault: Arc<dyn CredentialVault>,
        notifier: Arc<dyn InviteNotifier>,
        config: &WarrantyConfig,
    ) -> Self {
        Self {
            store,
            teams,
            records,
            validator,
            selector,
            policy,
            vault,
            notifier,
            grace_period: Duration::days(config.grace_period_days),
        }
    }

    /// Validate a code and list the teams currently accepting members.
    pub async fn verify_and_list_teams(&self, code: &str) -> AppResult<RedeemPrecheck> {
        let validation = self.validator.validate(code).await?;
        if !validation.is_valid() {
            return Ok(RedeemPrecheck {
                valid: false,
                reason: validation.reason().map(str::to_string),
                teams: Vec::new(),
            });
        }

        let teams = self.teams.list_available().await?;
        Ok(RedeemPrecheck {
            valid: true,
            reason: None,
            teams: teams.iter().map(TeamSummary::from).collect(),
        })
    }

    /// Redeem a code for `email`, joining `team_id` or an auto-selected
    /// team.
    ///
    /// Phases 2 and 3 run in a spawned task whose handle is awaited here,
    /// so compensation is reached even if this future is dropped with the
    /// invitation in flight.
    pub async fn redeem(
        &self,
        email: &str,
        code: &str,
        team_id: Option<i64>,
    ) -> AppResult<RedemptionReceipt> {
        match self.validator.validate(code).await? {
            CodeValidation::Valid => {}
            CodeValidation::NotFound => {
                return Err(AppError::validation("Redemption code does not exist"));
            }
            CodeValidation::AlreadyConsumed => {
                return Err(AppError::conflict("Redemption code has already been used"));
            }
        }

        let team_id = match team_id {
            Some(id) => id,
            None => self
                .selector
                .select_auto()
                .await?
                .ok_or_else(|| AppError::conflict("No team with open seats is available"))?,
        };

        let reservation = self.reserve(email, code, team_id).await?;
        info!(email, code, team_id, "Seat reserved");

        let service = self.clone();
        let task_email = email.to_string();
        let task_code = code.to_string();
        let outcome = tokio::spawn(async move {
            service
                .finalize(&task_email, &task_code, reservation)
                .await
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(join_error) => {
                error!(code, team_id, error = %join_error, "Finalize task aborted");
                self.rollback_reservation(code, team_id).await;
                Err(AppError::internal(
                    "Redemption was interrupted before completion",
                ))
            }
        }
    }

    /// Phase 1: re-check and mutate team and code under row locks, then
    /// commit. Any early return drops the transaction and thereby aborts
    /// it.
    async fn reserve(&self, email: &str, code: &str, team_id: i64) -> AppResult<Reservation> {
        let mut tx = self.store.begin().await?;

        let mut team = tx
            .lock_team(team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Team {team_id} does not exist")))?;
        if team.status != TeamStatus::Active {
            return Err(AppError::conflict(format!(
                "Team {} is not accepting members ({})",
                team.id, team.status
            )));
        }
        if !team.has_capacity() {
            return Err(AppError::conflict("Team is full; pick another team"));
        }

        let mut row = tx
            .lock_code(code)
            .await?
            .ok_or_else(|| AppError::validation("Redemption code does not exist"))?;

        let first_use = row.is_unused();
        if !first_use {
            if row.has_warranty {
                match self.policy.reuse_allowed(code, email).await? {
                    ReuseDecision::Allowed { .. } => {}
                    ReuseDecision::Denied { reason } => {
                        return Err(AppError::conflict(reason));
                    }
                }
            } else {
                return Err(AppError::conflict(
                    "Redemption code has already been consumed",
                ));
            }
        }

        let now = Utc::now();
        if row.has_warranty {
            row.status = CodeStatus::WarrantyActive;
            // The grace period starts on first use and is never extended
            // by later warranty redemptions.
            if first_use {
                row.warranty_expires_at = Some(now + self.grace_period);
            }
        } else {
            row.status = CodeStatus::Used;
        }
        row.used_by_email = Some(email.to_string());
        row.used_team_id = Some(team.id);
        row.used_at = Some(now);

        team.current_members += 1;
        if !team.has_capacity() {
            team.status = TeamStatus::Full;
        }

        tx.update_code(&row).await?;
        tx.update_team(&team).await?;
        tx.commit().await?;

        Ok(Reservation {
            team_id: team.id,
            team_name: team.name,
            account_id: team.account_id,
            team_expires_at: team.expires_at,
            credential_encrypted: team.credential_encrypted,
            is_warranty: row.has_warranty,
        })
    }

    /// Phases 2 and 3: decrypt, invite, then append the record or
    /// compensate. Every failure path runs compensation before the
    /// original error is surfaced.
    async fn finalize(
        &self,
        email: &str,
        code: &str,
        reservation: Reservation,
    ) -> AppResult<RedemptionReceipt> {
        let secret = match self.vault.decrypt(&reservation.credential_encrypted) {
            Ok(secret) => secret,
            Err(e) => {
                warn!(code, team_id = reservation.team_id, error = %e,
                      "Credential decryption failed; compensating");
                self.rollback_reservation(code, reservation.team_id).await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .notifier
            .send_invite(&secret, &reservation.account_id, email)
            .await
        {
            warn!(code, team_id = reservation.team_id, error = %e,
                  "Invitation failed; compensating");
            self.rollback_reservation(code, reservation.team_id).await;
            return Err(e);
        }

        let record = NewRedemptionRecord {
            email: email.to_string(),
            code: code.to_string(),
            team_id: reservation.team_id,
            account_id: reservation.account_id.clone(),
            is_warranty_redemption: reservation.is_warranty,
        };
        match self.records.append(&record).await {
            Ok(_) => {
                info!(email, code, team_id = reservation.team_id, "Redemption confirmed");
                Ok(RedemptionReceipt {
                    message: format!("Joined team {}", reservation.team_name),
                    team_id: reservation.team_id,
                    team_name: reservation.team_name,
                    account_id: reservation.account_id,
                    expires_at: reservation.team_expires_at,
                })
            }
            Err(e) => {
                error!(code, error = %e, "Failed to append redemption record; compensating");
                self.rollback_reservation(code, reservation.team_id).await;
                Err(e)
            }
        }
    }

    /// Compensate a phase-1 reservation. Failures are logged, never
    /// re-raised, so they cannot mask the failure that triggered them.
    async fn rollback_reservation(&self, code: &str, team_id: i64) {
        if let Err(e) = self.try_rollback(code, team_id).await {
            error!(code, team_id, error = %e,
                   "Compensation failed; reservation needs manual repair");
        }
    }

    /// Revert the code to the state derived from its confirmed history
    /// and release the seat. The seat is released only when the code row
    /// actually reverted, which makes a repeated rollback for the same
    /// (code, team) a no-op.
    async fn try_rollback(&self, code: &str, team_id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        let team = tx.lock_team(team_id).await?;
        let code_row = tx.lock_code(code).await?;

        let mut reverted = false;
        if let Some(row) = code_row {
            let desired = self.derive_terminal_state(&row).await?;
            if !same_code_state(&row, &desired) {
                tx.update_code(&desired).await?;
                reverted = true;
            }
        }

        if reverted {
            if let Some(mut team) = team {
                if team.current_members > 0 {
                    team.current_members -= 1;
                }
                if team.status == TeamStatus::Full && team.has_capacity() {
                    team.status = TeamStatus::Active;
                }
                tx.update_team(&team).await?;
            }
        }

        tx.commit().await?;
        if reverted {
            info!(code, team_id, "Reservation compensated");
        }
        Ok(())
    }

    /// What the code row should look like with the in-flight reservation
    /// undone: the snapshot of the last confirmed record for a warranty
    /// code, untouched for a confirmed plain code, fully unused otherwise.
    async fn derive_terminal_state(&self, row: &RedemptionCode) -> AppResult<RedemptionCode> {
        let mut desired = row.clone();
        let last_confirmed = self.records.list_by_code(&row.code).await?.into_iter().next();

        match last_confirmed {
            Some(record) if row.has_warranty => {
                desired.status = CodeStatus::WarrantyActive;
                desired.used_by_email = Some(record.email);
                desired.used_team_id = Some(record.team_id);
                desired.used_at = Some(record.redeemed_at);
            }
            Some(_) => {}
            None => {
                desired.status = CodeStatus::Unused;
                desired.warranty_expires_at = None;
                desired.clear_assignment();
            }
        }
        Ok(desired)
    }
}

/// Compare the mutable portion of a code row.
fn same_code_state(a: &RedemptionCode, b: &RedemptionCode) -> bool {
    a.status == b.status
        && a.warranty_expires_at == b.warranty_expires_at
        && a.used_by_email == b.used_by_email
        && a.used_team_id == b.used_team_id
        && a.used_at == b.used_at
}
