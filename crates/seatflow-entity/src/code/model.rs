//! Redemption code entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Consumption state of a redemption code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "code_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    /// Never redeemed.
    Unused,
    /// Consumed by a plain (non-warranty) redemption.
    Used,
    /// Held by a warranty redemption; may become reusable if the joined
    /// team fails.
    WarrantyActive,
}

impl CodeStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Used => "used",
            Self::WarrantyActive => "warranty_active",
        }
    }
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A redemption code row.
///
/// Mutated exclusively by the orchestrator and its rollback path. A code
/// never returns from `used`/`warranty_active` to `unused` except through
/// rollback. The assignment snapshot (`used_by_email`, `used_team_id`,
/// `used_at`) is meaningful only when the status is not `unused`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RedemptionCode {
    /// The unique code string (primary key).
    pub code: String,
    /// Consumption state.
    pub status: CodeStatus,
    /// Whether this code carries a warranty entitlement.
    pub has_warranty: bool,
    /// Warranty cutoff; None = unlimited. Set on first use only.
    pub warranty_expires_at: Option<DateTime<Utc>>,
    /// Email of the current holder.
    pub used_by_email: Option<String>,
    /// Team the current holder joined.
    pub used_team_id: Option<i64>,
    /// When the current assignment was made.
    pub used_at: Option<DateTime<Utc>>,
    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}

impl RedemptionCode {
    /// Whether the code has never been redeemed.
    pub fn is_unused(&self) -> bool {
        self.status == CodeStatus::Unused
    }

    /// Whether the warranty window has closed at `now`. A code without a
    /// cutoff never expires.
    pub fn warranty_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.warranty_expires_at.is_some_and(|t| t < now)
    }

    /// Drop the assignment snapshot (rollback to unused).
    pub fn clear_assignment(&mut self) {
        self.used_by_email = None;
        self.used_team_id = None;
        self.used_at = None;
    }
}

/// Data required to issue a new code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCode {
    /// The unique code string.
    pub code: String,
    /// Whether the code carries a warranty entitlement.
    pub has_warranty: bool,
}
