//! Team entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::TeamStatus;

/// A provider workspace with a fixed seat cap.
///
/// Invariant: `current_members <= max_members`, and `status = full` iff
/// the cap is reached through this system's own bookkeeping. The member
/// counter is only ever mutated inside a lock-protected allocation
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    /// Unique team identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Provider-side workspace account id.
    pub account_id: String,
    /// Vault ciphertext of the provider access token.
    pub credential_encrypted: String,
    /// Lifecycle status.
    pub status: TeamStatus,
    /// Seats currently occupied.
    pub current_members: i32,
    /// Seat cap.
    pub max_members: i32,
    /// When the workspace subscription expires (None = unknown).
    pub expires_at: Option<DateTime<Utc>>,
    /// When the health-sync collaborator last probed this team.
    pub last_sync: Option<DateTime<Utc>>,
    /// When the team was registered.
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Whether at least one seat is still open.
    pub fn has_capacity(&self) -> bool {
        self.current_members < self.max_members
    }

    /// Whether the subscription has lapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t < now)
    }

    /// Whether a new member could join right now: active with an open seat.
    pub fn is_joinable(&self) -> bool {
        self.status == TeamStatus::Active && self.has_capacity()
    }
}

/// Data required to register a new team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Display name.
    pub name: String,
    /// Provider-side workspace account id.
    pub account_id: String,
    /// Vault ciphertext of the provider access token.
    pub credential_encrypted: String,
    /// Seat cap.
    pub max_members: i32,
    /// When the workspace subscription expires.
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

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
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_joinable_requires_active_and_capacity() {
        assert!(team(TeamStatus::Active, 4, 5).is_joinable());
        assert!(!team(TeamStatus::Active, 5, 5).is_joinable());
        assert!(!team(TeamStatus::Full, 5, 5).is_joinable());
        assert!(!team(TeamStatus::Banned, 0, 5).is_joinable());
    }

    #[test]
    fn test_expiry_check() {
        let mut t = team(TeamStatus::Active, 0, 5);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(!t.is_expired_at(now));
        t.expires_at = Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
        assert!(t.is_expired_at(now));
    }
}
