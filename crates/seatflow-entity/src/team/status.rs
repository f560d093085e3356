//! Team lifecycle status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a team.
///
/// `Full` is entered and left only through the orchestrator's own
/// membership bookkeeping. `Banned` and `Error` are set by the health-sync
/// collaborator when the provider reports the workspace unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    /// Accepting members (seats may still be open).
    Active,
    /// The member cap has been reached.
    Full,
    /// The provider banned the workspace.
    Banned,
    /// The workspace is unreachable or misbehaving.
    Error,
}

impl TeamStatus {
    /// Whether the team has failed on the provider side. Warranty covers
    /// exactly these states, never ordinary expiry.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Banned | Self::Error)
    }

    /// Whether the team is still serving its members.
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Active | Self::Full)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Full => "full",
            Self::Banned => "banned",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
