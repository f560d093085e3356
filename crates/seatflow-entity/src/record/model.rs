//! Redemption record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One confirmed redemption.
///
/// Append-only: never updated or deleted. Written only after the
/// invitation succeeded, so the history carries confirmed holders only;
/// an in-flight reservation that fails leaves no record. Rollback leans on
/// this to restore a warranty code to its last confirmed holder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RedemptionRecord {
    /// Unique record identifier.
    pub id: i64,
    /// Email of the requester who redeemed.
    pub email: String,
    /// The redeemed code.
    pub code: String,
    /// Team joined.
    pub team_id: i64,
    /// Provider-side account id of that team at redemption time.
    pub account_id: String,
    /// Whether this was a warranty redemption.
    pub is_warranty_redemption: bool,
    /// When the redemption was confirmed.
    pub redeemed_at: DateTime<Utc>,
}

/// Insert shape for a redemption record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRedemptionRecord {
    /// Email of the requester.
    pub email: String,
    /// The redeemed code.
    pub code: String,
    /// Team joined.
    pub team_id: i64,
    /// Provider-side account id of that team.
    pub account_id: String,
    /// Whether this was a warranty redemption.
    pub is_warranty_redemption: bool,
}
