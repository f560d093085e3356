//! Invitation notifier trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Sends the workspace invitation that completes a redemption.
///
/// The call is slow and unreliable by nature and must never be made while
/// database locks are held. Retry and timeout policy belong to the
/// implementation; the orchestrator reacts only to the final outcome.
/// Delivery is not exactly-once.
#[async_trait]
pub trait InviteNotifier: Send + Sync + 'static {
    /// Invite `email` to the provider workspace identified by
    /// `account_id`, authenticating with the decrypted `secret`.
    async fn send_invite(&self, secret: &str, account_id: &str, email: &str) -> AppResult<()>;
}
