//! Allocation store trait: row-locked transactional mutation.
//!
//! The reservation phase of the redemption flow serializes concurrent
//! attempts per team row and per code row. Implementations must provide
//! exclusive row locking (`SELECT ... FOR UPDATE` on PostgreSQL, a single
//! allocation gate for the in-memory backend) and transactional
//! visibility: nothing staged through a transaction is observable until
//! [`AllocationTx::commit`], and dropping an uncommitted transaction
//! discards every staged write.

use async_trait::async_trait;

use seatflow_entity::code::RedemptionCode;
use seatflow_entity::team::Team;

use crate::result::AppResult;

/// Factory for allocation transactions.
#[async_trait]
pub trait AllocationStore: Send + Sync + 'static {
    /// Begin a new allocation transaction.
    async fn begin(&self) -> AppResult<Box<dyn AllocationTx>>;
}

/// A single allocation transaction holding row locks until commit or drop.
///
/// Callers must acquire locks in Team-then-Code order; the convention
/// prevents cross-deadlock with any future symmetric flow.
#[async_trait]
pub trait AllocationTx: Send {
    /// Lock the team row exclusively and return its current state.
    async fn lock_team(&mut self, team_id: i64) -> AppResult<Option<Team>>;

    /// Lock the code row exclusively and return its current state.
    async fn lock_code(&mut self, code: &str) -> AppResult<Option<RedemptionCode>>;

    /// Stage new state for a previously locked team row.
    async fn update_team(&mut self, team: &Team) -> AppResult<()>;

    /// Stage new state for a previously locked code row.
    async fn update_code(&mut self, code: &RedemptionCode) -> AppResult<()>;

    /// Commit all staged writes and release the locks.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
