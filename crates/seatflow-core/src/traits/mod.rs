//! Trait seams consumed by the allocation core.
//!
//! Each external concern the orchestrator depends on (storage, locked
//! mutation, credential decryption, the invitation call, team health
//! probing) is defined here as a trait so that backends can be swapped:
//! PostgreSQL vs in-memory, live provider vs test double.

pub mod allocation;
pub mod health;
pub mod notifier;
pub mod repository;
pub mod vault;

pub use allocation::{AllocationStore, AllocationTx};
pub use health::TeamHealthSync;
pub use notifier::InviteNotifier;
pub use repository::{CodeRepository, RecordRepository, TeamRepository};
pub use vault::CredentialVault;
