//! # seatflow-provider
//!
//! Concrete implementations of the external collaborators the allocation
//! core depends on: the HTTP invitation notifier, the team health probe,
//! and the AES-256-GCM credential vault.

pub mod health;
pub mod notifier;
pub mod vault;

pub use health::HttpTeamHealthSync;
pub use notifier::HttpInviteNotifier;
pub use vault::AesCredentialVault;
