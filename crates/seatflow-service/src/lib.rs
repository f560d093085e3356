//! # seatflow-service
//!
//! The allocation core: code validation, team selection, the three-phase
//! redemption orchestrator with compensating rollback, and the warranty
//! policy and status query built on the append-only redemption history.
//!
//! Every component takes its collaborators as `Arc` trait objects;
//! construct each once at process start and pass the references in.

pub mod redeem;
pub mod warranty;

pub use redeem::{RedeemService, RedemptionValidator, TeamSelector};
pub use warranty::{QueryRateLimiter, WarrantyPolicy, WarrantyStatusQuery};
