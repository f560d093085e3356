//! Redemption code entity: a single-use token entitling its holder to one
//! seat, optionally warranty-flagged.

pub mod model;

pub use model::{CodeStatus, CreateCode, RedemptionCode};
