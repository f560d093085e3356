//! Redemption record entity: the append-only redemption history.

pub mod model;

pub use model::{NewRedemptionRecord, RedemptionRecord};
