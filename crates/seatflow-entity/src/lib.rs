//! # seatflow-entity
//!
//! Domain entity models for Seatflow. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.
//!
//! This crate has **no** internal dependencies on other Seatflow crates.

pub mod code;
pub mod record;
pub mod team;
