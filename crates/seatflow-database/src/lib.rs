//! # seatflow-database
//!
//! Storage backends for Seatflow. The PostgreSQL backend implements the
//! core repository traits with sqlx and provides the allocation store
//! with `SELECT ... FOR UPDATE` row locking. The in-memory backend
//! (feature `memory`, single-node) implements the same traits behind a
//! single allocation gate and backs the test suite.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
