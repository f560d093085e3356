//! In-memory storage backend.
//!
//! Implements every store trait over one shared state map. Suitable for
//! single-node demos and the test suite; row locking is emulated with a
//! single allocation gate, which is coarser than PostgreSQL row locks but
//! preserves the same serialization guarantees.

pub mod store;

pub use store::MemoryStore;
