//! Persistence store implementations.
//!
//! # Stores
//!
//! - [`MemoryStore`] - in-process maps behind a single lock
//! - [`PgStore`] - PostgreSQL via SQLx with migrations from `./migrations`

pub mod memory_store;
pub mod pg_store;

pub use memory_store::MemoryStore;
pub use pg_store::{PgStore, PoolSettings};
