//! Storage trait definitions for the domain layer.
//!
//! The engine talks to storage only through [`PersistenceStore`]. Concrete
//! stores live in `crate::infrastructure::persistence`; a `mockall` mock is
//! generated for unit tests.

pub mod persistence_store;

pub use persistence_store::PersistenceStore;

#[cfg(test)]
pub use persistence_store::MockPersistenceStore;
