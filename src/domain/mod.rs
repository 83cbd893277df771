//! Domain layer containing business entities and the storage contract.
//!
//! - [`entities`] - Short links, click events and visibility scopes
//! - [`repositories`] - The [`repositories::PersistenceStore`] trait
//!
//! The domain layer has no dependency on infrastructure or presentation code.
//! Business rules live in [`crate::application::services`].

pub mod entities;
pub mod repositories;
