//! Application layer services implementing the resolution and analytics engine.
//!
//! Services are generic over the [`PersistenceStore`](crate::domain::repositories::PersistenceStore)
//! they are constructed with, so the same code runs against the in-memory
//! store, PostgreSQL, or a mock.
//!
//! # Available Services
//!
//! - [`services::CodeGenerator`] - Unique code generation and custom code reservation
//! - [`services::LinkRegistry`] - Link creation, lookup with lazy expiry, listing and removal
//! - [`services::ClickRecorder`] - Atomic click accounting
//! - [`services::AnalyticsService`] - Summary, ranking, history and breakdowns

pub mod services;
