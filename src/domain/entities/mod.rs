//! Core domain entities.
//!
//! - [`ShortLink`] - A resolvable short code and its lifecycle flags
//! - [`ClickEvent`] - One recorded resolution with request context
//! - [`Scope`] - Visibility filter for listing and analytics
//! - [`Breakdown`] - Click counts grouped by a [`Dimension`]
//!
//! Creation inputs use separate structs (`NewShortLink`, `NewClick`) so stored
//! records are only ever produced by a store.

pub mod breakdown;
pub mod click;
pub mod link;
pub mod scope;

pub use breakdown::{Breakdown, Dimension};
pub use click::{ClickContext, ClickEvent, NewClick};
pub use link::{LinkStatus, NewShortLink, ShortLink};
pub use scope::Scope;
