//! Storage contract for link records, the historical code space and click events.

use crate::domain::entities::{
    Breakdown, ClickEvent, Dimension, NewClick, NewShortLink, Scope, ShortLink,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable storage shared by every engine component.
///
/// Implementations must be safe under concurrent callers. Two operations carry
/// atomicity requirements:
///
/// - [`reserve_code`](Self::reserve_code) is an insert-if-absent on the
///   historical code space, so two creators can never claim the same code.
/// - [`record_click`](Self::record_click) increments the counter and appends
///   the event as one unit, so concurrent clicks never lose an increment.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-process map
/// - [`crate::infrastructure::persistence::PgStore`] - PostgreSQL
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Prepares the store for use. Idempotent.
    async fn open(&self) -> Result<(), AppError>;

    /// Releases underlying resources. Later operations fail with
    /// [`AppError::Persistence`].
    async fn close(&self) -> Result<(), AppError>;

    /// Cheap connectivity probe used by health checks.
    async fn health_check(&self) -> Result<(), AppError>;

    /// Returns true if `code` was ever reserved, including by deleted links.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Atomically claims `code` in the historical code space.
    ///
    /// Returns `Ok(false)` if the code was already claimed.
    async fn reserve_code(&self, code: &str) -> Result<bool, AppError>;

    /// Persists a link for a reserved code and assigns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeTaken`] if another link already owns the code.
    async fn insert_link(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Exact, case-sensitive lookup. Deleted links are never returned.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Non-deleted links visible in `scope`, newest first.
    async fn list_links(&self, scope: &Scope) -> Result<Vec<ShortLink>, AppError>;

    /// Flips `is_active` from true to false. Returns whether the flag changed.
    async fn deactivate(&self, id: i64) -> Result<bool, AppError>;

    /// Marks a link deleted and purges its click events.
    ///
    /// Returns `Ok(false)` if the id is unknown or already deleted. The code
    /// stays reserved.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Increments `clicks` and appends one event as a single atomic unit.
    ///
    /// Returns `Ok(None)` without touching anything when the link is missing,
    /// inactive, deleted or expired at the click timestamp.
    async fn record_click(&self, new_click: NewClick) -> Result<Option<ShortLink>, AppError>;

    /// Most recent events of one link, newest first.
    async fn recent_clicks(&self, link_id: i64, limit: usize) -> Result<Vec<ClickEvent>, AppError>;

    /// Events of all links visible in `scope`, oldest first, optionally bounded below.
    async fn list_clicks(
        &self,
        scope: &Scope,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ClickEvent>, AppError>;

    /// Click counts of all links visible in `scope`, grouped by `dimension`.
    ///
    /// Events with an empty text value are not counted. Hours are UTC.
    async fn count_clicks_by(
        &self,
        scope: &Scope,
        dimension: Dimension,
    ) -> Result<Breakdown, AppError>;
}
