//! Short link entity and its lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A resolvable short code pointing at a target address.
///
/// `code`, `original_url` and `created_at` never change after creation.
/// `clicks` only grows, and `is_active` only ever goes from `true` to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortLink {
    pub id: i64,
    pub original_url: String,
    pub code: String,
    pub is_custom: bool,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Lifecycle state derived from the stored flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Expired,
    Deleted,
}

impl ShortLink {
    /// Returns true if the link has been removed.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if `expires_at` lies at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if a lookup at `now` may resolve this link.
    pub fn is_resolvable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_deleted() && !self.is_expired_at(now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.is_deleted() {
            LinkStatus::Deleted
        } else if !self.is_active || self.is_expired_at(now) {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        }
    }
}

/// Input data for persisting a new link.
///
/// The code must already be reserved in the store's historical code space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub original_url: String,
    pub code: String,
    pub is_custom: bool,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewShortLink {
    /// Materializes the stored record once the store has assigned an id.
    pub fn into_link(self, id: i64) -> ShortLink {
        ShortLink {
            id,
            original_url: self.original_url,
            code: self.code,
            is_custom: self.is_custom,
            owner: self.owner,
            created_at: self.created_at,
            expires_at: self.expires_at,
            clicks: 0,
            is_active: true,
            deleted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_link(expires_at: Option<DateTime<Utc>>) -> NewShortLink {
        NewShortLink {
            original_url: "https://example.com".to_string(),
            code: "abc123".to_string(),
            is_custom: false,
            owner: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_into_link_starts_active_with_zero_clicks() {
        let link = new_link(None).into_link(7);

        assert_eq!(link.id, 7);
        assert_eq!(link.code, "abc123");
        assert_eq!(link.clicks, 0);
        assert!(link.is_active);
        assert!(!link.is_deleted());
        assert_eq!(link.status(Utc::now()), LinkStatus::Active);
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        let link = new_link(None).into_link(1);
        let far_future = Utc::now() + Duration::days(365 * 100);

        assert!(!link.is_expired_at(far_future));
        assert!(link.is_resolvable_at(far_future));
    }

    #[test]
    fn test_link_expires_at_boundary() {
        let now = Utc::now();
        let link = new_link(Some(now)).into_link(1);

        assert!(link.is_expired_at(now));
        assert!(!link.is_expired_at(now - Duration::seconds(1)));
        assert_eq!(link.status(now), LinkStatus::Expired);
    }

    #[test]
    fn test_deleted_status_wins_over_expired() {
        let now = Utc::now();
        let mut link = new_link(Some(now - Duration::days(1))).into_link(1);
        link.is_active = false;
        link.deleted_at = Some(now);

        assert_eq!(link.status(now), LinkStatus::Deleted);
        assert!(!link.is_resolvable_at(now));
    }
}
