//! Click accounting for resolved links.

use chrono::Utc;
use std::sync::Arc;

use crate::application::services::LinkRegistry;
use crate::domain::entities::{ClickContext, NewClick, ShortLink};
use crate::domain::repositories::PersistenceStore;
use crate::error::AppError;

/// Records visits: one lookup, then one atomic increment-and-append.
pub struct ClickRecorder<S: PersistenceStore + ?Sized> {
    store: Arc<S>,
    registry: Arc<LinkRegistry<S>>,
}

impl<S: PersistenceStore + ?Sized> ClickRecorder<S> {
    pub fn new(store: Arc<S>, registry: Arc<LinkRegistry<S>>) -> Self {
        Self { store, registry }
    }

    /// Records one click on `code` and returns the updated link.
    ///
    /// Expiry is applied first through [`LinkRegistry::lookup`]. If the link
    /// becomes unavailable between the lookup and the write, nothing is
    /// recorded, the link is deactivated and [`AppError::NotFound`] is
    /// returned.
    pub async fn record(&self, code: &str, context: ClickContext) -> Result<ShortLink, AppError> {
        let link = match self.registry.lookup(code).await {
            Ok(link) => link,
            Err(e) => {
                if let AppError::NotFound { .. } = e {
                    metrics::counter!("shortlink_resolutions_total", "outcome" => "not_found")
                        .increment(1);
                }
                return Err(e);
            }
        };

        let click = NewClick {
            link_id: link.id,
            timestamp: Utc::now(),
            context,
        };

        let Some(updated) = self.store.record_click(click).await? else {
            // Refused writes mean the link expired or went away after the lookup.
            if self.store.deactivate(link.id).await? {
                metrics::counter!("shortlink_links_expired_total").increment(1);
                tracing::info!(id = link.id, code, "Short link expired");
            }
            metrics::counter!("shortlink_resolutions_total", "outcome" => "not_found").increment(1);
            return Err(AppError::link_unavailable(code));
        };

        metrics::counter!("shortlink_resolutions_total", "outcome" => "found").increment(1);
        metrics::counter!("shortlink_clicks_total").increment(1);
        tracing::debug!(id = updated.id, code, clicks = updated.clicks, "Click recorded");

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::CodeGenerator;
    use crate::domain::entities::NewShortLink;
    use crate::domain::repositories::MockPersistenceStore;

    fn recorder(store: MockPersistenceStore) -> ClickRecorder<MockPersistenceStore> {
        let store = Arc::new(store);
        let generator = Arc::new(CodeGenerator::with_seed(store.clone(), 0));
        let registry = Arc::new(LinkRegistry::new(store.clone(), generator));
        ClickRecorder::new(store, registry)
    }

    fn stored(code: &str) -> ShortLink {
        NewShortLink {
            original_url: "https://example.com".to_string(),
            code: code.to_string(),
            is_custom: true,
            owner: None,
            created_at: Utc::now(),
            expires_at: None,
        }
        .into_link(9)
    }

    fn context() -> ClickContext {
        ClickContext::new("google.com", "Germany", "Mobile", "Mozilla/5.0")
    }

    #[tokio::test]
    async fn test_record_passes_context_to_store() {
        let mut store = MockPersistenceStore::new();
        store
            .expect_find_by_code()
            .returning(|code| Ok(Some(stored(code))));
        store
            .expect_record_click()
            .withf(|click| {
                click.link_id == 9
                    && click.context.source == "google.com"
                    && click.context.country == "Germany"
                    && click.context.device == "Mobile"
            })
            .times(1)
            .returning(|_| {
                let mut link = stored("promo");
                link.clicks = 1;
                Ok(Some(link))
            });

        let link = recorder(store).record("promo", context()).await.unwrap();
        assert_eq!(link.clicks, 1);
    }

    #[tokio::test]
    async fn test_record_unknown_code_records_nothing() {
        let mut store = MockPersistenceStore::new();
        store.expect_find_by_code().returning(|_| Ok(None));
        store.expect_record_click().times(0);

        let err = recorder(store).record("nope", context()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_record_race_with_expiry_is_not_found() {
        let mut store = MockPersistenceStore::new();
        store
            .expect_find_by_code()
            .returning(|code| Ok(Some(stored(code))));
        store.expect_record_click().times(1).returning(|_| Ok(None));
        store
            .expect_deactivate()
            .withf(|id| *id == 9)
            .times(1)
            .returning(|_| Ok(true));

        let err = recorder(store).record("promo", context()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_record_after_concurrent_delete_is_not_found() {
        let mut store = MockPersistenceStore::new();
        store
            .expect_find_by_code()
            .returning(|code| Ok(Some(stored(code))));
        store.expect_record_click().times(1).returning(|_| Ok(None));
        store.expect_deactivate().times(1).returning(|_| Ok(false));

        let err = recorder(store).record("promo", context()).await.unwrap_err();
        assert_eq!(err.to_string(), crate::error::NOT_FOUND_OR_EXPIRED);
    }

    #[tokio::test]
    async fn test_record_surfaces_persistence_failure() {
        let mut store = MockPersistenceStore::new();
        store
            .expect_find_by_code()
            .returning(|code| Ok(Some(stored(code))));
        store
            .expect_record_click()
            .returning(|click| Err(AppError::persistence("record_click", click.link_id.to_string(), "io")));

        let err = recorder(store).record("promo", context()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Persistence {
                operation: "record_click",
                ..
            }
        ));
    }
}
