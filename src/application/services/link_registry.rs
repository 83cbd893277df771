//! Link lifecycle: creation, lookup with lazy expiry, listing and removal.

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::application::services::CodeGenerator;
use crate::domain::entities::{NewShortLink, Scope, ShortLink};
use crate::domain::repositories::PersistenceStore;
use crate::error::AppError;
use crate::utils::url_validator::validate_target_url;

/// Parameters of a creation request.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub original_url: String,
    pub custom_code: Option<String>,
    /// Days until expiry. Zero or negative values yield an already-expired link.
    pub expiration_days: Option<i64>,
    pub owner: Option<String>,
}

impl CreateLink {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            ..Self::default()
        }
    }

    pub fn custom_code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = Some(code.into());
        self
    }

    pub fn expiration_days(mut self, days: i64) -> Self {
        self.expiration_days = Some(days);
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Owns the lifecycle of every [`ShortLink`].
///
/// # State machine
///
/// `Active -> Expired` on a lookup past `expires_at`, and `Active | Expired ->
/// Deleted` on [`remove`](Self::remove). No transition re-enters `Active`.
pub struct LinkRegistry<S: PersistenceStore + ?Sized> {
    store: Arc<S>,
    generator: Arc<CodeGenerator<S>>,
}

impl<S: PersistenceStore + ?Sized> LinkRegistry<S> {
    pub fn new(store: Arc<S>, generator: Arc<CodeGenerator<S>>) -> Self {
        Self { store, generator }
    }

    /// Creates a short link.
    ///
    /// The target address is validated before any state is touched. A custom
    /// code is validated and then atomically reserved; otherwise a fresh code
    /// is generated.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the address is not absolute http(s)
    /// - [`AppError::Validation`] if the custom code is malformed
    /// - [`AppError::CodeTaken`] if the custom code was ever used
    /// - [`AppError::CodeSpaceExhausted`] if generation ran out of attempts
    pub async fn create(&self, request: CreateLink) -> Result<ShortLink, AppError> {
        validate_target_url(&request.original_url)
            .map_err(|e| AppError::invalid_url(e.to_string()))?;

        let created_at = Utc::now();
        let expires_at = match request.expiration_days {
            Some(days) => Some(
                Duration::try_days(days)
                    .and_then(|d| created_at.checked_add_signed(d))
                    .ok_or_else(|| {
                        AppError::bad_request(
                            "Expiration is out of range",
                            json!({ "expiration_days": days }),
                        )
                    })?,
            ),
            None => None,
        };

        let (code, is_custom) = match request.custom_code {
            Some(custom) => {
                self.generator.validate_custom_code(&custom)?;
                self.generator.reserve(&custom).await?;
                (custom, true)
            }
            None => (self.generator.generate().await?, false),
        };

        let link = self
            .store
            .insert_link(NewShortLink {
                original_url: request.original_url,
                code,
                is_custom,
                owner: request.owner.filter(|o| !o.is_empty()),
                created_at,
                expires_at,
            })
            .await?;

        metrics::counter!("shortlink_links_created_total").increment(1);
        tracing::info!(
            id = link.id,
            code = %link.code,
            is_custom,
            expires_at = ?link.expires_at,
            "Short link created"
        );

        Ok(link)
    }

    /// Resolves a code to its link.
    ///
    /// An active link whose expiry has passed is deactivated by this call,
    /// which still reports [`AppError::NotFound`]. Unknown, deleted, inactive
    /// and expired codes are indistinguishable to the caller.
    pub async fn lookup(&self, code: &str) -> Result<ShortLink, AppError> {
        let Some(link) = self.store.find_by_code(code).await? else {
            tracing::debug!(code, "Lookup miss");
            return Err(AppError::link_unavailable(code));
        };

        let now = Utc::now();

        if link.is_active && link.is_expired_at(now) {
            if self.store.deactivate(link.id).await? {
                metrics::counter!("shortlink_links_expired_total").increment(1);
                tracing::info!(id = link.id, code, "Short link expired");
            }
            return Err(AppError::link_unavailable(code));
        }

        if !link.is_resolvable_at(now) {
            tracing::debug!(code, "Lookup hit inactive link");
            return Err(AppError::link_unavailable(code));
        }

        Ok(link)
    }

    /// Links visible in `scope`, newest first.
    pub async fn list(&self, scope: &Scope) -> Result<Vec<ShortLink>, AppError> {
        self.store.list_links(scope).await
    }

    /// Deletes a link and its click events. The code is never reissued.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is unknown or already removed.
    pub async fn remove(&self, id: i64) -> Result<(), AppError> {
        if !self.store.soft_delete(id).await? {
            return Err(AppError::not_found("Short link not found", json!({ "id": id })));
        }

        tracing::info!(id, "Short link deleted");
        Ok(())
    }

    /// Public address of a code under `base_url`.
    pub fn short_url(base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }
}
