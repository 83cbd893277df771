//! Handlers for link management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkListResponse, LinkResponse, OwnerQuery};
use crate::application::services::CreateLink;
use crate::domain::entities::Scope;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/landing",
///   "custom_code": "Promo-2026",
///   "expiration_days": 30,
///   "owner": "alice"
/// }
/// ```
///
/// # Errors
///
/// - 400 `invalid_url` / `validation_error`
/// - 409 `code_taken` if the custom code was ever used
/// - 503 `code_space_exhausted`
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_registry
        .create(CreateLink {
            original_url: payload.url,
            custom_code: payload.custom_code,
            expiration_days: payload.expiration_days,
            owner: payload.owner,
        })
        .await?;

    let short_url = state.short_url(&link.code);

    Ok((StatusCode::CREATED, Json(LinkResponse::new(link, short_url))))
}

/// Lists links visible to the optional `owner`, newest first.
///
/// # Endpoint
///
/// `GET /api/links?owner=alice`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state
        .link_registry
        .list(&Scope::from_owner(query.owner))
        .await?;

    let items: Vec<LinkResponse> = links
        .into_iter()
        .map(|link| {
            let short_url = state.short_url(&link.code);
            LinkResponse::new(link, short_url)
        })
        .collect();

    Ok(Json(LinkListResponse {
        total: items.len(),
        items,
    }))
}

/// Deletes a link. Its code is never handed out again.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// Returns 204 No Content, or 404 if the id is unknown or already deleted.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_registry.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
