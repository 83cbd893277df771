//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::click_context::click_context_from_headers;

/// Redirects a short code to its original URL and records the click.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Derive the click context (referrer host, country, device) from headers
/// 2. Resolve the code, applying lazy expiry
/// 3. Increment the counter and append the event atomically
/// 4. Return 302 Found
///
/// Lookup is exact and case-sensitive.
///
/// # Errors
///
/// Returns 404 Not Found with a single "not found or expired" message for
/// unknown, expired and deleted codes alike.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let context = click_context_from_headers(&headers);

    let link = state.click_recorder.record(&code, context).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, link.original_url)]))
}
