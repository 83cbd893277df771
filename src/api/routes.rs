//! API route configuration.

use crate::api::handlers::{
    breakdown_handler, create_link_handler, delete_link_handler, history_handler,
    list_links_handler, report_handler, summary_handler, top_links_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get},
};

/// Link management and analytics routes, nested under `/api`.
///
/// # Endpoints
///
/// - `GET    /links`                          - List links (`?owner=`)
/// - `POST   /links`                          - Create a short link
/// - `DELETE /links/{id}`                     - Delete a link
/// - `GET    /analytics`                      - Full report (`?owner=`)
/// - `GET    /analytics/summary`              - Totals
/// - `GET    /analytics/top`                  - Top links (`?n=&recent=`)
/// - `GET    /analytics/history`              - Daily clicks (`?days=`)
/// - `GET    /analytics/breakdown/{dimension}` - Clicks by source, country, device or hour
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route("/links/{id}", delete(delete_link_handler))
        .route("/analytics", get(report_handler))
        .route("/analytics/summary", get(summary_handler))
        .route("/analytics/top", get(top_links_handler))
        .route("/analytics/history", get(history_handler))
        .route("/analytics/breakdown/{dimension}", get(breakdown_handler))
}
