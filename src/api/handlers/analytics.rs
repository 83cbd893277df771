//! Handlers for analytics views.
//!
//! Every figure is computed on request from stored links and click events.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::analytics::{HistoryQuery, MAX_HISTORY_DAYS, MAX_TOP_LINKS, TopLinksQuery};
use crate::api::dto::links::OwnerQuery;
use crate::application::services::{
    AnalyticsReport, Breakdown, DailyClicks, Dimension, Summary, TopLink,
};
use crate::domain::entities::Scope;
use crate::error::AppError;
use crate::state::AppState;

/// Full dashboard report.
///
/// `GET /api/analytics?owner=`
pub async fn report_handler(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<AnalyticsReport>, AppError> {
    let report = state
        .analytics_service
        .report(&Scope::from_owner(query.owner))
        .await?;

    Ok(Json(report))
}

/// `GET /api/analytics/summary?owner=`
pub async fn summary_handler(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Summary>, AppError> {
    let summary = state
        .analytics_service
        .summary(&Scope::from_owner(query.owner))
        .await?;

    Ok(Json(summary))
}

/// Top links by clicks with recent events.
///
/// `GET /api/analytics/top?n=10&recent=5&owner=`
pub async fn top_links_handler(
    State(state): State<AppState>,
    Query(query): Query<TopLinksQuery>,
) -> Result<Json<Vec<TopLink>>, AppError> {
    let defaults = state.analytics_service.settings();
    let n = query.n.unwrap_or(defaults.top_links);
    let recent = query.recent.unwrap_or(defaults.recent_clicks);

    if n > MAX_TOP_LINKS || recent > MAX_TOP_LINKS {
        return Err(AppError::bad_request(
            format!("n and recent must be at most {MAX_TOP_LINKS}"),
            json!({ "n": n, "recent": recent }),
        ));
    }

    let top = state
        .analytics_service
        .top_links(&Scope::from_owner(query.owner), n, recent)
        .await?;

    Ok(Json(top))
}

/// Zero-filled daily click counts, oldest first.
///
/// `GET /api/analytics/history?days=30&owner=`
pub async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DailyClicks>>, AppError> {
    let days = query
        .days
        .unwrap_or(state.analytics_service.settings().history_days);

    if days > MAX_HISTORY_DAYS {
        return Err(AppError::bad_request(
            format!("days must be at most {MAX_HISTORY_DAYS}"),
            json!({ "days": days }),
        ));
    }

    let history = state
        .analytics_service
        .click_history(&Scope::from_owner(query.owner), days)
        .await?;

    Ok(Json(history))
}

/// Click counts grouped by `source`, `country`, `device` or `hour`.
///
/// `GET /api/analytics/breakdown/{dimension}?owner=`
pub async fn breakdown_handler(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Breakdown>, AppError> {
    let dimension: Dimension = dimension.parse()?;

    let breakdown = state
        .analytics_service
        .breakdown(&Scope::from_owner(query.owner), dimension)
        .await?;

    Ok(Json(breakdown))
}
