use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{BadgeParams, BadgeQuery};
use crate::services::{BadgeService, ProfileService};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Badges may be cached by clients and proxies for seven days.
pub const BADGE_CACHE_CONTROL: &str = "max-age=604800";
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Client for the LAPRAS profile endpoint.
    pub profile_service: ProfileService,
    /// Client for the badge renderer.
    pub badge_service: BadgeService,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            profile_service: ProfileService::new(config)?,
            badge_service: BadgeService::new(config)?,
        })
    }
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lapras-badge",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /badge?userId=<id>&scoreType=<e|b|i>
///
/// Validates the query, fetches the user's profile, picks the requested score
/// and relays the rendered SVG badge with a seven-day cache directive. Any
/// failure along the way answers 400 with `{"message": ...}`.
pub async fn badge(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BadgeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::info!("GET /badge - params: {:?}", query);

    let selection = query.validate()?;

    let profile = state
        .profile_service
        .fetch_profile(&selection.user_id)
        .await
        .with_context(|| format!("Fetching profile for {}", selection.user_id))?;

    let params = BadgeParams::new(selection.score_type, &profile)
        .with_context(|| {
            format!(
                "Selecting {} score for {}",
                selection.score_type, selection.user_id
            )
        })?;
    tracing::debug!(
        "Selected {} score {} for {} (color {})",
        selection.score_type,
        params.score,
        selection.user_id,
        params.color
    );

    let svg = state
        .badge_service
        .fetch_badge(params.label, params.score, params.color)
        .await
        .context("Rendering badge")?;

    tracing::info!(
        "Served {} badge for {} ({} bytes)",
        selection.score_type,
        selection.user_id,
        svg.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, SVG_CONTENT_TYPE),
            (header::CACHE_CONTROL, BADGE_CACHE_CONTROL),
        ],
        svg,
    ))
}
