//! Dashboard handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::response::IntoResponse;

use super::dashboard_to_api;
use crate::application::auth::Principal;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

pub async fn dashboard_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.dashboard.stats().await.map_err(dashboard_to_api)?;
    Ok(Json(stats))
}

pub async fn recent_activity(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = state
        .dashboard
        .recent_activity(principal.user_id)
        .await
        .map_err(dashboard_to_api)?;
    Ok(Json(activity))
}

pub async fn upcoming_events(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let events = state
        .dashboard
        .upcoming_events()
        .await
        .map_err(dashboard_to_api)?;
    Ok(Json(events))
}

pub async fn upcoming_visits(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let visits = state
        .dashboard
        .upcoming_visits()
        .await
        .map_err(dashboard_to_api)?;
    Ok(Json(visits))
}

pub async fn events_by_status_counts(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let counts = state
        .dashboard
        .events_by_status()
        .await
        .map_err(dashboard_to_api)?;
    Ok(Json(counts))
}

pub async fn monthly_revenue(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let revenue = state
        .dashboard
        .monthly_revenue()
        .await
        .map_err(dashboard_to_api)?;
    Ok(Json(revenue))
}
