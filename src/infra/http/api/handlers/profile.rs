//! Profile of the authenticated user.

use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;
use serde_json::Value as JsonValue;

use crate::application::auth::Principal;
use crate::application::profile::{PreferenceCatalog, preference_catalog};

use super::profile_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn current_profile(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .profile
        .current(principal.user_id)
        .await
        .map_err(profile_to_api)?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .profile
        .update(principal.user_id, payload.into())
        .await
        .map_err(profile_to_api)?;
    Ok(Json(user))
}

pub async fn update_avatar(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AvatarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .profile
        .update_avatar(principal.user_id, payload.avatar_url)
        .await
        .map_err(profile_to_api)?;
    Ok(Json(user))
}

pub async fn profile_stats(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .profile
        .stats(principal.user_id)
        .await
        .map_err(profile_to_api)?;
    Ok(Json(stats))
}

pub async fn profile_activity(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = state
        .profile
        .recent_activity(principal.user_id, query.limit)
        .await
        .map_err(profile_to_api)?;
    Ok(Json(activity))
}

pub async fn preference_options() -> Json<PreferenceCatalog> {
    Json(preference_catalog())
}

pub async fn update_preferences(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(preferences): Json<JsonValue>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .profile
        .update_preferences(principal.user_id, preferences)
        .await
        .map_err(profile_to_api)?;
    Ok(Json(user))
}
