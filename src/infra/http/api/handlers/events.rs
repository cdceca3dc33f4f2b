//! Events handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::Principal;
use crate::domain::types::EventStatus;

use super::event_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_events(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let events = state.events.list().await.map_err(event_to_api)?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.events.get(id).await.map_err(event_to_api)?;
    Ok(Json(event))
}

pub async fn events_by_status(
    State(state): State<ApiState>,
    Path(estado): Path<EventStatus>,
) -> Result<impl IntoResponse, ApiError> {
    let events = state.events.by_status(estado).await.map_err(event_to_api)?;
    Ok(Json(events))
}

pub async fn completed_visits(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let visits = state
        .events
        .completed_visits()
        .await
        .map_err(event_to_api)?;
    Ok(Json(visits))
}

pub async fn create_event(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<EventCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .events
        .create(&principal, payload.into())
        .await
        .map_err(event_to_api)?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<EventUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .events
        .update(&principal, id, payload.into())
        .await
        .map_err(event_to_api)?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.events.delete(id).await.map_err(event_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}
