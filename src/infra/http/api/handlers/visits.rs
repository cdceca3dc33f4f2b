//! Technical visit handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::Principal;
use crate::domain::types::VisitStatus;

use super::visit_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_visits(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let visits = state.visits.list().await.map_err(visit_to_api)?;
    Ok(Json(visits))
}

pub async fn get_visit(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = state.visits.get(id).await.map_err(visit_to_api)?;
    Ok(Json(visit))
}

pub async fn visits_by_status(
    State(state): State<ApiState>,
    Path(estado): Path<VisitStatus>,
) -> Result<impl IntoResponse, ApiError> {
    let visits = state.visits.by_status(estado).await.map_err(visit_to_api)?;
    Ok(Json(visits))
}

pub async fn assignable_users(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .visits
        .assignable_users()
        .await
        .map_err(visit_to_api)?;
    Ok(Json(users))
}

pub async fn create_visit(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<VisitCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = state
        .visits
        .create(&principal, payload.into())
        .await
        .map_err(visit_to_api)?;
    Ok((StatusCode::CREATED, Json(visit)))
}

pub async fn update_visit(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<VisitUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = state
        .visits
        .update(&principal, id, payload.into())
        .await
        .map_err(visit_to_api)?;
    Ok(Json(visit))
}

pub async fn delete_visit(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.visits.delete(id).await.map_err(visit_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}
