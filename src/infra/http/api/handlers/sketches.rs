//! Sketch (canvas layout) handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::Principal;

use super::sketch_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_sketches(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let sketches = state.sketches.list().await.map_err(sketch_to_api)?;
    Ok(Json(sketches))
}

pub async fn get_sketch(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let sketch = state.sketches.get(id).await.map_err(sketch_to_api)?;
    Ok(Json(sketch))
}

pub async fn sketches_for_event(
    State(state): State<ApiState>,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let sketches = state
        .sketches
        .for_event(event_id)
        .await
        .map_err(sketch_to_api)?;
    Ok(Json(sketches))
}

pub async fn unassigned_sketches(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let sketches = state.sketches.unassigned().await.map_err(sketch_to_api)?;
    Ok(Json(sketches))
}

pub async fn create_sketch(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<SketchCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sketch = state
        .sketches
        .create(&principal, payload.into())
        .await
        .map_err(sketch_to_api)?;
    Ok((StatusCode::CREATED, Json(sketch)))
}

pub async fn update_sketch(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(payload): Json<SketchUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sketch = state
        .sketches
        .update(id, payload.into())
        .await
        .map_err(sketch_to_api)?;
    Ok(Json(sketch))
}

pub async fn delete_sketch(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.sketches.delete(id).await.map_err(sketch_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn assign_sketch(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignSketchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sketch = state
        .sketches
        .assign(&principal, id, payload.event_id)
        .await
        .map_err(sketch_to_api)?;
    Ok(Json(sketch))
}
