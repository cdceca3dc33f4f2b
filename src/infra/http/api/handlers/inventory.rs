//! Inventory handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::inventory_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_items(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.inventory.list().await.map_err(inventory_to_api)?;
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.inventory.get(id).await.map_err(inventory_to_api)?;
    Ok(Json(detail))
}

pub async fn item_types(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let types = state.inventory.types().await.map_err(inventory_to_api)?;
    Ok(Json(types))
}

pub async fn create_item(
    State(state): State<ApiState>,
    Json(payload): Json<ItemCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .inventory
        .create(payload.into())
        .await
        .map_err(inventory_to_api)?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(payload): Json<ItemUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .inventory
        .update(id, payload.into())
        .await
        .map_err(inventory_to_api)?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.inventory.delete(id).await.map_err(inventory_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn adjust_stock(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let adjusted = state
        .inventory
        .adjust_stock(id, payload.into())
        .await
        .map_err(inventory_to_api)?;
    Ok(Json(adjusted))
}
