//! Clientes handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::Principal;
use crate::application::repos::ClienteSearch;

use super::client_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_clients(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let clients = state.clients.list().await.map_err(client_to_api)?;
    Ok(Json(clients))
}

pub async fn get_client(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.clients.get(id).await.map_err(client_to_api)?;
    Ok(Json(detail))
}

pub async fn create_client(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ClienteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cliente = state
        .clients
        .create(&principal, payload.into())
        .await
        .map_err(client_to_api)?;
    Ok((StatusCode::CREATED, Json(cliente)))
}

pub async fn update_client(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClienteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cliente = state
        .clients
        .update(id, payload.into())
        .await
        .map_err(client_to_api)?;
    Ok(Json(cliente))
}

pub async fn delete_client(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.clients.delete(id).await.map_err(client_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn search_clients(
    State(state): State<ApiState>,
    Query(query): Query<ClientSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = state
        .clients
        .search(ClienteSearch {
            query: query.query.unwrap_or_default(),
            tipo_cliente: query.tipo_cliente,
        })
        .await
        .map_err(client_to_api)?;
    Ok(Json(clients))
}

pub async fn client_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.clients.stats().await.map_err(client_to_api)?;
    Ok(Json(stats))
}

pub async fn most_active_clients(
    State(state): State<ApiState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = state
        .clients
        .most_active(query.limit)
        .await
        .map_err(client_to_api)?;
    Ok(Json(clients))
}
