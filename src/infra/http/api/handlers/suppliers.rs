//! Proveedores handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::Principal;
use crate::application::repos::ProveedorSearch;
use crate::domain::types::ServiceType;

use super::supplier_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_suppliers(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state.suppliers.list().await.map_err(supplier_to_api)?;
    Ok(Json(suppliers))
}

pub async fn get_supplier(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let proveedor = state.suppliers.get(id).await.map_err(supplier_to_api)?;
    Ok(Json(proveedor))
}

pub async fn create_supplier(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ProveedorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proveedor = state
        .suppliers
        .create(&principal, payload.into())
        .await
        .map_err(supplier_to_api)?;
    Ok((StatusCode::CREATED, Json(proveedor)))
}

pub async fn update_supplier(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProveedorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proveedor = state
        .suppliers
        .update(id, payload.into())
        .await
        .map_err(supplier_to_api)?;
    Ok(Json(proveedor))
}

pub async fn delete_supplier(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.suppliers.delete(id).await.map_err(supplier_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn search_suppliers(
    State(state): State<ApiState>,
    Query(query): Query<SupplierSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state
        .suppliers
        .search(ProveedorSearch {
            query: query.query.unwrap_or_default(),
            tipo_servicio: query.tipo_servicio,
            activo: query.activo,
        })
        .await
        .map_err(supplier_to_api)?;
    Ok(Json(suppliers))
}

pub async fn supplier_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.suppliers.stats().await.map_err(supplier_to_api)?;
    Ok(Json(stats))
}

pub async fn suppliers_by_service(
    State(state): State<ApiState>,
    Path(tipo): Path<ServiceType>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state
        .suppliers
        .by_service(tipo)
        .await
        .map_err(supplier_to_api)?;
    Ok(Json(suppliers))
}

pub async fn toggle_supplier(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let proveedor = state.suppliers.toggle(id).await.map_err(supplier_to_api)?;
    Ok(Json(proveedor))
}
