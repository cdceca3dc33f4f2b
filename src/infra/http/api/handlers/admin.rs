//! User administration and global notification maintenance.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::auth::Principal;

use super::admin_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn is_admin(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Json<IsAdminResponse> {
    Json(IsAdminResponse {
        is_admin: state.admin.is_admin(&principal),
    })
}

pub async fn list_users(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.admin.users().await.map_err(admin_to_api)?;
    Ok(Json(users))
}

pub async fn update_user_role(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .admin
        .update_role(&principal, id, payload.role)
        .await
        .map_err(admin_to_api)?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .admin
        .delete_user(&principal, id)
        .await
        .map_err(admin_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn user_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.admin.user_stats().await.map_err(admin_to_api)?;
    Ok(Json(stats))
}

pub async fn list_all_notifications(
    State(state): State<ApiState>,
    Query(query): Query<AdminNotificationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = state
        .admin
        .notifications(query.limit, query.is_read)
        .await
        .map_err(admin_to_api)?;
    Ok(Json(notifications))
}

pub async fn notification_stats(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .admin
        .notification_stats()
        .await
        .map_err(admin_to_api)?;
    Ok(Json(stats))
}

pub async fn clean_old_notifications(
    State(state): State<ApiState>,
    Json(payload): Json<CleanNotificationsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .admin
        .clean_old_notifications(payload.days_old, payload.only_read)
        .await
        .map_err(admin_to_api)?;
    Ok(Json(outcome))
}

pub async fn delete_all_read_notifications(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.admin.delete_all_read().await.map_err(admin_to_api)?;
    Ok(Json(outcome))
}

pub async fn delete_any_notification(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .admin
        .delete_notification(id)
        .await
        .map_err(admin_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn mark_all_notifications_read(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.admin.mark_all_read().await.map_err(admin_to_api)?;
    Ok(Json(outcome))
}
