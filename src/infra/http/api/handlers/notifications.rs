//! Per-user notification inbox.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::Principal;
use crate::application::notifications::CreateNotificationCommand;

use super::notification_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_notifications(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = state
        .notifications
        .list(principal.user_id)
        .await
        .map_err(notification_to_api)?;
    Ok(Json(notifications))
}

pub async fn unread_notifications(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = state
        .notifications
        .unread(principal.user_id)
        .await
        .map_err(notification_to_api)?;
    Ok(Json(notifications))
}

pub async fn unread_count(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .notifications
        .unread_count(principal.user_id)
        .await
        .map_err(notification_to_api)?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn create_notification(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NotificationCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state
        .notifications
        .create(
            &principal,
            CreateNotificationCommand {
                title: payload.title,
                message: payload.message,
                user_id: payload.user_id,
            },
        )
        .await
        .map_err(notification_to_api)?;
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn mark_notification_read(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state
        .notifications
        .mark_as_read(principal.user_id, id)
        .await
        .map_err(notification_to_api)?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .notifications
        .mark_all_as_read(principal.user_id)
        .await
        .map_err(notification_to_api)?;
    Ok(Json(CountResponse { count }))
}

pub async fn delete_notification(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .notifications
        .delete(principal.user_id, id)
        .await
        .map_err(notification_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn delete_read_notifications(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .notifications
        .delete_all_read(principal.user_id)
        .await
        .map_err(notification_to_api)?;
    Ok(Json(CountResponse { count }))
}
