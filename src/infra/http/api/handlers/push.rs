//! Browser push subscription handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::Principal;

use super::push_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn subscribe(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state
        .push
        .subscribe(principal.user_id, payload.into())
        .await
        .map_err(push_to_api)?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn unsubscribe(
    State(state): State<ApiState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .push
        .unsubscribe(&payload.endpoint)
        .await
        .map_err(push_to_api)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn current_subscription(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state
        .push
        .current(principal.user_id)
        .await
        .map_err(push_to_api)?;
    Ok(Json(subscription))
}

pub async fn has_subscription(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let has_subscription = state
        .push
        .has_subscription(principal.user_id)
        .await
        .map_err(push_to_api)?;
    Ok(Json(HasSubscriptionResponse { has_subscription }))
}

pub async fn public_key(State(state): State<ApiState>) -> Json<PublicKeyResponse> {
    let public_key = state.push.public_key().map(str::to_string);
    Json(PublicKeyResponse {
        enabled: public_key.is_some(),
        public_key,
    })
}
