//! Registration, login and logout.

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::{LoginCommand, Principal, RegisterCommand};

use super::{login_to_api, register_to_api, repo_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .sessions
        .register(RegisterCommand {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
        .await
        .map_err(register_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuario creado exitosamente",
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let issued = state
        .sessions
        .login(LoginCommand {
            email: payload.email,
            password: payload.password,
        })
        .await
        .map_err(login_to_api)?;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: issued.user,
    }))
}

pub async fn logout(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.logout(&principal).await.map_err(repo_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
