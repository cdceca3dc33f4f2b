use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::application::auth::{AuthError, Principal};
use crate::domain::access::Capability;
use crate::infra::http::middleware::AuthenticatedUser;

use super::error::ApiError;
use super::state::ApiState;

/// Resolve the bearer session token into a `Principal` request extension.
pub async fn api_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers().get(header::AUTHORIZATION)) else {
        return ApiError::unauthorized("No autorizado").into_response();
    };

    let principal = match state.sessions.authenticate(&token).await {
        Ok(principal) => principal,
        Err(AuthError::Missing | AuthError::Invalid) => {
            return ApiError::unauthorized("No autorizado").into_response();
        }
        Err(AuthError::Expired) => {
            return ApiError::unauthorized("La sesión ha expirado").into_response();
        }
    };

    let user = AuthenticatedUser(principal.user_id);
    request.extensions_mut().insert(principal);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    response
}

/// Route guard: rejects principals whose role does not grant `capability`.
pub async fn require_capability(
    State(capability): State<Capability>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        warn!(
            target = "carpas::http::api::capability",
            capability = capability.as_str(),
            "missing principal in capability guard"
        );
        return ApiError::unauthorized("No autorizado").into_response();
    };

    if !principal.can(capability) {
        return ApiError::forbidden(capability.denial_message()).into_response();
    }

    next.run(request).await
}

fn extract_token(header: Option<&HeaderValue>) -> Option<String> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?.trim();
    if bearer.is_empty() {
        return None;
    }
    Some(bearer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        let value = HeaderValue::from_static("Bearer ses_abc_def");
        assert_eq!(extract_token(Some(&value)).as_deref(), Some("ses_abc_def"));

        let basic = HeaderValue::from_static("Basic Zm9vOmJhcg==");
        assert_eq!(extract_token(Some(&basic)), None);

        let empty = HeaderValue::from_static("Bearer   ");
        assert_eq!(extract_token(Some(&empty)), None);
        assert_eq!(extract_token(None), None);
    }
}
