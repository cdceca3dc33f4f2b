pub mod api;
pub(crate) mod middleware;

pub use api::{ApiState, build_api_router};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::infra::assets;

use self::middleware::{log_responses, set_request_context};

/// Full application router: JSON API, health probe and embedded static assets.
pub fn build_router(state: ApiState) -> Router {
    let health = Router::new()
        .route("/healthz", get(health_check))
        .with_state(state.clone());

    let static_assets = Router::new()
        .route("/sw.js", get(assets::service_worker))
        .route("/static/{*path}", get(assets::serve_static));

    build_api_router(state)
        .merge(health)
        .merge(static_assets)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health_check(State(state): State<ApiState>) -> Response {
    db_health_response(state.health.ping().await)
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
