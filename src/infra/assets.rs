//! Embedded static asset serving, including the push service worker.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, File, include_dir};
use mime_guess::Mime;

use crate::application::error::ErrorReport;

static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

const SERVICE_WORKER: &str = "sw.js";

/// Serve embedded static assets under `/static/{*path}`.
pub async fn serve_static(path: Option<Path<String>>) -> Response {
    let captured = path.map(|Path(value)| value);
    match resolve_asset(captured) {
        Some(file) => asset_response(file, CachePolicy::Immutable),
        None => not_found_response("infra::assets::serve_static"),
    }
}

/// Serve the service worker from the site root so its scope covers the whole app.
pub async fn service_worker() -> Response {
    match STATIC_ASSETS.get_file(SERVICE_WORKER) {
        Some(file) => asset_response(file, CachePolicy::Revalidate),
        None => not_found_response("infra::assets::service_worker"),
    }
}

fn not_found_response(source: &'static str) -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    ErrorReport::from_message(source, StatusCode::NOT_FOUND, "Static asset not found")
        .attach(&mut response);
    response
}

fn resolve_asset(path: Option<String>) -> Option<&'static File<'static>> {
    let candidate = path.unwrap_or_default();
    let candidate = candidate.trim_start_matches('/');

    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return None;
    }

    STATIC_ASSETS.get_file(candidate)
}

#[derive(Debug, Clone, Copy)]
enum CachePolicy {
    Immutable,
    Revalidate,
}

impl CachePolicy {
    fn header(self) -> HeaderValue {
        match self {
            CachePolicy::Immutable => HeaderValue::from_static("public, max-age=31536000, immutable"),
            CachePolicy::Revalidate => HeaderValue::from_static("no-cache"),
        }
    }
}

fn asset_response(file: &'static File<'static>, policy: CachePolicy) -> Response {
    let mime = mime_guess::from_path(file.path()).first_or_octet_stream();
    build_response(Bytes::from_static(file.contents()), mime, policy)
}

fn build_response(bytes: Bytes, mime: Mime, policy: CachePolicy) -> Response {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    headers.insert(header::CACHE_CONTROL, policy.header());

    response
}
