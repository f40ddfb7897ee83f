//! Request logging, JSON error bodies, panic recovery and CORS.

use std::any::Any;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, Request},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::handlers::{internal_error_response, ErrorBody, JSON_CONTENT_TYPE};
use crate::logging::APP_NAME;

pub static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Assign or propagate `X-Request-ID`, run the request inside a `request`
/// span and log its outcome.
///
/// The completion line is logged at ERROR for 5xx, WARN for 4xx and INFO
/// otherwise.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let started = Instant::now();

    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    let span = info_span!(
        "request",
        app = APP_NAME,
        request_id = %request_id,
        http.method = %request.method(),
        http.path = %request.uri().path(),
        remote_addr = %remote_addr,
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }

    let status = response.status().as_u16();
    let bytes = response
        .body()
        .size_hint()
        .exact()
        .or_else(|| {
            response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or(0);
    let duration_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| {
        if status >= 500 {
            error!(status, bytes, duration_ms, "request");
        } else if status >= 400 {
            warn!(status, bytes, duration_ms, "request");
        } else {
            info!(status, bytes, duration_ms, "request");
        }
    });

    response
}

/// Give bodiless error responses from the router and timeout layer
/// (404, 405, 408) the same `{"error": ...}` JSON body handlers produce.
pub async fn json_error_body(mut response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error())
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let message = status
        .canonical_reason()
        .unwrap_or("error")
        .to_ascii_lowercase();
    let body = match serde_json::to_vec(&ErrorBody { error: &message }) {
        Ok(body) => body,
        Err(_) => return response,
    };

    let headers = response.headers_mut();
    headers.remove(header::CONTENT_LENGTH);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    *response.body_mut() = Body::from(body);
    response
}

/// Response for a handler panic: generic JSON 500, payload logged.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "panic recovered");
    internal_error_response()
}

/// Browser-friendly CORS: any origin, with credentials.
///
/// A literal `*` cannot be combined with credentials, so the request's
/// origin is echoed back instead.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}
