//! Response helpers and the JSON error type shared by handlers.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::error::CollectionError;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Message returned for every 500; the detail only goes to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Error response body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

/// Serialize `body` as JSON with an explicit UTF-8 content type.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], bytes).into_response(),
        Err(e) => {
            error!(error = %e, "encode response failed");
            internal_error_response()
        }
    }
}

/// Plain 500 with the generic error body.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
        format!(r#"{{"error":"{INTERNAL_ERROR_MESSAGE}"}}"#),
    )
        .into_response()
}

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Logged, never shown to the client.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                json_response(StatusCode::BAD_REQUEST, &ErrorBody { error: &message })
            }
            ApiError::NotFound(message) => {
                json_response(StatusCode::NOT_FOUND, &ErrorBody { error: &message })
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "internal error handling request");
                internal_error_response()
            }
        }
    }
}

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::InvalidArgument(_) => ApiError::BadRequest(err.to_string()),
            CollectionError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CollectionError::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("invalid query string: {}", rejection.body_text()))
    }
}
