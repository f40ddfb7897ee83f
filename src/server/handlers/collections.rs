//! Collection endpoint handlers.

use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{TimeDelta, Utc};
use tracing::warn;

use super::super::AppState;
use super::helpers::{json_response, ApiError};
use super::types::{CreateRequest, OriginQuery, TimeRangeRequest};

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Extract URLs from the posted text and store them.
pub async fn create_collections(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    if request.url.is_empty() {
        return Err(ApiError::BadRequest("url is required".to_string()));
    }

    match state.service.create_from_text(&request.url).await {
        Ok(collections) => Ok(json_response(StatusCode::OK, &collections)),
        Err(err) => {
            if !err.persisted.is_empty() {
                warn!(
                    persisted = err.persisted.len(),
                    error = %err.source,
                    "create stopped part-way"
                );
            }
            Err(err.source.into())
        }
    }
}

/// `{label: [...]}` for one origin, or every origin when none is given.
pub async fn get_by_origin(
    State(state): State<AppState>,
    query: Result<Query<OriginQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let origin = query
        .origin
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty());

    let grouped = match origin {
        Some(origin) => {
            let collections = state.service.get_by_origin(origin).await?;
            BTreeMap::from([(origin.to_string(), collections)])
        }
        None => state.service.get_all_grouped_by_origin().await?,
    };

    Ok(json_response(StatusCode::OK, &grouped))
}

/// Collections created in a time window, oldest first.
pub async fn get_by_time_range(
    State(state): State<AppState>,
    payload: Result<Json<TimeRangeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let now = Utc::now();
    let end = request.end.unwrap_or(now);
    let start = request.start.unwrap_or(now - TimeDelta::hours(24));

    let collections = state
        .service
        .get_by_time_range(start, end, request.origin.as_deref())
        .await?;

    Ok(json_response(StatusCode::OK, &collections))
}

/// The catalog's advisory list of supported sources.
pub async fn list_origins(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, state.service.extractor().catalog().supported())
}
