//! HTTP facade over the collection service.
//!
//! Routes:
//! - `POST /create` extracts supported URLs from `{"url": "<text>"}` and stores them
//! - `GET /getbyorigin?origin=<label>` returns `{label: [...]}`, or every origin
//! - `POST /getbytimerange` returns collections created in a window (default: last 24h)
//! - `GET /origins` lists supported sources, `GET /health` is a liveness probe

mod handlers;
mod middleware;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::services::CollectionService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: CollectionService,
}

impl AppState {
    pub fn new(service: CollectionService) -> Self {
        Self { service }
    }
}

/// Bind `addr` and serve until SIGINT/SIGTERM.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve_on(state, listener).await
}

/// Serve on an already bound listener until SIGINT/SIGTERM.
pub async fn serve_on(state: AppState, listener: TcpListener) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = listener.local_addr()?;
    tracing::info!("Starting server at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use std::sync::Arc;
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::origins::{OriginCatalog, UrlExtractor};
    use crate::repository::{DbContext, QueryLog};

    async fn setup_test_app() -> (axum::Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"), QueryLog::silent());
        ctx.init_schema().await.unwrap();

        let catalog = OriginCatalog::from_json_str(
            r#"{
                "support": ["Bilibili", "YouTube"],
                "items": [
                    {"host": "bilibili.com", "origin": "Bilibili"},
                    {"host": "youtube.com", "origin": "YouTube"}
                ]
            }"#,
            "test",
        )
        .unwrap();
        let extractor = Arc::new(UrlExtractor::new(Arc::new(catalog)));
        let service = CollectionService::new(Arc::new(ctx.collections()), extractor);

        (create_router(AppState::new(service)), dir)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = setup_test_app().await;
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_returns_collections() {
        let (app, _dir) = setup_test_app().await;

        let response = app
            .oneshot(post_json(
                "/create",
                r#"{"url": "看看 https://m.bilibili.com/video/1 和 youtube.com/watch?v=2"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        assert!(response.headers().contains_key("x-request-id"));

        let json = body_json(response).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["url"], "https://m.bilibili.com/video/1");
        assert_eq!(items[0]["origin"], "Bilibili");
        assert_eq!(items[1]["url"], "youtube.com/watch?v=2");
        assert_eq!(items[1]["origin"], "YouTube");
        assert!(items[0]["id"].is_string());
        assert!(items[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (app, _dir) = setup_test_app().await;

        let cases = [
            (r#"{"url": ""}"#, "url is required"),
            ("{}", "url is required"),
            (r#"{"url": "   "}"#, "invalid argument: url cannot be empty"),
            (
                r#"{"url": "no links here"}"#,
                "invalid argument: no valid URL found in input text",
            ),
            (
                r#"{"url": "https://example.com/x"}"#,
                "invalid argument: no *supported* origin found in input text",
            ),
        ];

        for (body, message) in cases {
            let response = app.clone().oneshot(post_json("/create", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
            let json = body_json(response).await;
            assert_eq!(json["error"], message);
        }
    }

    #[tokio::test]
    async fn test_create_malformed_json() {
        let (app, _dir) = setup_test_app().await;
        let response = app.oneshot(post_json("/create", "{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid JSON body:"));
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let (app, _dir) = setup_test_app().await;
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_get_by_origin() {
        let (app, _dir) = setup_test_app().await;
        app.clone()
            .oneshot(post_json(
                "/create",
                r#"{"url": "https://bilibili.com/a https://youtube.com/b https://bilibili.com/c"}"#,
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get("/getbyorigin?origin=Bilibili"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        let urls: Vec<_> = json["Bilibili"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["url"].as_str().unwrap())
            .collect();
        assert_eq!(urls, vec!["https://bilibili.com/a", "https://bilibili.com/c"]);

        let response = app.clone().oneshot(get("/getbyorigin")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["Bilibili"].as_array().unwrap().len(), 2);
        assert_eq!(json["YouTube"].as_array().unwrap().len(), 1);

        let response = app.oneshot(get("/getbyorigin?origin=Gmail")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"Gmail": []}));
    }

    #[tokio::test]
    async fn test_get_by_time_range() {
        let (app, _dir) = setup_test_app().await;
        app.clone()
            .oneshot(post_json(
                "/create",
                r#"{"url": "https://bilibili.com/a https://youtube.com/b"}"#,
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post_json("/getbytimerange", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

        let response = app
            .clone()
            .oneshot(post_json("/getbytimerange", r#"{"origin": "YouTube"}"#))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["url"], "https://youtube.com/b");

        let response = app
            .oneshot(post_json(
                "/getbytimerange",
                r#"{"start": "2024-01-01T00:00:00Z", "end": "2024-03-01T00:00:00Z"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(
            json["error"],
            "invalid argument: time range can't be longer than 15 days"
        );
    }

    #[tokio::test]
    async fn test_list_origins() {
        let (app, _dir) = setup_test_app().await;
        let response = app.oneshot(get("/origins")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!(["Bilibili", "YouTube"])
        );
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let (app, _dir) = setup_test_app().await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/create")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "3600");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _dir) = setup_test_app().await;
        let response = app.oneshot(get("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        assert_eq!(body_json(response).await["error"], "not found");
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let (app, _dir) = setup_test_app().await;
        let response = app.oneshot(get("/create")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key(header::ALLOW));
        assert_eq!(body_json(response).await["error"], "method not allowed");
    }
}
