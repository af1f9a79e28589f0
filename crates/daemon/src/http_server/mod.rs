use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
mod config;
mod handlers;
mod health;

pub use config::{Config, ConfigError};

use crate::ServiceState;

const API_PREFIX: &str = "/api";
const STATUS_PREFIX: &str = "/_status";

/// Maximum upload size in bytes (500 MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 500 * 1024 * 1024;

/// Build the API router: /_status + /api routes and the 404 fallback.
pub fn router(config: Config, state: ServiceState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(API_PREFIX, api::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .layer(Extension(config))
        .with_state(state)
        .layer(trace_layer)
}

/// Run the API HTTP server until `shutdown_rx` fires.
pub async fn run_api(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(config, state);

    tracing::info!(addr = ?listen_addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use common::prelude::Storage;
    use serde_json::json;

    use super::*;

    fn test_config() -> Config {
        Config::new(
            "127.0.0.1:5555".parse().unwrap(),
            None,
            tracing::Level::INFO,
        )
        .unwrap()
    }

    fn test_router() -> Router {
        router(test_config(), ServiceState::from_storage(Storage::memory()))
    }

    async fn post_json(
        router: &Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_livez() {
        let response = test_router()
            .oneshot(Request::get("/_status/livez").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fallback_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::get("/nope")
                    .header(header::ACCEPT, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_share_flow_status_codes() {
        let router = test_router();

        for user in ["alice", "bob"] {
            let (status, _) = post_json(&router, "/api/v0/user/provision", json!({"user": user})).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = post_json(
            &router,
            "/api/v0/folder/create",
            json!({"parent": "alice", "name": "docs", "user": "alice"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["folder"], "alice/docs");

        let (status, _) = post_json(
            &router,
            "/api/v0/folder/create",
            json!({"parent": "alice", "name": "docs", "user": "alice"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = post_json(
            &router,
            "/api/v0/folder/ls",
            json!({"folder": "alice/docs", "user": "bob"}),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = post_json(
            &router,
            "/api/v0/folder/share",
            json!({"folder": "alice/docs", "user": "bob", "targets": [{"user": "bob", "read": true}]}),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = post_json(
            &router,
            "/api/v0/folder/share",
            json!({"folder": "alice/docs/", "user": "alice", "targets": [{"user": "bob", "read": true}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["granted"], json!(["bob"]));

        let (status, body) = post_json(
            &router,
            "/api/v0/folder/shortcuts",
            json!({"user": "bob"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shortcuts"]["alice/docs"]["owner"], "alice");

        let (status, _) = post_json(
            &router,
            "/api/v0/folder/ls",
            json!({"folder": "alice/docs", "user": "bob"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post_json(
            &router,
            "/api/v0/folder/ls",
            json!({"folder": "alice/../bob", "user": "bob"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_partial_share_is_multi_status() {
        let storage = Storage::memory();
        let router = router(test_config(), ServiceState::from_storage(storage.clone()));

        post_json(&router, "/api/v0/user/provision", json!({"user": "alice"})).await;
        storage
            .put("carol/Shared Folders/.shortcuts", "{broken".into())
            .await
            .unwrap();

        let (status, body) = post_json(
            &router,
            "/api/v0/folder/share",
            json!({"folder": "alice", "user": "alice", "targets": [
                {"user": "bob", "read": true},
                {"user": "carol", "read": true}
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::MULTI_STATUS);
        assert_eq!(body["granted"], json!(["bob"]));
        assert_eq!(body["failed"][0]["user"], "carol");
    }

    fn multipart_upload(prefix: &str, user: &str, filename: &str, data: &str) -> Request<Body> {
        let boundary = "sharebox-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"prefix\"\r\n\r\n{prefix}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"user\"\r\n\r\n{user}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{data}\r\n\
             --{b}--\r\n",
            b = boundary,
        );
        Request::post("/api/v0/object/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_multipart() {
        let storage = Storage::memory();
        let router = router(test_config(), ServiceState::from_storage(storage.clone()));
        for user in ["alice", "bob"] {
            post_json(&router, "/api/v0/user/provision", json!({"user": user})).await;
        }

        let response = router
            .clone()
            .oneshot(multipart_upload("alice/", "alice", "notes.txt", "# hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["key"], "alice/notes.txt");
        assert_eq!(body["size"], 4);
        assert_eq!(body["mime_type"], "text/plain");
        assert_eq!(
            storage.get("alice/notes.txt").await.unwrap().unwrap().as_ref(),
            b"# hi"
        );

        let response = router
            .clone()
            .oneshot(multipart_upload("alice", "bob", "evil.txt", "x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = router
            .oneshot(multipart_upload("alice", "alice", ".permissions", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_url_falls_back_to_proxy() {
        let storage = Storage::memory();
        let router = router(test_config(), ServiceState::from_storage(storage.clone()));

        post_json(&router, "/api/v0/user/provision", json!({"user": "alice"})).await;
        storage.put("alice/a.txt", "hello".into()).await.unwrap();

        let (status, body) = post_json(
            &router,
            "/api/v0/object/url",
            json!({"key": "alice/a.txt", "user": "alice"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let url = url::Url::parse(body["url"].as_str().unwrap()).unwrap();
        assert_eq!(url.path(), "/api/v0/object/get");
        assert!(body["expires_in_secs"].is_null());

        let query = url.query().unwrap();
        let response = router
            .clone()
            .oneshot(
                Request::get(format!("/api/v0/object/get?{}", query))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"hello");

        let response = router
            .oneshot(
                Request::get("/api/v0/object/get?key=alice%2Fa.txt&user=bob")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
