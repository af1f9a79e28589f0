use std::time::Duration;

use axum::Router;
use http::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

pub mod client;
pub mod v0;

use crate::ServiceState;

/// Browsers may cache a preflight answer for this long.
const CORS_MAX_AGE: Duration = Duration::from_secs(600);

/// JSON calls and multipart uploads go in as POST, proxied downloads come
/// back out of `GET /v0/object/get`, whose type and size headers stay visible
/// to scripts.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([ACCEPT, CONTENT_TYPE, ORIGIN])
        .expose_headers([CONTENT_TYPE, CONTENT_LENGTH, CONTENT_DISPOSITION])
        .allow_origin(Any)
        .allow_credentials(false)
        .max_age(CORS_MAX_AGE)
}

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/v0", v0::router(state.clone()))
        .with_state(state)
        .layer(cors_layer())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use common::prelude::Storage;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_preflight_allows_post_from_any_origin() {
        let state = ServiceState::from_storage(Storage::memory());
        let response = router(state.clone())
            .with_state(state)
            .oneshot(
                Request::options("/v0/folder/ls")
                    .header(header::ORIGIN, "https://files.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .contains("POST"));
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "600");
    }
}
