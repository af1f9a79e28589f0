use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;

use crate::version::{build_info, BuildInfo};

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    #[serde(flatten)]
    build: BuildInfo,
}

#[tracing::instrument]
pub async fn handler() -> Response {
    let body = VersionResponse {
        service: "sharebox",
        build: build_info(),
    };
    (StatusCode::OK, Json(body)).into_response()
}
