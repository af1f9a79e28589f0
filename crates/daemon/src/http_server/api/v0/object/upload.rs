use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use reqwest::{multipart, Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{ExplorerError, FolderPath, UserId};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Client side of an upload: the multipart form the handler expects.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub prefix: String,
    pub user: String,
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub key: String,
    pub size: usize,
    pub mime_type: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let mut prefix: Option<String> = None;
    let mut user: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Multipart parsing error: {}", e);
        UploadError::MultipartError(e.to_string())
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "prefix" => {
                prefix = Some(field.text().await.map_err(|e| {
                    UploadError::MultipartError(e.to_string())
                })?);
            }
            "user" => {
                user = Some(field.text().await.map_err(|e| {
                    UploadError::MultipartError(e.to_string())
                })?);
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| UploadError::InvalidRequest("file part needs a filename".into()))?;
                let data = field.bytes().await.map_err(|e| {
                    tracing::error!("Error reading file data for {}: {}", filename, e);
                    UploadError::MultipartError(e.to_string())
                })?;
                file = Some((filename, data));
            }
            _ => {
                tracing::warn!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let prefix = prefix.ok_or_else(|| UploadError::InvalidRequest("prefix is required".into()))?;
    let user = user.ok_or_else(|| UploadError::InvalidRequest("user is required".into()))?;
    let (filename, data) =
        file.ok_or_else(|| UploadError::InvalidRequest("a file part is required".into()))?;

    let prefix = FolderPath::normalize(&prefix).map_err(ExplorerError::from)?;
    let user = UserId::parse(&user).map_err(ExplorerError::from)?;

    let size = data.len();
    let mime_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();
    let key = state
        .explorer()
        .upload(&prefix, &filename, data, &user)
        .await?;

    Ok((
        http::StatusCode::OK,
        axum::Json(UploadResponse {
            key,
            size,
            mime_type,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Multipart error: {0}")]
    MultipartError(String),
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::InvalidRequest(msg) | UploadError::MultipartError(msg) => (
                http::StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({"msg": format!("Bad request: {}", msg)})),
            )
                .into_response(),
            UploadError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/object/upload")?;
        let form = multipart::Form::new()
            .text("prefix", self.prefix)
            .text("user", self.user)
            .part("file", multipart::Part::bytes(self.data).file_name(self.name));
        Ok(client.post(full_url).multipart(form))
    }
}
