use axum::extract::{Extension, Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::explorer::DOWNLOAD_URL_TTL;
use common::prelude::{Download, ExplorerError, UserId};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::Config;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct UrlRequest {
    /// Object key to download
    #[arg(long)]
    pub key: String,

    /// User requesting the download
    #[arg(long)]
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlResponse {
    pub url: Url,
    /// Lifetime of a presigned URL. `None` for links proxied through the
    /// daemon, which check access on every request instead.
    pub expires_in_secs: Option<u64>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(config): Extension<Config>,
    Json(req): Json<UrlRequest>,
) -> Result<impl IntoResponse, UrlError> {
    let user = UserId::parse(&req.user).map_err(ExplorerError::from)?;

    let response = match state.explorer().download(&req.key, &user).await? {
        Download::Signed(url) => UrlResponse {
            url,
            expires_in_secs: Some(DOWNLOAD_URL_TTL.as_secs()),
        },
        Download::Proxied(key) => {
            let mut url = config.public_url.join("/api/v0/object/get")?;
            url.query_pairs_mut()
                .append_pair("key", &key)
                .append_pair("user", user.as_str());
            UrlResponse {
                url,
                expires_in_secs: None,
            }
        }
    };

    Ok((http::StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
    #[error("invalid public URL: {0}")]
    PublicUrl(#[from] url::ParseError),
}

impl IntoResponse for UrlError {
    fn into_response(self) -> Response {
        match self {
            UrlError::Explorer(e) => super::super::explorer_error_response(e),
            UrlError::PublicUrl(e) => {
                tracing::error!(error = %e, "failed to build proxied download URL");
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(serde_json::json!({"msg": "internal server error"})),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for UrlRequest {
    type Response = UrlResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/object/url")?;
        Ok(client.post(full_url).json(&self))
    }
}
