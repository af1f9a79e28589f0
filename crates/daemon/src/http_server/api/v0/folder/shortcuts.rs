use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{ExplorerError, Shortcuts, UserId};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ShortcutsRequest {
    /// User whose shared folders to list
    #[arg(long)]
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutsResponse {
    pub shortcuts: Shortcuts,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<ShortcutsRequest>,
) -> Result<impl IntoResponse, ShortcutsError> {
    let user = UserId::parse(&req.user).map_err(ExplorerError::from)?;
    let shortcuts = state.explorer().shortcuts(&user).await?;
    Ok((http::StatusCode::OK, Json(ShortcutsResponse { shortcuts })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ShortcutsError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for ShortcutsError {
    fn into_response(self) -> Response {
        match self {
            ShortcutsError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

impl ApiRequest for ShortcutsRequest {
    type Response = ShortcutsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/folder/shortcuts")?;
        Ok(client.post(full_url).json(&self))
    }
}
