use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{ExplorerError, FolderListing, FolderPath, UserId};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct LsRequest {
    /// Folder to list (e.g. alice/docs)
    #[arg(long)]
    pub folder: String,

    /// User performing the request
    #[arg(long)]
    pub user: String,
}

pub type LsResponse = FolderListing;

#[axum::debug_handler]
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<LsRequest>,
) -> Result<impl IntoResponse, LsError> {
    let folder = FolderPath::normalize(&req.folder).map_err(ExplorerError::from)?;
    let user = UserId::parse(&req.user).map_err(ExplorerError::from)?;

    let listing = state.explorer().list(&folder, &user).await?;
    Ok((http::StatusCode::OK, Json(listing)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for LsError {
    fn into_response(self) -> Response {
        match self {
            LsError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for LsRequest {
    type Response = LsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/folder/ls")?;
        Ok(client.post(full_url).json(&self))
    }
}
