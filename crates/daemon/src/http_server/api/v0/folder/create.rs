use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{ExplorerError, FolderPath, UserId};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateRequest {
    /// Folder to create the new folder in
    #[arg(long)]
    pub parent: String,

    /// Name of the new folder
    #[arg(long)]
    pub name: String,

    /// User creating the folder; becomes its owner
    #[arg(long)]
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub folder: FolderPath,
    pub owner: UserId,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, CreateError> {
    let parent = FolderPath::normalize(&req.parent).map_err(ExplorerError::from)?;
    let user = UserId::parse(&req.user).map_err(ExplorerError::from)?;

    let folder = state
        .explorer()
        .create_folder(&parent, &req.name, &user)
        .await?;
    tracing::info!(folder = %folder, owner = %user, "created folder");

    Ok((
        http::StatusCode::CREATED,
        Json(CreateResponse {
            folder,
            owner: user,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/folder/create")?;
        Ok(client.post(full_url).json(&self))
    }
}
