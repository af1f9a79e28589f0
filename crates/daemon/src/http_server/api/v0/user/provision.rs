use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{ExplorerError, FolderPath, Provisioned, UserId};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ProvisionRequest {
    /// User to set up a root folder and `Shared Folders` for
    #[arg(long)]
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionResponse {
    pub root: FolderPath,
    pub shared_folders: FolderPath,
    #[serde(flatten)]
    pub provisioned: Provisioned,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<ProvisionRequest>,
) -> Result<impl IntoResponse, ProvisionError> {
    let user = UserId::parse(&req.user).map_err(ExplorerError::from)?;
    let provisioned = state.explorer().provision_user(&user).await?;
    tracing::info!(
        user = %user,
        root_created = provisioned.root_created,
        shared_folders_created = provisioned.shared_folders_created,
        "provisioned user"
    );

    Ok((
        http::StatusCode::OK,
        Json(ProvisionResponse {
            root: FolderPath::user_root(&user),
            shared_folders: FolderPath::shared_folders(&user),
            provisioned,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for ProvisionError {
    fn into_response(self) -> Response {
        match self {
            ProvisionError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

impl ApiRequest for ProvisionRequest {
    type Response = ProvisionResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/user/provision")?;
        Ok(client.post(full_url).json(&self))
    }
}
