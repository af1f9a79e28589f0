use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{ExplorerError, FolderPath, PathError, ShareError, UserId};

use super::share::ShareResponse;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RevokeRequest {
    /// Folder to revoke access to
    #[arg(long)]
    pub folder: String,

    /// User performing the revoke; must own the folder
    #[arg(long)]
    pub user: String,

    /// Users to revoke (repeatable)
    #[arg(long = "from", required = true)]
    pub users: Vec<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<RevokeRequest>,
) -> Result<impl IntoResponse, RevokeError> {
    let folder = FolderPath::normalize(&req.folder).map_err(ExplorerError::from)?;
    let acting = UserId::parse(&req.user).map_err(ExplorerError::from)?;
    let users = req
        .users
        .iter()
        .map(|u| UserId::parse(u))
        .collect::<Result<Vec<_>, PathError>>()
        .map_err(ExplorerError::from)?;

    match state.explorer().revoke(&folder, &acting, &users).await {
        Ok(report) => Ok((
            http::StatusCode::OK,
            Json(ShareResponse::new(report, Vec::new())),
        )
            .into_response()),
        Err(ExplorerError::Share(ShareError::Partial { report, failed })) => {
            tracing::warn!(folder = %folder, failed = failed.len(), "revoke partially applied");
            Ok((
                http::StatusCode::MULTI_STATUS,
                Json(ShareResponse::new(report, failed)),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RevokeError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for RevokeError {
    fn into_response(self) -> Response {
        match self {
            RevokeError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

impl ApiRequest for RevokeRequest {
    type Response = ShareResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/folder/revoke")?;
        Ok(client.post(full_url).json(&self))
    }
}
