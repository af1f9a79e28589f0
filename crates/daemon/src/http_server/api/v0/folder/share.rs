use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{
    ExplorerError, FailedTarget, FolderPath, ShareError, ShareReport, ShareTarget, UserId,
};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// One entry of a share request. `read == write == false` revokes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    pub user: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    pub folder: String,
    /// User performing the share; must own the folder
    pub user: String,
    pub targets: Vec<TargetEntry>,
}

/// Returned with 200 when every step ran, 207 when some targets failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareResponse {
    pub granted: Vec<UserId>,
    pub revoked: Vec<UserId>,
    #[serde(default)]
    pub failed: Vec<FailedTarget>,
}

impl ShareResponse {
    pub(crate) fn new(report: ShareReport, failed: Vec<FailedTarget>) -> Self {
        Self {
            granted: report.granted,
            revoked: report.revoked,
            failed,
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<ShareRequest>,
) -> Result<impl IntoResponse, ShareFolderError> {
    let folder = FolderPath::normalize(&req.folder).map_err(ExplorerError::from)?;
    let acting = UserId::parse(&req.user).map_err(ExplorerError::from)?;
    let targets = req
        .targets
        .iter()
        .map(|t| Ok(ShareTarget::new(UserId::parse(&t.user)?, t.read, t.write)))
        .collect::<Result<Vec<_>, common::prelude::PathError>>()
        .map_err(ExplorerError::from)?;

    match state.explorer().share(&folder, &acting, &targets).await {
        Ok(report) => Ok((
            http::StatusCode::OK,
            Json(ShareResponse::new(report, Vec::new())),
        )
            .into_response()),
        Err(ExplorerError::Share(ShareError::Partial { report, failed })) => {
            tracing::warn!(folder = %folder, failed = failed.len(), "share partially applied");
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
pub enum ShareFolderError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for ShareFolderError {
    fn into_response(self) -> Response {
        match self {
            ShareFolderError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

impl ApiRequest for ShareRequest {
    type Response = ShareResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/folder/share")?;
        Ok(client.post(full_url).json(&self))
    }
}
