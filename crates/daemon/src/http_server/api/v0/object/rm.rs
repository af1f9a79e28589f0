use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{ExplorerError, UserId};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RmRequest {
    /// Object key to delete; a trailing `/` deletes the whole folder
    #[arg(long)]
    pub key: String,

    /// User performing the delete
    #[arg(long)]
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmResponse {
    pub deleted: Vec<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<RmRequest>,
) -> Result<impl IntoResponse, RmError> {
    let user = UserId::parse(&req.user).map_err(ExplorerError::from)?;
    let deleted = state.explorer().delete(&req.key, &user).await?;
    Ok((http::StatusCode::OK, Json(RmResponse { deleted })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for RmError {
    fn into_response(self) -> Response {
        match self {
            RmError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}

impl ApiRequest for RmRequest {
    type Response = RmResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/object/rm")?;
        Ok(client.post(full_url).json(&self))
    }
}
