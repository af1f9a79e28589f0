use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use common::prelude::{ExplorerError, UserId};

use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
pub struct GetQuery {
    pub key: String,
    pub user: String,
}

/// Serve an object's bytes, for backends that cannot presign URLs.
pub async fn handler(
    State(state): State<ServiceState>,
    Query(query): Query<GetQuery>,
) -> Result<impl IntoResponse, GetError> {
    let user = UserId::parse(&query.user).map_err(ExplorerError::from)?;
    let data = state.explorer().read_object(&query.key, &user).await?;

    let mime = mime_guess::from_path(&query.key).first_or_octet_stream();
    Ok((
        http::StatusCode::OK,
        [(header::CONTENT_TYPE, mime.to_string())],
        data,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl IntoResponse for GetError {
    fn into_response(self) -> Response {
        match self {
            GetError::Explorer(e) => super::super::explorer_error_response(e),
        }
    }
}
