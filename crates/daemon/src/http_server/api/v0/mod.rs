use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use http::StatusCode;

use common::prelude::{AclError, AuthzError, ExplorerError, ShareError};

pub mod folder;
pub mod object;
pub mod user;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/folder", folder::router(state.clone()))
        .nest("/object", object::router(state.clone()))
        .nest("/user", user::router(state.clone()))
        .with_state(state)
}

/// Status code for an explorer failure. `None` means an internal error whose
/// details stay in the logs.
fn status_for(err: &ExplorerError) -> Option<StatusCode> {
    let status = match err {
        ExplorerError::Authz(AuthzError::Denied { .. })
        | ExplorerError::Share(ShareError::Forbidden { .. }) => StatusCode::FORBIDDEN,
        ExplorerError::InvalidPath(_)
        | ExplorerError::ReservedName(_)
        | ExplorerError::Share(ShareError::InvalidTarget { .. }) => StatusCode::BAD_REQUEST,
        ExplorerError::NotFound(_)
        | ExplorerError::Acl(AclError::NotFound(_))
        | ExplorerError::Share(ShareError::Acl(AclError::NotFound(_))) => StatusCode::NOT_FOUND,
        ExplorerError::AlreadyExists(_) => StatusCode::CONFLICT,
        ExplorerError::Share(ShareError::Partial { .. }) => StatusCode::MULTI_STATUS,
        _ => return None,
    };
    Some(status)
}

/// Shared `IntoResponse` body for every handler error that wraps an
/// [`ExplorerError`].
pub(crate) fn explorer_error_response(err: ExplorerError) -> Response {
    match status_for(&err) {
        Some(status) => {
            tracing::debug!(status = %status, error = %err, "request rejected");
            (status, Json(serde_json::json!({"msg": err.to_string()}))).into_response()
        }
        None => {
            tracing::error!(error = ?err, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"msg": "internal server error"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::{FolderPath, Mode, PathError, UserId};

    #[test]
    fn test_status_mapping() {
        let folder = FolderPath::normalize("alice/docs").unwrap();
        let user = UserId::parse("bob").unwrap();

        let denied = ExplorerError::Authz(AuthzError::Denied {
            folder: folder.clone(),
            user: user.clone(),
            mode: Mode::Read,
        });
        assert_eq!(status_for(&denied), Some(StatusCode::FORBIDDEN));

        let forbidden = ExplorerError::Share(ShareError::Forbidden {
            folder: folder.clone(),
            user,
        });
        assert_eq!(status_for(&forbidden), Some(StatusCode::FORBIDDEN));

        let invalid = ExplorerError::InvalidPath(PathError::Empty);
        assert_eq!(status_for(&invalid), Some(StatusCode::BAD_REQUEST));

        let missing = ExplorerError::Acl(AclError::NotFound(folder));
        assert_eq!(status_for(&missing), Some(StatusCode::NOT_FOUND));

        let parse = ExplorerError::Acl(AclError::Parse {
            key: "alice/docs/.permissions".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        });
        assert_eq!(status_for(&parse), None);
        assert_eq!(
            explorer_error_response(parse).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
