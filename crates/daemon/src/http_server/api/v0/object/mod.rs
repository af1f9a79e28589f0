use axum::routing::{get, post};
use axum::Router;

use crate::ServiceState;

pub mod fetch;
pub mod link;
pub mod rm;
pub mod upload;

pub use fetch::GetQuery;
pub use link::UrlRequest;
pub use rm::RmRequest;
pub use upload::UploadRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/upload", post(upload::handler))
        .route("/rm", post(rm::handler))
        .route("/url", post(link::handler))
        .route("/get", get(fetch::handler))
        .with_state(state)
}
