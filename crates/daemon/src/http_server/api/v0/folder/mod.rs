use axum::routing::post;
use axum::Router;

use crate::ServiceState;

pub mod create;
pub mod ls;
pub mod revoke;
pub mod share;
pub mod shortcuts;

pub use create::CreateRequest;
pub use ls::LsRequest;
pub use revoke::RevokeRequest;
pub use share::ShareRequest;
pub use shortcuts::ShortcutsRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/ls", post(ls::handler))
        .route("/create", post(create::handler))
        .route("/share", post(share::handler))
        .route("/revoke", post(revoke::handler))
        .route("/shortcuts", post(shortcuts::handler))
        .with_state(state)
}
