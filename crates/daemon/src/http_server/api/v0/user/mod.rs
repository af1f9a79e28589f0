use axum::routing::post;
use axum::Router;

use crate::ServiceState;

pub mod provision;

pub use provision::ProvisionRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/provision", post(provision::handler))
        .with_state(state)
}
