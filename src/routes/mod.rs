//! Routers: store API and service probes.

pub mod common;
pub mod store_api;

pub use common::common_routes;
pub use store_api::store_api_routes;

use crate::state::AppState;
use axum::Router;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(store_api_routes(state))
}
