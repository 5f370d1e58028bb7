//! Store API routes.

use crate::handlers::list_blog;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn store_api_routes(state: AppState) -> Router {
    let body_limit = state.settings.body_limit;
    Router::new()
        .route("/store-api/blog", get(list_blog).post(list_blog))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
