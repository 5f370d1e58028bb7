//! Service probes: liveness, readiness and build info.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct Probe {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

impl Probe {
    const fn ok(database: Option<&'static str>) -> Self {
        Probe { status: "ok", database }
    }
}

async fn health() -> Json<Probe> {
    Json(Probe::ok(None))
}

/// Without a pool (in-memory repositories) the service is always ready.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Probe>) {
    let Some(pool) = state.pool.as_ref() else {
        return (StatusCode::OK, Json(Probe::ok(None)));
    };
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => (StatusCode::OK, Json(Probe::ok(Some("ok")))),
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            let body = Probe {
                status: "degraded",
                database: Some("unavailable"),
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

async fn version() -> Json<Value> {
    Json(json!({ "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
}

/// GET /health, GET /ready, GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
