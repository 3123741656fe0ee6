use crate::infrastructure::http::controllers::leases;
use crate::infrastructure::http::middleware::{ApiError, AppState};
use axum::{
    extract::OriginalUri,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Lease request bodies are two short strings; anything larger is refused.
const MAX_BODY_BYTES: usize = 16 * 1024;

pub fn build_router(state: AppState) -> Router {
    let lock_routes = Router::new()
        .route("/api/lock/acquire", post(leases::acquire_lease))
        .route("/api/lock/heartbeat", post(leases::heartbeat))
        .route("/api/lock/renew", post(leases::heartbeat))
        .route("/api/lock/release", post(leases::release_lease))
        .route("/api/lock/status/:resource_name", get(leases::lease_status));

    Router::new()
        .route("/health", get(health_handler))
        .merge(lock_routes)
        .fallback(fallback_handler)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn fallback_handler(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
