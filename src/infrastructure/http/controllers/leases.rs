use crate::{
    infrastructure::http::middleware::{lease_reply, ApiResult, AppState},
    models::{AcquireLeaseRequest, LeaseResponse, LeaseStatusResponse, LeaseTokenRequest},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

/// POST /api/lock/acquire - Try to take the lease on a resource
pub async fn acquire_lease(
    State(state): State<AppState>,
    payload: Result<Json<AcquireLeaseRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LeaseResponse>)> {
    let Json(request) = payload?;
    tracing::info!(
        "Acquire request for resource '{}' from '{}'",
        request.resource_name.as_deref().unwrap_or_default(),
        request.owner_id.as_deref().unwrap_or_default()
    );

    Ok(lease_reply(state.lease_service.acquire(&request)))
}

/// POST /api/lock/heartbeat - Prove the holder is still alive
pub async fn heartbeat(
    State(state): State<AppState>,
    payload: Result<Json<LeaseTokenRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LeaseResponse>)> {
    let Json(request) = payload?;
    tracing::debug!(
        "Heartbeat for resource '{}'",
        request.resource_name.as_deref().unwrap_or_default()
    );

    Ok(lease_reply(state.lease_service.renew(&request)))
}

/// POST /api/lock/release - Give the lease back
pub async fn release_lease(
    State(state): State<AppState>,
    payload: Result<Json<LeaseTokenRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LeaseResponse>)> {
    let Json(request) = payload?;
    tracing::info!(
        "Release request for resource '{}'",
        request.resource_name.as_deref().unwrap_or_default()
    );

    Ok(lease_reply(state.lease_service.release(&request)))
}

/// GET /api/lock/status/:resource_name - Who holds the resource, if anyone
pub async fn lease_status(
    State(state): State<AppState>,
    Path(resource_name): Path<String>,
) -> Json<LeaseStatusResponse> {
    Json(state.lease_service.status(&resource_name))
}
