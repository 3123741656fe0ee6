use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::models::{LeaseResponse, LeaseStatus};

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing request body. Rendered as a `BadRequest` lease response.
    BadRequest(String),
    NotFound(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(LeaseResponse::bad_request(msg))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}

// Convert from axum body rejections so clients always get the lease vocabulary
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected lease request body: {}", rejection.body_text());
        ApiError::BadRequest(format!("Request body is invalid: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Transport status for a lease outcome tag.
pub fn status_code_for(status: LeaseStatus) -> StatusCode {
    match status {
        LeaseStatus::Acquired | LeaseStatus::HeartbeatReceived | LeaseStatus::Released => {
            StatusCode::OK
        }
        LeaseStatus::BadRequest => StatusCode::BAD_REQUEST,
        LeaseStatus::NotFound => StatusCode::NOT_FOUND,
        LeaseStatus::Busy | LeaseStatus::InvalidToken => StatusCode::CONFLICT,
    }
}

/// Pair a lease response with its transport status.
pub fn lease_reply(response: LeaseResponse) -> (StatusCode, Json<LeaseResponse>) {
    (status_code_for(response.status), Json(response))
}
