//! Wire shapes shared by the lease service and the lease client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entities::LeaseSnapshot;

/// Closed vocabulary of outcome tags carried in every `LeaseResponse`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeaseStatus {
    Acquired,
    Busy,
    HeartbeatReceived,
    Released,
    InvalidToken,
    NotFound,
    BadRequest,
}

impl LeaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseStatus::Acquired => "Acquired",
            LeaseStatus::Busy => "Busy",
            LeaseStatus::HeartbeatReceived => "HeartbeatReceived",
            LeaseStatus::Released => "Released",
            LeaseStatus::InvalidToken => "InvalidToken",
            LeaseStatus::NotFound => "NotFound",
            LeaseStatus::BadRequest => "BadRequest",
        }
    }
}

impl std::fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquireLeaseRequest {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default, alias = "clientId")]
    pub owner_id: Option<String>,
}

/// Body of both heartbeat and release calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseTokenRequest {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default, alias = "lockToken")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaseResponse {
    pub success: bool,
    pub status: LeaseStatus,
    #[serde(default, alias = "lockToken", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Server lease timeout in milliseconds, sent with grants and heartbeats
    /// so holders can pace their renewals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_timeout_ms: Option<u64>,
}

impl LeaseResponse {
    pub fn success(status: LeaseStatus, token: Option<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            status,
            token,
            message: Some(message.into()),
            lease_timeout_ms: None,
        }
    }

    pub fn failure(status: LeaseStatus, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            token: None,
            message: Some(message.into()),
            lease_timeout_ms: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::failure(LeaseStatus::BadRequest, message)
    }

    pub fn with_lease_timeout(mut self, timeout: Duration) -> Self {
        self.lease_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// The advertised lease timeout, if the server sent one.
    pub fn lease_timeout(&self) -> Option<Duration> {
        self.lease_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaseStatusResponse {
    pub is_locked: bool,
    pub resource_name: String,
    #[serde(default, alias = "clientId", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<DateTime<Utc>>,
}

impl LeaseStatusResponse {
    pub fn unlocked(resource_name: impl Into<String>) -> Self {
        Self {
            is_locked: false,
            resource_name: resource_name.into(),
            owner_id: None,
            acquired_at: None,
            last_heartbeat: None,
        }
    }
}

impl From<LeaseSnapshot> for LeaseStatusResponse {
    fn from(snapshot: LeaseSnapshot) -> Self {
        Self {
            is_locked: true,
            resource_name: snapshot.resource_name,
            owner_id: Some(snapshot.owner_id),
            acquired_at: Some(snapshot.acquired_at),
            last_heartbeat: Some(snapshot.last_renewed_at),
        }
    }
}
