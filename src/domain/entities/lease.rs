use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An active lease on a named resource.
///
/// Only `last_renewed_at` changes after creation. Everything else is fixed
/// until the entry is removed by release or expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lease {
    pub resource_name: String,
    /// Diagnostic only, never used for authorization.
    pub owner_id: String,
    pub token: String,
    pub acquired_at: DateTime<Utc>,
    pub last_renewed_at: DateTime<Utc>,
}

impl Lease {
    pub fn new(resource_name: String, owner_id: String, token: String, now: DateTime<Utc>) -> Self {
        Self {
            resource_name,
            owner_id,
            token,
            acquired_at: now,
            last_renewed_at: now,
        }
    }

    /// A lease is stale once strictly more than `timeout` has passed since its last renewal.
    /// A renewal stamped after `now` (clock stepped backwards) never counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        match (now - self.last_renewed_at).to_std() {
            Ok(elapsed) => elapsed > timeout,
            Err(_) => false,
        }
    }

    pub fn snapshot(&self) -> LeaseSnapshot {
        LeaseSnapshot {
            resource_name: self.resource_name.clone(),
            owner_id: self.owner_id.clone(),
            acquired_at: self.acquired_at,
            last_renewed_at: self.last_renewed_at,
        }
    }
}

/// Read-only copy of a lease entry, taken in one piece under the table lock.
///
/// The token is deliberately absent: status readers must not learn the credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaseSnapshot {
    pub resource_name: String,
    pub owner_id: String,
    pub acquired_at: DateTime<Utc>,
    pub last_renewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired { token: String },
    /// Someone else holds a live lease. Carries the holder for diagnostics.
    Busy { owner_id: String },
    BadRequest(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewOutcome {
    Renewed,
    InvalidToken,
    NotFound,
    BadRequest(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    InvalidToken,
    NotFound,
    BadRequest(String),
}
