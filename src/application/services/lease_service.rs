use crate::{
    domain::entities::{AcquireOutcome, ReleaseOutcome, RenewOutcome},
    domain::ports::lease_store::LeaseStore,
    models::{AcquireLeaseRequest, LeaseResponse, LeaseStatus, LeaseStatusResponse, LeaseTokenRequest},
    shared::token::generate_owner_id,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Façade over the lease store.
///
/// Checks that required fields are present, delegates, and translates store
/// outcomes into `LeaseResponse`. Holds no state besides the store handle.
#[derive(Clone)]
pub struct LeaseService {
    store: Arc<dyn LeaseStore>,
}

impl LeaseService {
    pub fn new(store: Arc<dyn LeaseStore>) -> Self {
        Self { store }
    }

    pub fn acquire(&self, request: &AcquireLeaseRequest) -> LeaseResponse {
        let Some(resource_name) = non_empty(request.resource_name.as_deref()) else {
            warn!("Acquire rejected: missing resource name");
            record("lease_acquire_total", LeaseStatus::BadRequest);
            return LeaseResponse::bad_request("Resource name is required");
        };
        let owner_id = non_empty(request.owner_id.as_deref())
            .map(str::to_string)
            .unwrap_or_else(generate_owner_id);

        let response = match self.store.try_acquire(resource_name, &owner_id) {
            AcquireOutcome::Acquired { token } => LeaseResponse::success(
                LeaseStatus::Acquired,
                Some(token),
                "Lock acquired successfully",
            )
            .with_lease_timeout(self.store.lease_timeout()),
            AcquireOutcome::Busy { owner_id: holder } => {
                debug!(
                    "Acquire of '{}' by '{}' refused, held by '{}'",
                    resource_name, owner_id, holder
                );
                LeaseResponse::failure(
                    LeaseStatus::Busy,
                    format!("Resource '{}' is currently locked by another client", resource_name),
                )
            }
            AcquireOutcome::BadRequest(message) => LeaseResponse::bad_request(message),
        };

        record("lease_acquire_total", response.status);
        self.record_active();
        response
    }

    pub fn renew(&self, request: &LeaseTokenRequest) -> LeaseResponse {
        let (resource_name, token) = match required_token_fields(request) {
            Ok(fields) => fields,
            Err(response) => {
                record("lease_renew_total", LeaseStatus::BadRequest);
                return response;
            }
        };

        let response = match self.store.renew(resource_name, token) {
            RenewOutcome::Renewed => LeaseResponse::success(
                LeaseStatus::HeartbeatReceived,
                Some(token.to_string()),
                "Heartbeat received successfully",
            )
            .with_lease_timeout(self.store.lease_timeout()),
            RenewOutcome::InvalidToken => {
                LeaseResponse::failure(LeaseStatus::InvalidToken, "Lock token does not match")
            }
            RenewOutcome::NotFound => LeaseResponse::failure(
                LeaseStatus::NotFound,
                "Lock not found for the specified resource",
            ),
            RenewOutcome::BadRequest(message) => LeaseResponse::bad_request(message),
        };

        record("lease_renew_total", response.status);
        response
    }

    pub fn release(&self, request: &LeaseTokenRequest) -> LeaseResponse {
        let (resource_name, token) = match required_token_fields(request) {
            Ok(fields) => fields,
            Err(response) => {
                record("lease_release_total", LeaseStatus::BadRequest);
                return response;
            }
        };

        let response = match self.store.release(resource_name, token) {
            ReleaseOutcome::Released => {
                info!("Lease on '{}' released by holder", resource_name);
                LeaseResponse::success(LeaseStatus::Released, None, "Lock released successfully")
            }
            ReleaseOutcome::InvalidToken => {
                LeaseResponse::failure(LeaseStatus::InvalidToken, "Lock token does not match")
            }
            ReleaseOutcome::NotFound => LeaseResponse::failure(
                LeaseStatus::NotFound,
                "Lock not found for the specified resource",
            ),
            ReleaseOutcome::BadRequest(message) => LeaseResponse::bad_request(message),
        };

        record("lease_release_total", response.status);
        self.record_active();
        response
    }

    /// Current holder of `resource_name`, if any. Never evicts.
    pub fn status(&self, resource_name: &str) -> LeaseStatusResponse {
        match self.store.query(resource_name) {
            Some(snapshot) => {
                debug!("Resource '{}' is leased by '{}'", resource_name, snapshot.owner_id);
                snapshot.into()
            }
            None => {
                debug!("Resource '{}' is not leased", resource_name);
                LeaseStatusResponse::unlocked(resource_name)
            }
        }
    }

    fn record_active(&self) {
        metrics::gauge!("lease_active").set(self.store.len() as f64);
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_token_fields(request: &LeaseTokenRequest) -> Result<(&str, &str), LeaseResponse> {
    match (
        non_empty(request.resource_name.as_deref()),
        non_empty(request.token.as_deref()),
    ) {
        (Some(resource_name), Some(token)) => Ok((resource_name, token)),
        _ => {
            warn!("Lease request rejected: missing resource name or token");
            Err(LeaseResponse::bad_request(
                "Resource name and lock token are required",
            ))
        }
    }
}

fn record(counter: &'static str, status: LeaseStatus) {
    metrics::counter!(counter, "outcome" => status.as_str()).increment(1);
}
