use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{ClientError, ClientResult};
use super::lease_handle::LeaseHandle;
use super::transport::LeaseTransport;
use crate::models::LeaseStatus;
use crate::shared::token::generate_owner_id;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Heartbeat period when the service does not advertise its lease timeout.
pub const DEFAULT_RENEW_INTERVAL: Duration = Duration::from_secs(30);

const MIN_RENEW_INTERVAL: Duration = Duration::from_millis(1);

/// Entry point of the client library: acquires leases and answers status queries.
///
/// Losing a race, a rejected request and an unreachable service all look the
/// same to callers of [`LeaseClient::acquire`]: no handle. Only empty
/// arguments are reported as errors.
#[derive(Clone, Debug)]
pub struct LeaseClient {
    transport: LeaseTransport,
    renew_interval: Option<Duration>,
}

impl LeaseClient {
    /// Client with its own HTTP connection pool and a 30 second request timeout.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_http_client(base_url, http)
    }

    /// Client sharing a caller-provided HTTP client.
    pub fn with_http_client(base_url: &str, http: Client) -> ClientResult<Self> {
        let transport = LeaseTransport::new(base_url, http)?;
        info!("Lease client initialized with service URL: {}", transport.base_url());

        Ok(Self {
            transport,
            renew_interval: None,
        })
    }

    /// Pin how often handles from this client send heartbeats.
    ///
    /// Without an override a handle renews after two thirds of the lease
    /// timeout the service advertises when granting it (30s for the 45s
    /// default), or every [`DEFAULT_RENEW_INTERVAL`] if the service sends none.
    /// An override must stay below the service's lease timeout, otherwise the
    /// lease expires between heartbeats.
    pub fn with_renew_interval(mut self, renew_interval: Duration) -> ClientResult<Self> {
        if renew_interval.is_zero() {
            return Err(ClientError::InvalidArgument("renew interval must be non-zero"));
        }
        self.renew_interval = Some(renew_interval);
        Ok(self)
    }

    /// The pinned heartbeat period, if one was set.
    pub fn renew_interval(&self) -> Option<Duration> {
        self.renew_interval
    }

    fn renewal_period(&self, lease_timeout: Option<Duration>) -> Duration {
        match (self.renew_interval, lease_timeout) {
            (Some(pinned), Some(timeout)) if pinned >= timeout => {
                warn!(
                    "Renew interval {:?} is not shorter than the service lease timeout {:?}",
                    pinned, timeout
                );
                pinned
            }
            (Some(pinned), _) => pinned,
            (None, Some(timeout)) => (timeout / 3 * 2).max(MIN_RENEW_INTERVAL),
            (None, None) => DEFAULT_RENEW_INTERVAL,
        }
    }

    /// Try to take the lease on `resource_name`.
    ///
    /// Returns `Ok(None)` when the resource is busy, the request is rejected, or
    /// the service cannot be reached. A missing `owner_id` is replaced with a
    /// random one.
    pub async fn acquire(
        &self,
        resource_name: &str,
        owner_id: Option<&str>,
    ) -> ClientResult<Option<LeaseHandle>> {
        if resource_name.trim().is_empty() {
            return Err(ClientError::MissingArgument("resource name"));
        }
        let owner_id = owner_id
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(generate_owner_id);

        debug!(
            "Attempting to acquire lease for resource '{}' as '{}'",
            resource_name, owner_id
        );

        let response = match self.transport.acquire(resource_name, &owner_id).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "Error acquiring lease for resource '{}' as '{}': {}",
                    resource_name, owner_id, e
                );
                return Ok(None);
            }
        };

        let renew_interval = self.renewal_period(response.lease_timeout());
        match response.token {
            Some(token)
                if response.success
                    && response.status == LeaseStatus::Acquired
                    && !token.is_empty() =>
            {
                info!(
                    "Lease acquired for resource '{}' as '{}'",
                    resource_name, owner_id
                );
                Ok(Some(LeaseHandle::start(
                    self.transport.clone(),
                    resource_name.to_string(),
                    token,
                    renew_interval,
                )))
            }
            _ => {
                warn!(
                    "Failed to acquire lease for resource '{}' as '{}': {}",
                    resource_name, owner_id, response.status
                );
                Ok(None)
            }
        }
    }

    /// Whether the service reports an active lease on `resource_name`.
    /// An unreachable service reads as "not locked".
    pub async fn is_locked(&self, resource_name: &str) -> ClientResult<bool> {
        if resource_name.trim().is_empty() {
            return Err(ClientError::MissingArgument("resource name"));
        }

        match self.transport.status(resource_name).await {
            Ok(status) => {
                debug!(
                    "Resource '{}' lock status: {}",
                    resource_name,
                    if status.is_locked { "locked" } else { "unlocked" }
                );
                Ok(status.is_locked)
            }
            Err(e) => {
                warn!("Error checking lock status for resource '{}': {}", resource_name, e);
                Ok(false)
            }
        }
    }
}
