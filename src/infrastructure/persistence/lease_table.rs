use crate::domain::entities::{
    AcquireOutcome, Lease, LeaseSnapshot, ReleaseOutcome, RenewOutcome,
};
use crate::domain::ports::lease_store::LeaseStore;
use crate::domain::ports::time_service::TimeService;
use crate::shared::token::generate_lease_token;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// In-memory lease table.
///
/// One mutex guards the whole map: acquire, renew, release, sweep and snapshot
/// reads all go through it. Every operation is O(1) apart from the sweep, and
/// nothing awaits while the guard is held.
pub struct InMemoryLeaseTable {
    leases: Mutex<HashMap<String, Lease>>,
    lease_timeout: Duration,
    clock: Arc<dyn TimeService>,
}

impl InMemoryLeaseTable {
    pub fn new(lease_timeout: Duration, clock: Arc<dyn TimeService>) -> Self {
        Self {
            leases: Mutex::new(HashMap::new()),
            lease_timeout,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Lease>> {
        // A panic while holding the guard cannot leave a half-written entry
        // (every mutation is a single insert/remove/field store), so keep serving.
        self.leases.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LeaseStore for InMemoryLeaseTable {
    fn try_acquire(&self, resource_name: &str, owner_id: &str) -> AcquireOutcome {
        if resource_name.trim().is_empty() {
            warn!("try_acquire called with empty resource name");
            return AcquireOutcome::BadRequest("Resource name is required".to_string());
        }

        let mut leases = self.lock();
        let now = self.clock.now();

        if let Some(existing) = leases.get(resource_name) {
            if existing.is_expired(now, self.lease_timeout) {
                info!(
                    "Removing expired lease for resource '{}' (held by '{}')",
                    resource_name, existing.owner_id
                );
                leases.remove(resource_name);
            } else {
                debug!(
                    "Resource '{}' is already leased by '{}'",
                    resource_name, existing.owner_id
                );
                return AcquireOutcome::Busy {
                    owner_id: existing.owner_id.clone(),
                };
            }
        }

        let token = generate_lease_token();
        leases.insert(
            resource_name.to_string(),
            Lease::new(
                resource_name.to_string(),
                owner_id.to_string(),
                token.clone(),
                now,
            ),
        );
        info!("Lease acquired for resource '{}' by '{}'", resource_name, owner_id);

        AcquireOutcome::Acquired { token }
    }

    fn renew(&self, resource_name: &str, token: &str) -> RenewOutcome {
        if resource_name.trim().is_empty() || token.trim().is_empty() {
            warn!("renew called with empty resource name or token");
            return RenewOutcome::BadRequest(
                "Resource name and lock token are required".to_string(),
            );
        }

        let mut leases = self.lock();
        let now = self.clock.now();

        match leases.get_mut(resource_name) {
            Some(lease) if lease.token == token => {
                lease.last_renewed_at = now;
                debug!("Heartbeat received for resource '{}'", resource_name);
                RenewOutcome::Renewed
            }
            Some(_) => {
                warn!("Heartbeat rejected for resource '{}': invalid token", resource_name);
                RenewOutcome::InvalidToken
            }
            None => {
                warn!("Heartbeat rejected for resource '{}': lease not found", resource_name);
                RenewOutcome::NotFound
            }
        }
    }

    fn release(&self, resource_name: &str, token: &str) -> ReleaseOutcome {
        if resource_name.trim().is_empty() || token.trim().is_empty() {
            warn!("release called with empty resource name or token");
            return ReleaseOutcome::BadRequest(
                "Resource name and lock token are required".to_string(),
            );
        }

        let mut leases = self.lock();

        match leases.get(resource_name) {
            Some(lease) if lease.token == token => {
                leases.remove(resource_name);
                info!("Lease released for resource '{}'", resource_name);
                ReleaseOutcome::Released
            }
            Some(_) => {
                warn!("Release rejected for resource '{}': invalid token", resource_name);
                ReleaseOutcome::InvalidToken
            }
            None => {
                warn!("Release rejected for resource '{}': lease not found", resource_name);
                ReleaseOutcome::NotFound
            }
        }
    }

    fn query(&self, resource_name: &str) -> Option<LeaseSnapshot> {
        self.lock().get(resource_name).map(Lease::snapshot)
    }

    fn sweep_expired(&self) -> Vec<Lease> {
        let mut leases = self.lock();
        let now = self.clock.now();

        let expired: Vec<String> = leases
            .iter()
            .filter(|(_, lease)| lease.is_expired(now, self.lease_timeout))
            .map(|(name, _)| name.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|name| leases.remove(&name))
            .collect()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lease_timeout(&self) -> Duration {
        self.lease_timeout
    }
}
