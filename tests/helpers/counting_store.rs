use leasekeeper::domain::entities::{
    AcquireOutcome, Lease, LeaseSnapshot, ReleaseOutcome, RenewOutcome,
};
use leasekeeper::domain::ports::lease_store::LeaseStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Store wrapper that counts the heartbeats reaching the server.
pub struct CountingLeaseStore {
    inner: Arc<dyn LeaseStore>,
    renewals: AtomicUsize,
}

impl CountingLeaseStore {
    pub fn new(inner: Arc<dyn LeaseStore>) -> Self {
        Self {
            inner,
            renewals: AtomicUsize::new(0),
        }
    }

    pub fn renewals(&self) -> usize {
        self.renewals.load(Ordering::SeqCst)
    }
}

impl LeaseStore for CountingLeaseStore {
    fn try_acquire(&self, resource_name: &str, owner_id: &str) -> AcquireOutcome {
        self.inner.try_acquire(resource_name, owner_id)
    }

    fn renew(&self, resource_name: &str, token: &str) -> RenewOutcome {
        self.renewals.fetch_add(1, Ordering::SeqCst);
        self.inner.renew(resource_name, token)
    }

    fn release(&self, resource_name: &str, token: &str) -> ReleaseOutcome {
        self.inner.release(resource_name, token)
    }

    fn query(&self, resource_name: &str) -> Option<LeaseSnapshot> {
        self.inner.query(resource_name)
    }

    fn sweep_expired(&self) -> Vec<Lease> {
        self.inner.sweep_expired()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn lease_timeout(&self) -> Duration {
        self.inner.lease_timeout()
    }
}
