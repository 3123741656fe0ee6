use std::time::Duration;

use crate::domain::entities::{AcquireOutcome, Lease, LeaseSnapshot, ReleaseOutcome, RenewOutcome};

/// Authoritative resource -> lease mapping.
///
/// Every mutating call is atomic with respect to every other call on the same store.
/// Outcomes are values: a losing or malformed request is reported, never raised.
pub trait LeaseStore: Send + Sync {
    /// Acquire the lease on `resource_name` for `owner_id`.
    /// A lease whose last renewal is older than the timeout is evicted first.
    fn try_acquire(&self, resource_name: &str, owner_id: &str) -> AcquireOutcome;

    /// Refresh the liveness of the lease if `token` matches the current holder.
    fn renew(&self, resource_name: &str, token: &str) -> RenewOutcome;

    /// Remove the lease if `token` matches the current holder.
    fn release(&self, resource_name: &str, token: &str) -> ReleaseOutcome;

    /// Read one lease entry without mutating or evicting anything.
    fn query(&self, resource_name: &str) -> Option<LeaseSnapshot>;

    /// Remove every lease older than the timeout, judged against a single `now`.
    /// Returns the evicted leases.
    fn sweep_expired(&self) -> Vec<Lease>;

    /// Number of entries currently in the table, expired or not.
    fn len(&self) -> usize;

    /// How long a lease survives without a heartbeat.
    fn lease_timeout(&self) -> Duration;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
