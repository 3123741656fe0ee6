use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::ports::lease_store::LeaseStore;
use crate::domain::ports::time_service::TimeService;

/// Background task that evicts leases whose holder stopped sending heartbeats.
pub struct LeaseSweeper {
    store: Arc<dyn LeaseStore>,
    time_service: Arc<dyn TimeService>,
    interval: Duration,
}

impl LeaseSweeper {
    pub fn new(
        store: Arc<dyn LeaseStore>,
        time_service: Arc<dyn TimeService>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            time_service,
            interval,
        }
    }

    /// Sweep every `interval` until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Starting LeaseSweeper (interval {:?})", self.interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.time_service.sleep(self.interval) => {}
            }
            self.sweep_once();
        }
        info!("LeaseSweeper stopped");
    }

    /// One pass over the table. Returns the number of evicted leases.
    pub fn sweep_once(&self) -> usize {
        let evicted = self.store.sweep_expired();

        if !evicted.is_empty() {
            info!("Cleaning up {} expired lease(s)", evicted.len());
            metrics::counter!("lease_expired_total").increment(evicted.len() as u64);
        }
        for lease in &evicted {
            debug!(
                "Removed expired lease for resource '{}' (was held by '{}')",
                lease.resource_name, lease.owner_id
            );
        }
        metrics::gauge!("lease_active").set(self.store.len() as f64);

        evicted.len()
    }
}
