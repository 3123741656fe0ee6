use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::transport::LeaseTransport;

/// A lease held on one resource.
///
/// While the handle is alive a background task sends a heartbeat every renewal
/// interval. Call [`LeaseHandle::release`] when done. Dropping an unreleased
/// handle stops the heartbeats and fires a best-effort release on the current
/// tokio runtime; if there is none, the server reclaims the lease once it
/// times out.
pub struct LeaseHandle {
    resource_name: String,
    token: String,
    renew_interval: Duration,
    transport: LeaseTransport,
    state: Mutex<HandleState>,
}

struct HandleState {
    released: bool,
    renewal: Option<RenewalTask>,
}

struct RenewalTask {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl RenewalTask {
    /// Cancel the loop and wait until any in-flight heartbeat has finished.
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            if e.is_panic() {
                warn!("Lease renewal task panicked: {}", e);
            }
        }
    }
}

impl LeaseHandle {
    /// Start renewing a freshly acquired lease. Must run inside a tokio runtime.
    pub(crate) fn start(
        transport: LeaseTransport,
        resource_name: String,
        token: String,
        renew_interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let join = tokio::spawn(renewal_loop(
            transport.clone(),
            resource_name.clone(),
            token.clone(),
            renew_interval,
            cancel.clone(),
        ));
        info!(
            "Lease handle created for resource '{}' (renewing every {:?})",
            resource_name, renew_interval
        );

        Self {
            resource_name,
            token,
            renew_interval,
            transport,
            state: Mutex::new(HandleState {
                released: false,
                renewal: Some(RenewalTask { cancel, join }),
            }),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Period of the background heartbeat.
    pub fn renew_interval(&self) -> Duration {
        self.renew_interval
    }

    pub async fn is_released(&self) -> bool {
        self.state.lock().await.released
    }

    /// Stop heartbeats, then ask the service to drop the lease.
    ///
    /// Idempotent and safe to call concurrently: exactly one call performs the
    /// release and returns `true`; the others wait for it and return `false`.
    /// A failed release request is logged and otherwise ignored.
    ///
    /// The handle only counts as released once the request has gone out. If
    /// this future is dropped before that, a later `release()` or the drop of
    /// the handle sends it instead.
    pub async fn release(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.released {
            return false;
        }
        debug!("Releasing lease handle for resource '{}'", self.resource_name);

        if let Some(renewal) = state.renewal.take() {
            renewal.stop().await;
        }

        send_release(&self.transport, &self.resource_name, &self.token).await;
        state.released = true;
        true
    }
}

impl fmt::Debug for LeaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaseHandle")
            .field("resource_name", &self.resource_name)
            .field("service", &self.transport.base_url().as_str())
            .finish_non_exhaustive()
    }
}

impl Drop for LeaseHandle {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.released {
            return;
        }
        state.released = true;

        let renewal = state.renewal.take();
        if let Some(task) = &renewal {
            task.cancel.cancel();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // No runtime left to send the release; the lease expires server-side.
            if let Some(task) = renewal {
                task.join.abort();
            }
            warn!(
                "Lease handle for '{}' dropped outside a runtime; relying on expiry",
                self.resource_name
            );
            return;
        };

        warn!(
            "Lease handle for '{}' dropped without release; releasing in background",
            self.resource_name
        );
        let transport = self.transport.clone();
        let resource_name = std::mem::take(&mut self.resource_name);
        let token = std::mem::take(&mut self.token);
        runtime.spawn(async move {
            if let Some(task) = renewal {
                task.stop().await;
            }
            send_release(&transport, &resource_name, &token).await;
        });
    }
}

async fn renewal_loop(
    transport: LeaseTransport,
    resource_name: String,
    token: String,
    renew_interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + renew_interval, renew_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // A missed heartbeat is not fatal: the server only expires the lease
        // after the full timeout, so keep trying on the next tick.
        match transport.heartbeat(&resource_name, &token).await {
            Ok(response) if response.success => {
                debug!("Heartbeat sent for resource '{}'", resource_name);
            }
            Ok(response) => {
                warn!(
                    "Heartbeat rejected for resource '{}': {}",
                    resource_name, response.status
                );
            }
            Err(e) => {
                warn!("Heartbeat failed for resource '{}': {}", resource_name, e);
            }
        }
    }

    debug!("Renewal loop for resource '{}' stopped", resource_name);
}

async fn send_release(transport: &LeaseTransport, resource_name: &str, token: &str) {
    match transport.release(resource_name, token).await {
        Ok(response) if response.success => {
            info!("Lease released for resource '{}'", resource_name);
        }
        Ok(response) => {
            warn!(
                "Failed to release lease for resource '{}': {}",
                resource_name, response.status
            );
        }
        Err(e) => {
            warn!("Error releasing lease for resource '{}': {}", resource_name, e);
        }
    }
}
