use crate::application::services::LeaseService;
use crate::config::{ConfigError, LeaseSettings};
use crate::domain::ports::lease_store::LeaseStore;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::http::router::build_router;
use crate::infrastructure::persistence::InMemoryLeaseTable;
use crate::infrastructure::workers::LeaseSweeper;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Everything a running lease service needs, wired together.
pub struct LeaseServer {
    pub state: AppState,
    /// The table behind the service. Exposed for diagnostics and tests.
    pub store: Arc<InMemoryLeaseTable>,
    /// Cancelling this stops the sweeper and the HTTP server.
    pub shutdown: CancellationToken,
}

/// Build the lease table and service and start the expiry sweeper.
///
/// The table lives exactly as long as the returned server.
pub fn build_app_state(
    settings: &LeaseSettings,
    time_service: Arc<dyn TimeService>,
    task_spawner: Arc<dyn TaskSpawner>,
) -> Result<LeaseServer, ConfigError> {
    settings.validate()?;

    let store = Arc::new(InMemoryLeaseTable::new(
        settings.lease_timeout,
        time_service.clone(),
    ));
    tracing::info!(
        "Lease table initialized (timeout {:?}, sweep interval {:?})",
        settings.lease_timeout,
        settings.sweep_interval
    );

    let lease_service = LeaseService::new(store.clone() as Arc<dyn LeaseStore>);

    let shutdown = CancellationToken::new();
    let sweeper = LeaseSweeper::new(
        store.clone() as Arc<dyn LeaseStore>,
        time_service,
        settings.sweep_interval,
    );
    let sweeper_shutdown = shutdown.clone();
    task_spawner.spawn(
        "lease_sweeper",
        Box::pin(async move {
            sweeper.run(sweeper_shutdown).await;
        }),
    );

    Ok(LeaseServer {
        state: AppState::new(lease_service),
        store,
        shutdown,
    })
}

/// Serve the lease API on `listener` until ctrl-c or `server.shutdown` fires.
pub async fn serve(listener: TcpListener, server: LeaseServer) -> std::io::Result<()> {
    let shutdown = server.shutdown.clone();
    let app = build_router(server.state);

    let signal = {
        let shutdown = shutdown.clone();
        async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        tracing::error!("Failed to listen for ctrl-c: {}", e);
                        // Without a signal handler only explicit cancellation stops the server
                        shutdown.cancelled().await;
                    }
                    tracing::info!("Shutdown signal received");
                }
            }
        }
    };

    let result = axum::serve(listener, app).with_graceful_shutdown(signal).await;
    shutdown.cancel();
    result
}
