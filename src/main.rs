use leasekeeper::bootstrap;
use leasekeeper::config::Config;
use leasekeeper::domain::ports::task_spawner::TaskSpawner;
use leasekeeper::domain::ports::time_service::TimeService;
use leasekeeper::infrastructure::observability;
use leasekeeper::infrastructure::runtime::tokio::{TokioTaskSpawner, TokioTimeService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing and metrics
    let _observability = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    let time_service = Arc::new(TokioTimeService::new()) as Arc<dyn TimeService>;
    let task_spawner = Arc::new(TokioTaskSpawner::new()) as Arc<dyn TaskSpawner>;
    let server = bootstrap::build_app_state(&config.lease, time_service, task_spawner)?;

    // Start server
    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Lease service listening on {}", addr);
    bootstrap::serve(listener, server).await?;

    tracing::info!("Lease service stopped");
    Ok(())
}
