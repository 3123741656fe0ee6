use super::counting_store::CountingLeaseStore;
use super::manual_clock::ManualTimeService;
use leasekeeper::application::services::LeaseService;
use leasekeeper::bootstrap::{self, LeaseServer};
use leasekeeper::config::LeaseSettings;
use leasekeeper::domain::ports::lease_store::LeaseStore;
use leasekeeper::domain::ports::task_spawner::TaskSpawner;
use leasekeeper::domain::ports::time_service::TimeService;
use leasekeeper::infrastructure::http::middleware::AppState;
use leasekeeper::infrastructure::persistence::InMemoryLeaseTable;
use leasekeeper::infrastructure::runtime::tokio::{TokioTaskSpawner, TokioTimeService};
use leasekeeper::LeaseClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<InMemoryLeaseTable>,
    pub clock: Option<Arc<ManualTimeService>>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl TestServer {
    pub fn client(&self) -> LeaseClient {
        LeaseClient::new(&self.base_url).expect("Failed to build lease client")
    }

    pub fn http(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Move the manual clock forward. Panics for servers on the real clock.
    pub fn advance(&self, by: Duration) {
        self.clock
            .as_ref()
            .expect("server was started on the real clock")
            .advance(by);
    }
}

/// Server with reference timings and a manual clock. The sweeper runs every
/// 50ms of real time so expiry is observable right after advancing the clock.
pub async fn setup_test_server() -> TestServer {
    let clock = Arc::new(ManualTimeService::new());
    let settings = LeaseSettings {
        sweep_interval: Duration::from_millis(50),
        ..LeaseSettings::default()
    };
    start(settings, clock.clone(), Some(clock)).await
}

/// Server on the real clock with custom timings.
pub async fn setup_real_time_server(settings: LeaseSettings) -> TestServer {
    start(settings, Arc::new(TokioTimeService::new()), None).await
}

/// Real-clock server whose HTTP handlers go through a [`CountingLeaseStore`],
/// so tests can see every heartbeat that reaches the service.
pub async fn setup_counting_server(settings: LeaseSettings) -> (TestServer, Arc<CountingLeaseStore>) {
    let server = build(settings, Arc::new(TokioTimeService::new()));
    let counting = Arc::new(CountingLeaseStore::new(
        server.store.clone() as Arc<dyn LeaseStore>
    ));
    let server = LeaseServer {
        state: AppState::new(LeaseService::new(counting.clone() as Arc<dyn LeaseStore>)),
        ..server
    };

    (spawn(server, None).await, counting)
}

async fn start(
    settings: LeaseSettings,
    time_service: Arc<dyn TimeService>,
    clock: Option<Arc<ManualTimeService>>,
) -> TestServer {
    spawn(build(settings, time_service), clock).await
}

fn build(settings: LeaseSettings, time_service: Arc<dyn TimeService>) -> LeaseServer {
    let task_spawner = Arc::new(TokioTaskSpawner::new()) as Arc<dyn TaskSpawner>;
    bootstrap::build_app_state(&settings, time_service, task_spawner)
        .expect("Invalid test lease settings")
}

async fn spawn(server: LeaseServer, clock: Option<Arc<ManualTimeService>>) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let store = server.store.clone();
    let shutdown = server.shutdown.clone();
    let task = tokio::spawn(async move {
        bootstrap::serve(listener, server)
            .await
            .expect("Test server failed");
    });

    TestServer {
        base_url,
        store,
        clock,
        shutdown,
        task,
    }
}

pub async fn teardown_test_server(server: TestServer) {
    server.shutdown.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), server.task).await;
}
