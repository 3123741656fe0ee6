use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leasekeeper::domain::ports::time_service::TimeService;
use std::sync::Mutex;
use std::time::Duration;

/// Clock whose wall time only moves when a test says so.
/// Sleeping still waits in real time so background loops keep ticking.
pub struct ManualTimeService {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTimeService {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

#[async_trait]
impl TimeService for ManualTimeService {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
