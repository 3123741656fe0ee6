use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[async_trait]
pub trait TimeService: Send + Sync {
    async fn sleep(&self, duration: Duration);

    /// Wall-clock time used for lease bookkeeping.
    fn now(&self) -> DateTime<Utc>;
}
