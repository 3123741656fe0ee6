use futures::future::BoxFuture;

/// Spawns the long-running background loops (expiry sweeper, lease renewal).
///
/// `name` only labels the task in logs.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, name: &'static str, future: BoxFuture<'static, ()>);
}
