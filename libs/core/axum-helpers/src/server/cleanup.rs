use futures::future::{BoxFuture, join_all};
use std::future::Future;
use tracing::info;

/// Named shutdown tasks run concurrently once the server has stopped
/// and in-flight requests have drained.
///
/// ```ignore
/// let mut cleanup = CleanupCoordinator::new();
/// cleanup.add_task("mongodb", async move { client.shutdown().await });
/// cleanup.add_task("redis", async move { drop(cache) });
/// create_production_app(app, &server, Duration::from_secs(30), cleanup.run()).await?;
/// ```
#[derive(Default)]
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, BoxFuture<'static, ()>)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. Nothing runs until [`run`](Self::run) is awaited.
    pub fn add_task<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((name, Box::pin(task)));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub async fn run(self) {
        info!(tasks = self.tasks.len(), "Running cleanup tasks");

        join_all(self.tasks.into_iter().map(|(name, task)| async move {
            task.await;
            info!(task = name, "Cleanup task completed");
        }))
        .await;
    }
}
