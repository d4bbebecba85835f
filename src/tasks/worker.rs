//! Background task processing.
//!
//! Used when the store runs in [`ProcessingMode::Background`](super::types::ProcessingMode):
//! `submit` enqueues the id of a `pending` task and this loop completes it.

use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use super::store::TaskStore;
use super::types::TaskStatus;

/// Consumer side of the background queue.
pub struct TaskWorker {
    store: TaskStore,
    queue: mpsc::UnboundedReceiver<Uuid>,
}

impl TaskWorker {
    pub(crate) fn new(store: TaskStore, queue: mpsc::UnboundedReceiver<Uuid>) -> Self {
        Self { store, queue }
    }

    /// Process queued tasks until every submitter is gone.
    ///
    /// Shutdown does not stop the worker: the server may still accept
    /// submissions while draining, so queued ids are processed until the
    /// channel closes.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Task worker started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Task worker draining queue");
                    break;
                }
                next = self.queue.recv() => match next {
                    Some(id) => self.process(id),
                    None => {
                        tracing::info!("Task queue closed");
                        return;
                    }
                },
            }
        }

        let mut drained = 0usize;
        while let Some(id) = self.queue.recv().await {
            self.process(id);
            drained += 1;
        }
        tracing::info!(drained, "Task worker stopped");
    }

    /// Execution is trivial and always succeeds.
    fn process(&self, id: Uuid) {
        match self.store.transition(id, TaskStatus::Completed) {
            Ok(task) => tracing::debug!(task_id = %id, name = %task.name, "Task completed"),
            Err(e) => tracing::error!(task_id = %id, error = %e, "Task processing failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use crate::observability::metrics::Metrics;
    use std::time::Duration;

    async fn wait_for_completed(store: &TaskStore, expected: usize) {
        for _ in 0..100 {
            if store.get_status_summary().completed == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("worker did not complete {} tasks", expected);
    }

    #[tokio::test]
    async fn test_worker_completes_queued_tasks() {
        let (store, worker) = TaskStore::background(Metrics::new("worker", &[0.1]).unwrap());
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(worker.run(shutdown.subscribe()));

        for i in 0..5 {
            store.submit(format!("job-{}", i), None).unwrap();
        }
        wait_for_completed(&store, 5).await;

        let summary = store.get_status_summary();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.pending, 0);
        assert!(store.list_tasks().iter().all(|t| t.status == TaskStatus::Completed));

        shutdown.trigger();
        drop(store);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop after shutdown once the queue closes")
            .unwrap();
    }

    #[tokio::test]
    async fn test_tasks_accepted_after_shutdown_still_complete() {
        let metrics = Metrics::new("worker", &[0.1]).unwrap();
        let (store, worker) = TaskStore::background(metrics.clone());
        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        shutdown.trigger();

        // Submitted while the server would still be draining connections.
        for i in 0..3 {
            let task = store.submit(format!("late-{}", i), None).unwrap();
            assert_eq!(task.status, TaskStatus::Pending);
        }

        let handle = tokio::spawn(worker.run(receiver));
        drop(store);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should exit once drained")
            .unwrap();

        let text = metrics.render();
        assert!(text.contains(r#"worker_tasks_processed_total{status="completed"} 3"#));
        assert!(text.contains("worker_active_tasks 0"));
    }

    #[tokio::test]
    async fn test_worker_exits_when_store_dropped() {
        let (store, worker) = TaskStore::background(Metrics::new("worker", &[0.1]).unwrap());
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(worker.run(shutdown.subscribe()));

        drop(store);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop once the queue closes")
            .unwrap();
    }
}
