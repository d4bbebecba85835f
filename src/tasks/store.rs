//! In-memory task registry.
//!
//! # Responsibilities
//! - Validate and accept task submissions
//! - Assign unique ids and keep submission order
//! - Drive the lifecycle state machine and keep aggregate counts in step
//! - Publish the active-task gauge on every transition
//!
//! # Design Decisions
//! - One mutex guards tasks, index and counts; every mutation is a single
//!   critical section so no observer sees a task without its counters
//! - Reads clone a snapshot under the same lock; no live views escape
//! - The lock is never held across an `.await`

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::TaskError;
use super::types::{Payload, ProcessingMode, StatusSummary, Task, TaskStatus};
use super::worker::TaskWorker;
use crate::observability::metrics::Metrics;

#[derive(Debug, Default)]
struct StatusCounts {
    pending: usize,
    processing: usize,
    completed: usize,
    failed: usize,
}

impl StatusCounts {
    fn slot(&mut self, status: TaskStatus) -> &mut usize {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::Processing => &mut self.processing,
            TaskStatus::Completed => &mut self.completed,
            TaskStatus::Failed => &mut self.failed,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Tasks in submission order.
    tasks: Vec<Task>,
    /// id -> position in `tasks`.
    index: HashMap<Uuid, usize>,
    counts: StatusCounts,
}

impl StoreInner {
    fn fresh_id(&self) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert(&mut self, task: Task) {
        *self.counts.slot(task.status) += 1;
        self.index.insert(task.id, self.tasks.len());
        self.tasks.push(task);
    }
}

/// Shared handle to the task registry. Cloning is cheap.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Mutex<StoreInner>>,
    metrics: Metrics,
    /// Present in background mode: ids waiting for the worker.
    queue: Option<mpsc::UnboundedSender<Uuid>>,
}

impl TaskStore {
    /// Create a store that completes tasks inline, before `submit` returns.
    pub fn new(metrics: Metrics) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner::default())),
            metrics,
            queue: None,
        }
    }

    /// Create a store whose submissions are completed by the returned worker.
    pub fn background(metrics: Metrics) -> (Self, TaskWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut store = Self::new(metrics);
        // The worker's handle has no sender, so the channel closes once
        // every submitting handle is dropped.
        let worker = TaskWorker::new(store.clone(), rx);
        store.queue = Some(tx);
        (store, worker)
    }

    /// Create a store for the given mode; a worker is returned only for
    /// [`ProcessingMode::Background`].
    pub fn with_mode(mode: ProcessingMode, metrics: Metrics) -> (Self, Option<TaskWorker>) {
        match mode {
            ProcessingMode::Inline => (Self::new(metrics), None),
            ProcessingMode::Background => {
                let (store, worker) = Self::background(metrics);
                (store, Some(worker))
            }
        }
    }

    pub fn mode(&self) -> ProcessingMode {
        if self.queue.is_some() {
            ProcessingMode::Background
        } else {
            ProcessingMode::Inline
        }
    }

    /// Submit a new task.
    ///
    /// In inline mode the returned task is already `completed`; in background
    /// mode it is `pending` and has been queued for the worker.
    pub fn submit(&self, name: impl Into<String>, payload: Option<Value>) -> Result<Task, TaskError> {
        let name = name.into();
        let payload = validate_submission(&name, payload)?;

        let task = {
            let mut inner = self.lock();
            let id = inner.fresh_id();
            inner.insert(Task {
                id,
                name,
                status: TaskStatus::Pending,
                payload,
                created_at: Utc::now(),
            });
            self.metrics.record_task_submitted();
            self.metrics.set_active_tasks(inner.counts.pending);

            match &self.queue {
                None => self.transition_locked(&mut inner, id, TaskStatus::Completed)?,
                Some(queue) => {
                    if queue.send(id).is_err() {
                        tracing::warn!(task_id = %id, "Task worker is gone, task stays pending");
                    }
                    inner.tasks[inner.tasks.len() - 1].clone()
                }
            }
        };

        tracing::info!(
            task_id = %task.id,
            name = %task.name,
            status = %task.status,
            "Task created"
        );
        Ok(task)
    }

    /// Aggregate counts at a single point in time.
    pub fn get_status_summary(&self) -> StatusSummary {
        let inner = self.lock();
        StatusSummary {
            total: inner.tasks.len(),
            pending: inner.counts.pending,
            completed: inner.counts.completed,
        }
    }

    /// All tasks in submission order, as an independent snapshot.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn get(&self, id: Uuid) -> Result<Task, TaskError> {
        let inner = self.lock();
        inner
            .index
            .get(&id)
            .map(|&idx| inner.tasks[idx].clone())
            .ok_or(TaskError::NotFound(id))
    }

    /// Move a task to `to` if the state machine allows it.
    pub(crate) fn transition(&self, id: Uuid, to: TaskStatus) -> Result<Task, TaskError> {
        let mut inner = self.lock();
        self.transition_locked(&mut inner, id, to)
    }

    fn transition_locked(
        &self,
        inner: &mut StoreInner,
        id: Uuid,
        to: TaskStatus,
    ) -> Result<Task, TaskError> {
        let idx = *inner.index.get(&id).ok_or(TaskError::NotFound(id))?;
        let from = inner.tasks[idx].status;
        if !from.can_transition_to(to) {
            return Err(TaskError::InvalidTransition { id, from, to });
        }

        inner.tasks[idx].status = to;
        *inner.counts.slot(from) -= 1;
        *inner.counts.slot(to) += 1;

        if to.is_terminal() {
            self.metrics.record_task_processed(to);
        }
        self.metrics.set_active_tasks(inner.counts.pending);

        Ok(inner.tasks[idx].clone())
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_submission(name: &str, payload: Option<Value>) -> Result<Option<Payload>, TaskError> {
    if name.trim().is_empty() {
        return Err(TaskError::Validation("task name must not be empty".to_string()));
    }

    match payload {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(TaskError::Validation(format!(
            "payload must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
