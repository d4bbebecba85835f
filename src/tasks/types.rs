//! Task data model and lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Opaque caller-supplied data attached to a task. Stored verbatim.
pub type Payload = Map<String, Value>;

/// Lifecycle state of a task.
///
/// # State Transitions
/// ```text
/// Pending → Processing → Completed
///    │          └──────→ Failed
///    ├─────────────────→ Completed
///    └─────────────────→ Failed
/// ```
///
/// `Processing` and `Failed` are reserved: the current processing step
/// completes tasks directly from `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Completed)
                | (Pending, Failed)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of background work tracked by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub status: TaskStatus,
    pub payload: Option<Payload>,
    pub created_at: DateTime<Utc>,
}

/// Body of a task submission.
///
/// Fields default so that a missing `name` surfaces as a validation error
/// rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewTask {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// Point-in-time counts. `pending + completed == total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSummary {
    #[serde(rename = "total_tasks")]
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

/// How submitted tasks reach `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Completion happens before `submit` returns.
    #[default]
    Inline,
    /// `submit` enqueues; a [`TaskWorker`](super::worker::TaskWorker) completes.
    Background,
}
