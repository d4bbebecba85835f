//! Task store errors.

use thiserror::Error;
use uuid::Uuid;

use super::types::TaskStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    /// Submission rejected before any state was created.
    #[error("{0}")]
    Validation(String),

    #[error("task {0} not found")]
    NotFound(Uuid),

    #[error("task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
    },
}
