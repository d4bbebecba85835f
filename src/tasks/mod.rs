//! Task lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! POST /tasks
//!     → store.rs (validate, assign id, insert as pending)
//!     → inline: completed before returning
//!     → background: id queued → worker.rs completes it
//!
//! GET /status, GET /tasks
//!     → store.rs (snapshot under the store lock)
//! ```

pub mod error;
pub mod store;
pub mod types;
pub mod worker;

pub use error::TaskError;
pub use store::TaskStore;
pub use types::{NewTask, Payload, ProcessingMode, StatusSummary, Task, TaskStatus};
pub use worker::TaskWorker;
