//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request id (generated when absent, echoed on the response)
//!     → middleware/instrument.rs (metrics, access log, span)
//!     → handlers (items or tasks)
//!     → response.rs (error mapping)
//!     → Send to client
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{AppState, HttpServer};
