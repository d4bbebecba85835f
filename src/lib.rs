//! Instrumented task-processing services library

pub mod config;
pub mod handlers;
pub mod http;
pub mod items;
pub mod lifecycle;
pub mod observability;
pub mod tasks;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
