//! HTTP client for the API and worker services.

pub mod client;

pub use client::{ClientError, ItemRequest, ServiceClient, TaskRequest};
