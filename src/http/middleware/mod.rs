//! Request middleware.

pub mod instrument;

pub use instrument::{instrument_request, request_info, X_REQUEST_ID};
