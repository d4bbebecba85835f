//! Instrumentation middleware.
//! Observes every request, including those that reach the fallback.

use std::convert::Infallible;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::observability::instrument::{Instrumentation, RequestInfo, UNMATCHED_ROUTE};

pub const X_REQUEST_ID: &str = "x-request-id";

pub async fn instrument_request(
    State(instrumentation): State<Instrumentation>,
    request: Request,
    next: Next,
) -> Response {
    let info = request_info(&request);
    let result = instrumentation
        .observe(info, async move { Ok::<_, Infallible>(next.run(request).await) })
        .await;

    match result {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

/// Route pattern, raw path and request id of an incoming request.
pub fn request_info(request: &Request) -> RequestInfo {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    RequestInfo {
        method: request.method().to_string(),
        route,
        path: request.uri().path().to_string(),
        request_id,
    }
}
