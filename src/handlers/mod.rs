pub mod items;
pub mod system;
pub mod tasks;

use axum::{routing::get, Router};
use uuid::Uuid;

use crate::config::ServiceKind;
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// Parse a path id. An id that is not a UUID cannot name anything, so it is
/// reported as missing rather than malformed.
pub(crate) fn parse_id(kind: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{} {} not found", kind, raw)))
}

/// Routes shared by both services.
pub fn system_routes(metrics_enabled: bool) -> Router<AppState> {
    let router = Router::new().route("/health", get(system::health));
    if metrics_enabled {
        router.route("/metrics", get(system::metrics))
    } else {
        router
    }
}

/// Routes specific to one service.
pub fn service_routes(service: ServiceKind) -> Router<AppState> {
    match service {
        ServiceKind::Api => Router::new()
            .route("/items", get(items::list_items).post(items::create_item))
            .route("/items/{id}", get(items::get_item).delete(items::delete_item)),
        ServiceKind::Worker => Router::new()
            .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
            .route("/tasks/{id}", get(tasks::get_task))
            .route("/status", get(tasks::get_status)),
    }
}
