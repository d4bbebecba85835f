use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use crate::handlers::parse_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::tasks::{NewTask, StatusSummary, Task};

pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(new_task) = body?;
    let task = state.tasks.submit(new_task.name, new_task.payload)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.tasks.list_tasks())
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id("task", &id)?;
    Ok(Json(state.tasks.get(id)?))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusSummary> {
    Json(state.tasks.get_status_summary())
}
