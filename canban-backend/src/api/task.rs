use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use canban_core::types::Task;
use serde::Deserialize;

use super::{not_found, store_error, ApiError};
use crate::state::AppState;
use crate::store::TaskInput;

#[derive(Deserialize)]
pub struct TaskQuery {
    #[serde(rename = "boardId")]
    board_id: Option<String>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Json<Vec<Task>> {
    let board_id = query.board_id.as_deref().filter(|id| !id.trim().is_empty());
    Json(state.store.list_tasks(board_id))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    state
        .store
        .get_task(&task_id)
        .map(Json)
        .ok_or_else(|| not_found("canban.api.get_task", format!("Task not found: {}", task_id)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<TaskInput>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state
        .store
        .create_task(body)
        .map_err(|e| store_error("canban.api.create_task", e))?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<TaskInput>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .update_task(&task_id, body)
        .map_err(|e| store_error("canban.api.update_task", e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_task(&task_id)
        .map_err(|e| store_error("canban.api.delete_task", e))?;
    Ok(StatusCode::NO_CONTENT)
}
