use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

mod board;
mod task;

use crate::state::AppState;
use crate::store::StoreError;

/// Axum REST API routes.
///
///   GET    /api/boards            -> all boards with nested tasks, newest first
///   POST   /api/boards            -> create board
///   GET    /api/boards/:id        -> one board
///   PUT    /api/boards/:id        -> rename board
///   DELETE /api/boards/:id        -> delete board and its tasks
///   GET    /api/tasks?boardId=... -> tasks, optionally for one board
///   POST   /api/tasks             -> create task
///   GET    /api/tasks/:id         -> one task
///   PUT    /api/tasks/:id         -> replace task
///   DELETE /api/tasks/:id         -> delete task
///   GET    /status                -> health check
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/boards",
            get(board::list_boards).post(board::create_board),
        )
        .route(
            "/api/boards/{board_id}",
            get(board::get_board)
                .put(board::update_board)
                .delete(board::delete_board),
        )
        .route("/api/tasks", get(task::list_tasks).post(task::create_task))
        .route(
            "/api/tasks/{task_id}",
            get(task::get_task)
                .put(task::update_task)
                .delete(task::delete_task),
        )
        .route("/status", get(status))
}

async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "running",
        "port": state.port,
        "bind_address": state.bind_address,
    }))
}

// ── Shared types and helpers used across sub-modules ────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn status_for(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NameRequired
        | StoreError::TitleRequired
        | StoreError::IdMismatch { .. }
        | StoreError::DuplicateId(_)
        | StoreError::UnknownBoard(_) => StatusCode::BAD_REQUEST,
        StoreError::BoardNotFound(_) | StoreError::TaskNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Io(_) | StoreError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_error(target: &'static str, error: StoreError) -> ApiError {
    let status = status_for(&error);
    let error = error.to_string();
    log_api_issue(status, target, &error);
    (status, Json(ErrorResponse { error }))
}

fn not_found(target: &'static str, message: String) -> ApiError {
    log_api_issue(StatusCode::NOT_FOUND, target, &message);
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message }))
}

fn log_api_issue(status: StatusCode, target: &'static str, message: impl AsRef<str>) {
    let message = message.as_ref();
    if status.is_server_error() {
        log::error!(target: target, "{}", message);
    } else {
        log::warn!(target: target, "{}", message);
    }
}
