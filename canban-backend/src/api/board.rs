use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use canban_core::types::Board;

use super::{not_found, store_error, ApiError};
use crate::state::AppState;
use crate::store::BoardInput;

pub async fn list_boards(State(state): State<AppState>) -> Json<Vec<Board>> {
    Json(state.store.list_boards())
}

pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<Board>, ApiError> {
    state
        .store
        .get_board(&board_id)
        .map(Json)
        .ok_or_else(|| not_found("canban.api.get_board", format!("Board not found: {}", board_id)))
}

pub async fn create_board(
    State(state): State<AppState>,
    Json(body): Json<BoardInput>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let board = state
        .store
        .create_board(body)
        .map_err(|e| store_error("canban.api.create_board", e))?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn update_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Json(body): Json<BoardInput>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .update_board(&board_id, body)
        .map_err(|e| store_error("canban.api.update_board", e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_board(&board_id)
        .map_err(|e| store_error("canban.api.delete_board", e))?;
    Ok(StatusCode::NO_CONTENT)
}
