/// Remote API Client seam.
///
/// One method per server operation. Every method fails soft: `None` is the
/// "unavailable" outcome and covers transport faults, non-success statuses
/// and undecodable bodies alike. Callers never see an error type from here.
/// Board/task bodies come back as raw JSON; `crate::normalize` turns them into
/// typed entities on the engine side.
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::types::{Priority, Task, TaskStatus};

/// Body of `POST /api/tasks`. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub board_id: Option<String>,
}

impl CreateTaskRequest {
    /// Request recreating `task` under `board_id` (used when migrating).
    pub fn from_task(task: &Task, board_id: &str) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            board_id: Some(board_id.to_string()),
        }
    }
}

#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// `GET /api/boards`: the full board list with nested tasks.
    async fn list_boards(&self) -> Option<Value>;

    /// `POST /api/boards`: the created board.
    async fn create_board(&self, name: &str) -> Option<Value>;

    /// `PUT /api/boards/{id}`.
    async fn update_board(&self, id: &str, name: &str) -> Option<()>;

    /// `DELETE /api/boards/{id}`. The server cascades to the board's tasks.
    async fn delete_board(&self, id: &str) -> Option<()>;

    /// `POST /api/tasks`: the created task.
    async fn create_task(&self, request: &CreateTaskRequest) -> Option<Value>;

    /// `PUT /api/tasks/{id}` with the full task.
    async fn update_task(&self, task: &Task) -> Option<()>;

    /// `DELETE /api/tasks/{id}`.
    async fn delete_task(&self, id: &str) -> Option<()>;
}

#[async_trait]
impl<T: RemoteApi + ?Sized> RemoteApi for Arc<T> {
    async fn list_boards(&self) -> Option<Value> {
        (**self).list_boards().await
    }

    async fn create_board(&self, name: &str) -> Option<Value> {
        (**self).create_board(name).await
    }

    async fn update_board(&self, id: &str, name: &str) -> Option<()> {
        (**self).update_board(id, name).await
    }

    async fn delete_board(&self, id: &str) -> Option<()> {
        (**self).delete_board(id).await
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Option<Value> {
        (**self).create_task(request).await
    }

    async fn update_task(&self, task: &Task) -> Option<()> {
        (**self).update_task(task).await
    }

    async fn delete_task(&self, id: &str) -> Option<()> {
        (**self).delete_task(id).await
    }
}

/// A remote that is never reachable. Runs the engine in local-only mode.
pub struct Offline;

#[async_trait]
impl RemoteApi for Offline {
    async fn list_boards(&self) -> Option<Value> {
        None
    }

    async fn create_board(&self, _name: &str) -> Option<Value> {
        None
    }

    async fn update_board(&self, _id: &str, _name: &str) -> Option<()> {
        None
    }

    async fn delete_board(&self, _id: &str) -> Option<()> {
        None
    }

    async fn create_task(&self, _request: &CreateTaskRequest) -> Option<Value> {
        None
    }

    async fn update_task(&self, _task: &Task) -> Option<()> {
        None
    }

    async fn delete_task(&self, _id: &str) -> Option<()> {
        None
    }
}
