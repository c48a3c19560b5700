/// Optimistic mutations.
///
/// Each operation runs the same steps in order:
///   1. validate against the cache (reject with no writes on failure)
///   2. apply the change to an in-memory copy of the cache
///   3. attempt the remote call
///   4. adopt the copy for the session and persist it, whatever the remote said
///   5. run a fresh `load` so the caller renders the merged truth
///
/// A remote failure therefore still yields a responsive local edit.
// TODO: queue unconfirmed writes and replay them on the next successful load;
// today an authoritative server list silently replaces them.
use chrono::Utc;

use crate::normalize;
use crate::remote::{CreateTaskRequest, RemoteApi};
use crate::storage::KeyValueStore;
use crate::types::{next_order, non_blank, Board, NewTask, Task, TaskPatch, TaskStatus};

use super::{temp_id, Applied, Reconciler, SyncError, TARGET};

impl<S: KeyValueStore, R: RemoteApi> Reconciler<S, R> {
    async fn finish<T>(&mut self, boards: Vec<Board>, value: T, confirmed: bool) -> Applied<T> {
        self.commit(boards);
        let boards = self.load().await;
        Applied {
            value,
            confirmed,
            boards,
        }
    }

    /// Create a board and select it. Uses the server's id when the server
    /// adopts it, a temporary id otherwise.
    pub async fn create_board(&mut self, name: &str) -> Result<Applied<Board>, SyncError> {
        let name = non_blank(name).ok_or(SyncError::EmptyName)?;

        let created = self
            .remote
            .create_board(&name)
            .await
            .as_ref()
            .and_then(normalize::normalize_board);
        let confirmed = created.is_some();

        let mut boards = self.boards.clone();
        let board = match created {
            Some(mut board) => {
                if board.name.is_empty() {
                    board.name = name;
                }
                board
            }
            None => {
                log::info!(target: TARGET, "Creating board {:?} locally only", name);
                Board {
                    id: temp_id(),
                    name,
                    created_at: Utc::now(),
                    order: next_order(&boards),
                    tasks: Vec::new(),
                }
            }
        };
        boards.retain(|b| b.id != board.id);
        boards.push(board.clone());

        self.selection.select(board.id.clone());
        self.persist_selection();

        Ok(self.finish(boards, board, confirmed).await)
    }

    pub async fn rename_board(
        &mut self,
        board_id: &str,
        name: &str,
    ) -> Result<Applied<Board>, SyncError> {
        let name = non_blank(name).ok_or(SyncError::EmptyName)?;
        let mut boards = self.boards.clone();
        let board = boards
            .iter_mut()
            .find(|b| b.id == board_id)
            .ok_or_else(|| SyncError::BoardNotFound(board_id.to_string()))?;
        board.name = name;
        let board = board.clone();

        let confirmed = self.remote.update_board(&board.id, &board.name).await.is_some();
        Ok(self.finish(boards, board, confirmed).await)
    }

    /// Delete a board and, locally as on the server, every task that
    /// references it. The local cascade runs even when the remote call fails.
    pub async fn delete_board(&mut self, board_id: &str) -> Applied<Option<Board>> {
        let mut boards = self.boards.clone();
        let removed = boards
            .iter()
            .position(|b| b.id == board_id)
            .map(|index| boards.remove(index));
        for board in &mut boards {
            board
                .tasks
                .retain(|t| t.board_id.as_deref() != Some(board_id));
        }

        let confirmed = self.remote.delete_board(board_id).await.is_some();

        if self.selection.after_delete(board_id, &boards) {
            self.persist_selection();
        }
        self.finish(boards, removed, confirmed).await
    }

    pub async fn create_task(
        &mut self,
        board_id: &str,
        new_task: NewTask,
    ) -> Result<Applied<Task>, SyncError> {
        let title = non_blank(&new_task.title).ok_or(SyncError::EmptyTitle)?;
        let mut boards = self.boards.clone();
        let index = boards
            .iter()
            .position(|b| b.id == board_id)
            .ok_or_else(|| SyncError::BoardNotFound(board_id.to_string()))?;

        let request = CreateTaskRequest {
            title,
            description: new_task.description.as_deref().and_then(non_blank),
            status: TaskStatus::Todo,
            priority: new_task.priority,
            board_id: Some(board_id.to_string()),
        };
        let created = self
            .remote
            .create_task(&request)
            .await
            .as_ref()
            .and_then(|value| normalize::normalize_task(value, Some(board_id)));
        let confirmed = created.is_some();

        let task = created.unwrap_or_else(|| Task {
            id: temp_id(),
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            board_id: request.board_id,
        });
        boards[index].tasks.push(task.clone());

        Ok(self.finish(boards, task, confirmed).await)
    }

    pub async fn update_task(
        &mut self,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Applied<Task>, SyncError> {
        let title = match patch.title.as_deref() {
            Some(raw) => Some(non_blank(raw).ok_or(SyncError::EmptyTitle)?),
            None => None,
        };
        let mut boards = self.boards.clone();
        let task = boards
            .iter_mut()
            .flat_map(|b| b.tasks.iter_mut())
            .find(|t| t.id == task_id)
            .ok_or_else(|| SyncError::TaskNotFound(task_id.to_string()))?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description.as_deref() {
            task.description = non_blank(description);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        let task = task.clone();

        let confirmed = self.remote.update_task(&task).await.is_some();
        Ok(self.finish(boards, task, confirmed).await)
    }

    pub async fn delete_task(&mut self, task_id: &str) -> Applied<Option<Task>> {
        let mut boards = self.boards.clone();
        let mut removed = None;
        for board in &mut boards {
            if let Some(index) = board.tasks.iter().position(|t| t.id == task_id) {
                removed = Some(board.tasks.remove(index));
            }
        }

        let confirmed = self.remote.delete_task(task_id).await.is_some();
        self.finish(boards, removed, confirmed).await
    }

    /// Drag-and-drop: move a task to `status` on `board_id`. The task is
    /// appended to the destination; columns keep insertion order only.
    pub async fn move_task(
        &mut self,
        task_id: &str,
        board_id: &str,
        status: TaskStatus,
    ) -> Result<Applied<Task>, SyncError> {
        let mut boards = self.boards.clone();
        let dest = boards
            .iter()
            .position(|b| b.id == board_id)
            .ok_or_else(|| SyncError::BoardNotFound(board_id.to_string()))?;
        let (source, index) = boards
            .iter()
            .enumerate()
            .find_map(|(bi, b)| {
                b.tasks
                    .iter()
                    .position(|t| t.id == task_id)
                    .map(|ti| (bi, ti))
            })
            .ok_or_else(|| SyncError::TaskNotFound(task_id.to_string()))?;

        let mut task = boards[source].tasks.remove(index);
        task.status = status;
        task.board_id = Some(board_id.to_string());
        boards[dest].tasks.push(task.clone());

        let confirmed = self.remote.update_task(&task).await.is_some();
        Ok(self.finish(boards, task, confirmed).await)
    }
}
