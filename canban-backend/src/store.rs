/// Authoritative board/task store behind the REST API.
///
/// Everything lives in memory behind one RwLock. When a snapshot file is
/// configured the whole store is rewritten to it (atomically) after every
/// mutation and read back on start.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use canban_core::types::{non_blank, Board, Priority, Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Board row without its tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardRow {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    order: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    boards: Vec<BoardRow>,
    tasks: Vec<Task>,
}

/// Body of `POST`/`PUT /api/boards`. Only `name` is required on create.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST`/`PUT /api/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub board_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Name is required")]
    NameRequired,

    #[error("Title is required")]
    TitleRequired,

    #[error("Body id {body} does not match path id {path}")]
    IdMismatch { path: String, body: String },

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Id already exists: {0}")]
    DuplicateId(String),

    #[error("Task references unknown board: {0}")]
    UnknownBoard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub struct ServerStore {
    data: RwLock<Snapshot>,
    data_file: Option<PathBuf>,
}

impl ServerStore {
    pub fn in_memory() -> Self {
        Self {
            data: RwLock::new(Snapshot::default()),
            data_file: None,
        }
    }

    /// Open a store persisted at `path`, loading it if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };
        log::info!(
            target: "canban.store",
            "Opened store {} ({} boards, {} tasks)",
            path.display(),
            data.boards.len(),
            data.tasks.len()
        );
        Ok(Self {
            data: RwLock::new(data),
            data_file: Some(path),
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `f` under the write lock, then snapshot on success.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        let result = f(&mut data)?;
        if let Some(path) = &self.data_file {
            if let Err(e) = Self::save(path, &data) {
                log::error!(target: "canban.store", "Failed to save {}: {}", path.display(), e);
            }
        }
        Ok(result)
    }

    fn save(path: &Path, data: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn assemble(data: &Snapshot, row: &BoardRow) -> Board {
        Board {
            id: row.id.clone(),
            name: row.name.clone(),
            created_at: row.created_at,
            order: row.order,
            tasks: data
                .tasks
                .iter()
                .filter(|t| t.board_id.as_deref() == Some(row.id.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// All boards with their tasks, newest first.
    pub fn list_boards(&self) -> Vec<Board> {
        let data = self.read();
        let mut rows: Vec<&BoardRow> = data.boards.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter().map(|row| Self::assemble(&data, row)).collect()
    }

    pub fn get_board(&self, id: &str) -> Option<Board> {
        let data = self.read();
        data.boards
            .iter()
            .find(|row| row.id == id)
            .map(|row| Self::assemble(&data, row))
    }

    pub fn create_board(&self, input: BoardInput) -> Result<Board, StoreError> {
        let name = input
            .name
            .as_deref()
            .and_then(non_blank)
            .ok_or(StoreError::NameRequired)?;
        self.mutate(|data| {
            let id = input
                .id
                .as_deref()
                .and_then(non_blank)
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            if data.boards.iter().any(|b| b.id == id) {
                return Err(StoreError::DuplicateId(id));
            }
            let row = BoardRow {
                id,
                name,
                created_at: input.created_at.unwrap_or_else(Utc::now),
                order: data.boards.iter().map(|b| b.order).max().map_or(0, |max| max + 1),
            };
            let board = Self::assemble(data, &row);
            data.boards.push(row);
            log::info!(target: "canban.store", "Created board {} ({:?})", board.id, board.name);
            Ok(board)
        })
    }

    /// Rename a board. A blank name leaves the board untouched.
    pub fn update_board(&self, id: &str, input: BoardInput) -> Result<(), StoreError> {
        let body_id = input.id.clone().unwrap_or_default();
        if body_id != id {
            return Err(StoreError::IdMismatch {
                path: id.to_string(),
                body: body_id,
            });
        }
        self.mutate(|data| {
            let row = data
                .boards
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| StoreError::BoardNotFound(id.to_string()))?;
            if let Some(name) = input.name.as_deref().and_then(non_blank) {
                row.name = name;
            }
            Ok(())
        })
    }

    /// Delete a board and every task that references it.
    pub fn delete_board(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|data| {
            let index = data
                .boards
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| StoreError::BoardNotFound(id.to_string()))?;
            data.boards.remove(index);
            let before = data.tasks.len();
            data.tasks.retain(|t| t.board_id.as_deref() != Some(id));
            log::info!(
                target: "canban.store",
                "Deleted board {} and {} tasks",
                id,
                before - data.tasks.len()
            );
            Ok(())
        })
    }

    /// Tasks, optionally restricted to one board.
    pub fn list_tasks(&self, board_id: Option<&str>) -> Vec<Task> {
        self.read()
            .tasks
            .iter()
            .filter(|t| board_id.map_or(true, |id| t.board_id.as_deref() == Some(id)))
            .cloned()
            .collect()
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.read().tasks.iter().find(|t| t.id == id).cloned()
    }

    fn build_task(data: &Snapshot, id: String, input: TaskInput) -> Result<Task, StoreError> {
        let title = input
            .title
            .as_deref()
            .and_then(non_blank)
            .ok_or(StoreError::TitleRequired)?;
        let board_id = input.board_id.as_deref().and_then(non_blank);
        if let Some(board_id) = &board_id {
            if !data.boards.iter().any(|b| &b.id == board_id) {
                return Err(StoreError::UnknownBoard(board_id.clone()));
            }
        }
        Ok(Task {
            id,
            title,
            description: input.description.as_deref().and_then(non_blank),
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            board_id,
        })
    }

    pub fn create_task(&self, input: TaskInput) -> Result<Task, StoreError> {
        self.mutate(|data| {
            let id = input
                .id
                .as_deref()
                .and_then(non_blank)
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            if data.tasks.iter().any(|t| t.id == id) {
                return Err(StoreError::DuplicateId(id));
            }
            let task = Self::build_task(data, id, input)?;
            data.tasks.push(task.clone());
            Ok(task)
        })
    }

    /// Replace every field of an existing task.
    pub fn update_task(&self, id: &str, input: TaskInput) -> Result<(), StoreError> {
        let body_id = input.id.clone().unwrap_or_default();
        if body_id != id {
            return Err(StoreError::IdMismatch {
                path: id.to_string(),
                body: body_id,
            });
        }
        self.mutate(|data| {
            let index = data
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
            let task = Self::build_task(data, id.to_string(), input)?;
            data.tasks[index] = task;
            Ok(())
        })
    }

    pub fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|data| {
            let index = data
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
            data.tasks.remove(index);
            Ok(())
        })
    }
}
