/// Reconciliation engine: keeps the Local Cache Store converging toward the
/// server's board list.
///
/// The engine's board list is the cache-of-record for the session and is
/// mirrored to the Local Cache Store after every change; a failed write only
/// costs durability. The server is a
/// best-effort mirror: when it answers with a non-empty list it wins outright,
/// when it answers empty while the cache holds boards the cache is migrated
/// into it once, and when it does not answer the cache is served unchanged.
///
/// Mutations are optimistic (see `ops`): local tentative apply, remote
/// attempt, unconditional local persist, then a fresh `load`.
mod migrate;
mod ops;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use crate::normalize;
use crate::remote::RemoteApi;
use crate::selection::Selection;
use crate::storage::{KeyValueStore, LocalCache};
use crate::types::Board;

const TARGET: &str = "canban.sync";

/// Outcome of the most recent `listBoards` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// No load has run yet.
    #[default]
    Unknown,
    Online,
    /// Edits apply locally but are not confirmed remotely.
    Offline,
}

/// Result of an accepted mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    /// The entity as stored locally.
    pub value: T,
    /// Whether the server acknowledged the write.
    pub confirmed: bool,
    /// Board list produced by the follow-up load.
    pub boards: Vec<Board>,
}

/// Rejected mutations. Nothing was written locally or remotely.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("Board name must not be empty")]
    EmptyName,

    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

pub struct Reconciler<S, R> {
    cache: LocalCache<S>,
    remote: R,
    boards: Vec<Board>,
    selection: Selection,
    connectivity: Connectivity,
}

impl<S: KeyValueStore, R: RemoteApi> Reconciler<S, R> {
    /// Build an engine over `cache`, restoring the persisted selection.
    pub fn new(cache: LocalCache<S>, remote: R) -> Self {
        let selection = Selection::new(cache.read_selection());
        let boards = cache.read_boards();
        Self {
            cache,
            remote,
            boards,
            selection,
            connectivity: Connectivity::Unknown,
        }
    }

    pub fn cache(&self) -> &LocalCache<S> {
        &self.cache
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Current board list, including edits the cache failed to persist.
    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Focus a single board. The board must be in the cache.
    pub fn select_board(&mut self, board_id: &str) -> Result<(), SyncError> {
        if !self.boards.iter().any(|b| b.id == board_id) {
            return Err(SyncError::BoardNotFound(board_id.to_string()));
        }
        self.selection.select(board_id);
        self.persist_selection();
        Ok(())
    }

    /// Drop the focus so every board renders.
    pub fn show_all_boards(&mut self) {
        self.selection.clear();
        self.persist_selection();
    }

    fn persist_selection(&self) {
        self.cache.write_selection(self.selection.board_id());
    }

    /// Adopt `boards` for the session and mirror them to the cache.
    fn commit(&mut self, boards: Vec<Board>) -> Vec<Board> {
        self.cache.write_boards(&boards);
        self.boards = boards;
        self.boards.clone()
    }

    /// Reconcile the cache with the server and return the list to render.
    /// Never fails: the worst case is the unchanged cache.
    pub async fn load(&mut self) -> Vec<Board> {
        let local = self.boards.clone();

        let Some(server) = self.fetch_server_boards().await else {
            self.connectivity = Connectivity::Offline;
            log::info!(
                target: TARGET,
                "Server unavailable, serving {} cached boards",
                local.len()
            );
            return local;
        };
        self.connectivity = Connectivity::Online;

        if !server.is_empty() {
            return self.commit(server);
        }

        if local.is_empty() {
            return self.commit(Vec::new());
        }

        self.migrate_local(local).await
    }

    /// `listBoards` + normalization. A body that is not a board array counts
    /// as unavailable.
    async fn fetch_server_boards(&self) -> Option<Vec<Board>> {
        let body = self.remote.list_boards().await?;
        let boards = normalize::normalize_board_list(&body);
        if boards.is_none() {
            log::warn!(target: TARGET, "listBoards returned a non-array body");
        }
        boards
    }
}

static TEMP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Locally generated identifier for an entity the server has not adopted.
pub fn temp_id() -> String {
    let seq = TEMP_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut hasher = Sha256::new();
    hasher.update(seq.to_le_bytes());
    hasher.update(ts.to_le_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("t-{}", &digest[..7])
}

/// Whether `id` came from `temp_id` (entity not yet adopted by the server).
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with("t-")
}
