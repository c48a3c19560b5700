/// The client's Local Cache Store.
///
/// Holds the last known board list and the selected board id under fixed,
/// versioned keys. No method here fails: a corrupt or unreadable document reads
/// as empty, and a failed write is logged and dropped (the caller's in-memory
/// list stays the cache-of-record for the session).
use crate::normalize;
use crate::types::Board;

use super::KeyValueStore;

pub const BOARDS_KEY: &str = "kanban.boards.v1";
pub const SELECTED_BOARD_KEY: &str = "kanban.selectedBoardId.v1";

pub struct LocalCache<S> {
    store: S,
}

impl<S: KeyValueStore> LocalCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Full board list, empty when absent or corrupt.
    pub fn read_boards(&self) -> Vec<Board> {
        let raw = match self.store.get(BOARDS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!(target: "canban.cache", "Failed to read {}: {}", BOARDS_KEY, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Board>>(&raw) {
            Ok(boards) => boards,
            Err(strict_err) => {
                // Documents written by older clients use the server's loose
                // shape (`created`, missing priorities).
                let legacy = serde_json::from_str::<serde_json::Value>(&raw)
                    .ok()
                    .and_then(|value| normalize::normalize_board_list(&value));
                match legacy {
                    Some(boards) => {
                        log::info!(
                            target: "canban.cache",
                            "Read legacy board document ({} boards)",
                            boards.len()
                        );
                        boards
                    }
                    None => {
                        log::warn!(
                            target: "canban.cache",
                            "Discarding corrupt {} document: {}",
                            BOARDS_KEY,
                            strict_err
                        );
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Replace the stored board list.
    pub fn write_boards(&self, boards: &[Board]) {
        let json = match serde_json::to_string(boards) {
            Ok(json) => json,
            Err(e) => {
                log::error!(target: "canban.cache", "Failed to serialize boards: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(BOARDS_KEY, &json) {
            log::error!(target: "canban.cache", "Failed to write {}: {}", BOARDS_KEY, e);
        }
    }

    pub fn read_selection(&self) -> Option<String> {
        match self.store.get(SELECTED_BOARD_KEY) {
            Ok(value) => value.filter(|id| !id.trim().is_empty()),
            Err(e) => {
                log::warn!(target: "canban.cache", "Failed to read {}: {}", SELECTED_BOARD_KEY, e);
                None
            }
        }
    }

    pub fn write_selection(&self, board_id: Option<&str>) {
        let result = match board_id {
            Some(id) => self.store.set(SELECTED_BOARD_KEY, id),
            None => self.store.remove(SELECTED_BOARD_KEY),
        };
        if let Err(e) = result {
            log::error!(target: "canban.cache", "Failed to write {}: {}", SELECTED_BOARD_KEY, e);
        }
    }
}
