use crate::types::Board;

/// Which board the front end focuses on. `None` renders every board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    board_id: Option<String>,
}

impl Selection {
    pub fn new(board_id: Option<String>) -> Self {
        Self { board_id }
    }

    pub fn board_id(&self) -> Option<&str> {
        self.board_id.as_deref()
    }

    pub fn is_selected(&self, board_id: &str) -> bool {
        self.board_id.as_deref() == Some(board_id)
    }

    pub fn select(&mut self, board_id: impl Into<String>) {
        self.board_id = Some(board_id.into());
    }

    pub fn clear(&mut self) {
        self.board_id = None;
    }

    /// Re-point the selection after `deleted_id` was removed.
    /// Returns true when the selection changed.
    pub fn after_delete(&mut self, deleted_id: &str, remaining: &[Board]) -> bool {
        if !self.is_selected(deleted_id) {
            return false;
        }
        self.board_id = remaining.first().map(|b| b.id.clone());
        true
    }
}
