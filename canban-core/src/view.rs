/// View model consumed by front ends.
///
/// Built from the reconciled board list; front ends render it and turn user
/// gestures back into `Reconciler` calls. Nothing here touches storage.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::selection::Selection;
use crate::sync::{is_temp_id, Connectivity};
use crate::types::{Board, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub selected: bool,
    /// Not yet adopted by the server.
    pub local_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub status: TaskStatus,
    pub title: &'static str,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPanel {
    pub id: String,
    pub name: String,
    pub local_only: bool,
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    /// Every board, newest first.
    pub sidebar: Vec<SidebarEntry>,
    /// Boards to draw: the selected one, or all of them when nothing is selected.
    pub panels: Vec<BoardPanel>,
    pub offline: bool,
}

impl BoardView {
    pub fn build(boards: &[Board], selection: &Selection, connectivity: Connectivity) -> Self {
        let mut ordered: Vec<&Board> = boards.iter().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let sidebar = ordered
            .iter()
            .map(|b| SidebarEntry {
                id: b.id.clone(),
                name: b.name.clone(),
                created_at: b.created_at,
                selected: selection.is_selected(&b.id),
                local_only: is_temp_id(&b.id),
            })
            .collect();

        // A dangling selection renders nothing rather than everything.
        let panels = ordered
            .into_iter()
            .filter(|b| selection.board_id().map_or(true, |id| id == b.id))
            .map(panel)
            .collect();

        Self {
            sidebar,
            panels,
            offline: connectivity == Connectivity::Offline,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sidebar.is_empty()
    }
}

fn panel(board: &Board) -> BoardPanel {
    BoardPanel {
        id: board.id.clone(),
        name: board.name.clone(),
        local_only: is_temp_id(&board.id),
        columns: TaskStatus::ALL
            .iter()
            .map(|&status| ColumnView {
                status,
                title: status.label(),
                tasks: board.tasks_in(status).cloned().collect(),
            })
            .collect(),
    }
}
