/// Plain-text rendering of a `BoardView`.
use std::fmt::Write;

use canban_core::view::{BoardPanel, BoardView};

const LOCAL_MARK: &str = " (local only)";

pub fn render(view: &BoardView) -> String {
    let mut out = String::new();
    if view.offline {
        out.push_str("[offline] server unreachable, showing cached boards\n\n");
    }
    if view.is_empty() {
        out.push_str("No boards yet. Create one with `canban board add <name>`.\n");
        return out;
    }

    out.push_str("Boards:\n");
    for entry in &view.sidebar {
        let marker = if entry.selected { '*' } else { ' ' };
        let _ = writeln!(
            out,
            " {} {}  {}{}",
            marker,
            entry.name,
            entry.id,
            if entry.local_only { LOCAL_MARK } else { "" }
        );
    }

    for panel in &view.panels {
        out.push('\n');
        render_panel(&mut out, panel);
    }
    out
}

fn render_panel(out: &mut String, panel: &BoardPanel) {
    let _ = writeln!(
        out,
        "== {}{} ==",
        panel.name,
        if panel.local_only { LOCAL_MARK } else { "" }
    );
    for column in &panel.columns {
        let _ = writeln!(out, "  {} ({})", column.title, column.tasks.len());
        for task in &column.tasks {
            let _ = writeln!(out, "    - [{}] {}  {}", task.priority, task.title, task.id);
            if let Some(description) = &task.description {
                let _ = writeln!(out, "        {}", description);
            }
        }
    }
}
