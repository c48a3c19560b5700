/// Boundary normalization of server payloads.
///
/// The server has emitted several field spellings over its lifetime
/// (PascalCase from an ORM mapping, `createdDateTime` before the
/// rename to `createdAt`). Everything crossing into the engine goes through
/// this module exactly once; the rest of the crate only sees `Board`/`Task`.
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::types::{Board, Priority, Task, TaskStatus};

/// Canonical field -> accepted spellings, in lookup order.
pub const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("id", &["id", "Id"]),
    ("name", &["name", "Name"]),
    (
        "createdAt",
        &["createdAt", "createdDateTime", "CreatedDateTime", "created", "Created"],
    ),
    ("order", &["order", "Order"]),
    ("tasks", &["tasks", "Tasks"]),
    ("title", &["title", "Title"]),
    ("description", &["description", "Description"]),
    ("status", &["status", "Status"]),
    ("priority", &["priority", "Priority"]),
    ("boardId", &["boardId", "BoardId"]),
];

fn aliases(canonical: &str) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, spellings)| *spellings)
        .unwrap_or(&[])
}

/// First present spelling of `canonical`. Null and empty strings count as absent.
fn field<'a>(obj: &'a Map<String, Value>, canonical: &str) -> Option<&'a Value> {
    aliases(canonical).iter().find_map(|key| match obj.get(*key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    })
}

fn string_field(obj: &Map<String, Value>, canonical: &str) -> Option<String> {
    match field(obj, canonical)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            // Offset-less timestamps are server-local UTC.
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Normalize a task. When `board_id` is given it overrides whatever the
/// payload says, since a nested task always belongs to its parent board.
pub fn normalize_task(value: &Value, board_id: Option<&str>) -> Option<Task> {
    let obj = value.as_object()?;
    let Some(id) = string_field(obj, "id") else {
        log::warn!(target: "canban.normalize", "Dropping task without id: {}", value);
        return None;
    };

    let status = match string_field(obj, "status") {
        Some(raw) => TaskStatus::parse(&raw).unwrap_or_else(|| {
            log::warn!(target: "canban.normalize", "Unknown status {:?} on task {}", raw, id);
            TaskStatus::default()
        }),
        None => TaskStatus::default(),
    };
    let priority = string_field(obj, "priority")
        .and_then(|raw| Priority::parse(&raw))
        .unwrap_or_default();

    Some(Task {
        title: string_field(obj, "title").unwrap_or_default(),
        description: string_field(obj, "description"),
        status,
        priority,
        board_id: match board_id {
            Some(parent) => Some(parent.to_string()),
            None => string_field(obj, "boardId"),
        },
        id,
    })
}

pub fn normalize_board(value: &Value) -> Option<Board> {
    let obj = value.as_object()?;
    let Some(id) = string_field(obj, "id") else {
        log::warn!(target: "canban.normalize", "Dropping board without id: {}", value);
        return None;
    };

    let tasks = field(obj, "tasks")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|t| normalize_task(t, Some(&id)))
                .collect()
        })
        .unwrap_or_default();

    Some(Board {
        name: string_field(obj, "name").unwrap_or_default(),
        created_at: field(obj, "createdAt")
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now),
        order: field(obj, "order").and_then(Value::as_i64).unwrap_or(0),
        tasks,
        id,
    })
}

/// Normalize a `GET /api/boards` body. `None` if the body is not an array.
pub fn normalize_board_list(value: &Value) -> Option<Vec<Board>> {
    let items = value.as_array()?;
    Some(items.iter().filter_map(normalize_board).collect())
}
