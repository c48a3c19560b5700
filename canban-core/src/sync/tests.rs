use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use super::*;
use crate::remote::{CreateTaskRequest, RemoteApi};
use crate::storage::cache::BOARDS_KEY;
use crate::storage::{KeyValueStore, LocalCache, MemoryStore, StorageError};
use crate::types::{find_task, next_order, NewTask, Priority, Task, TaskPatch, TaskStatus};
use crate::view::BoardView;

/// In-process stand-in for the REST server.
#[derive(Default)]
struct FakeServer {
    boards: Mutex<Vec<Board>>,
    online: AtomicBool,
    /// `listBoards` calls beyond this many report unavailable.
    list_budget: Mutex<Option<usize>>,
    /// `createBoard` calls beyond this many are rejected.
    create_budget: Mutex<Option<usize>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    create_board_calls: AtomicUsize,
    create_task_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl FakeServer {
    fn online() -> Arc<Self> {
        let server = Self::default();
        server.online.store(true, Ordering::SeqCst);
        Arc::new(server)
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn up(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn seed(&self, boards: Vec<Board>) {
        *self.boards.lock().unwrap() = boards;
    }

    fn snapshot(&self) -> Vec<Board> {
        self.boards.lock().unwrap().clone()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn creates(&self) -> (usize, usize) {
        (
            self.create_board_calls.load(Ordering::SeqCst),
            self.create_task_calls.load(Ordering::SeqCst),
        )
    }
}

fn take_budget(budget: &Mutex<Option<usize>>) -> bool {
    let mut budget = budget.lock().unwrap();
    match budget.as_mut() {
        None => true,
        Some(0) => false,
        Some(n) => {
            *n -= 1;
            true
        }
    }
}

#[async_trait]
impl RemoteApi for FakeServer {
    async fn list_boards(&self) -> Option<Value> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.up() || !take_budget(&self.list_budget) {
            return None;
        }
        let mut boards = self.snapshot();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        serde_json::to_value(boards).ok()
    }

    async fn create_board(&self, name: &str) -> Option<Value> {
        self.create_board_calls.fetch_add(1, Ordering::SeqCst);
        if !self.up() || !take_budget(&self.create_budget) {
            return None;
        }
        let mut boards = self.boards.lock().unwrap();
        let board = Board {
            id: self.fresh_id("srv-b"),
            name: name.to_string(),
            created_at: Utc::now(),
            order: next_order(&boards),
            tasks: Vec::new(),
        };
        boards.push(board.clone());
        serde_json::to_value(board).ok()
    }

    async fn update_board(&self, id: &str, name: &str) -> Option<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if !self.up() {
            return None;
        }
        let mut boards = self.boards.lock().unwrap();
        let board = boards.iter_mut().find(|b| b.id == id)?;
        board.name = name.to_string();
        Some(())
    }

    async fn delete_board(&self, id: &str) -> Option<()> {
        if !self.up() {
            return None;
        }
        let mut boards = self.boards.lock().unwrap();
        let index = boards.iter().position(|b| b.id == id)?;
        boards.remove(index);
        Some(())
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Option<Value> {
        self.create_task_calls.fetch_add(1, Ordering::SeqCst);
        if !self.up() {
            return None;
        }
        let task = Task {
            id: self.fresh_id("srv-t"),
            title: request.title.clone(),
            description: request.description.clone(),
            status: request.status,
            priority: request.priority,
            board_id: request.board_id.clone(),
        };
        let mut boards = self.boards.lock().unwrap();
        let board_id = request.board_id.as_deref()?;
        boards
            .iter_mut()
            .find(|b| b.id == board_id)?
            .tasks
            .push(task.clone());
        serde_json::to_value(task).ok()
    }

    async fn update_task(&self, task: &Task) -> Option<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if !self.up() {
            return None;
        }
        let mut boards = self.boards.lock().unwrap();
        let mut found = None;
        for board in boards.iter_mut() {
            if let Some(index) = board.tasks.iter().position(|t| t.id == task.id) {
                found = Some(board.tasks.remove(index));
            }
        }
        found?;
        let dest = task.board_id.as_deref()?;
        boards
            .iter_mut()
            .find(|b| b.id == dest)?
            .tasks
            .push(task.clone());
        Some(())
    }

    async fn delete_task(&self, id: &str) -> Option<()> {
        if !self.up() {
            return None;
        }
        let mut boards = self.boards.lock().unwrap();
        let mut removed = false;
        for board in boards.iter_mut() {
            let before = board.tasks.len();
            board.tasks.retain(|t| t.id != id);
            removed |= board.tasks.len() != before;
        }
        removed.then_some(())
    }
}

type Engine = Reconciler<Arc<MemoryStore>, Arc<FakeServer>>;

fn setup(server: &Arc<FakeServer>, cached: &[Board]) -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let cache = LocalCache::new(store.clone());
    if !cached.is_empty() {
        cache.write_boards(cached);
    }
    (Reconciler::new(cache, server.clone()), store)
}

fn local_board(id: &str, name: &str, order: i64, task_count: usize) -> Board {
    Board {
        id: id.to_string(),
        name: name.to_string(),
        created_at: Utc::now() - Duration::minutes(order),
        order,
        tasks: (0..task_count)
            .map(|i| Task {
                id: format!("{}-task-{}", id, i),
                title: format!("{} task {}", name, i),
                description: None,
                status: TaskStatus::Todo,
                priority: Priority::Medium,
                board_id: Some(id.to_string()),
            })
            .collect(),
    }
}

// ── Load ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_offline_load_returns_cache_unchanged() {
    let server = FakeServer::offline();
    let cached = vec![local_board("t-aaaaaaa", "Offline", 0, 2)];
    let (mut engine, store) = setup(&server, &cached);
    let raw_before = store.get(BOARDS_KEY).unwrap();

    let boards = engine.load().await;

    assert_eq!(boards, cached);
    assert_eq!(store.get(BOARDS_KEY).unwrap(), raw_before);
    assert_eq!(server.creates(), (0, 0));
    assert_eq!(server.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.connectivity(), Connectivity::Offline);
}

#[tokio::test]
async fn test_server_list_wins_over_cache() {
    let server = FakeServer::online();
    server.seed(vec![local_board("srv-1", "Server", 0, 1)]);
    let (mut engine, _) = setup(&server, &[local_board("t-bbbbbbb", "Local only", 0, 3)]);

    let boards = engine.load().await;

    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].id, "srv-1");
    assert_eq!(engine.cache().read_boards(), boards);
    assert_eq!(server.creates(), (0, 0));
    assert_eq!(engine.connectivity(), Connectivity::Online);
}

#[tokio::test]
async fn test_both_empty_persists_empty_list() {
    let server = FakeServer::online();
    let (mut engine, store) = setup(&server, &[]);

    assert!(engine.load().await.is_empty());
    assert_eq!(store.get(BOARDS_KEY).unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_migration_runs_exactly_once() {
    const BOARDS: usize = 3;
    const TASKS: usize = 2;
    let server = FakeServer::online();
    let cached: Vec<Board> = (0..BOARDS)
        .map(|i| local_board(&format!("t-local{}", i), &format!("Board {}", i), i as i64, TASKS))
        .collect();
    let (mut engine, _) = setup(&server, &cached);

    let boards = engine.load().await;
    assert_eq!(server.creates(), (BOARDS, BOARDS * TASKS));
    assert_eq!(boards.len(), BOARDS);
    assert!(boards.iter().all(|b| !is_temp_id(&b.id)));
    assert!(boards.iter().all(|b| b.tasks.len() == TASKS));
    assert_eq!(engine.cache().read_boards(), boards);

    engine.load().await;
    assert_eq!(server.creates(), (BOARDS, BOARDS * TASKS));
}

#[tokio::test]
async fn test_migration_remaps_selected_board() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[local_board("t-sel0001", "Picked", 0, 0)]);
    engine.select_board("t-sel0001").unwrap();

    let boards = engine.load().await;

    assert_eq!(engine.selection().board_id(), Some(boards[0].id.as_str()));
    assert_eq!(engine.cache().read_selection().as_deref(), Some(boards[0].id.as_str()));
}

#[tokio::test]
async fn test_partial_migration_is_not_retried() {
    let server = FakeServer::online();
    *server.create_budget.lock().unwrap() = Some(1);
    let cached = vec![
        local_board("t-first00", "First", 0, 1),
        local_board("t-second0", "Second", 1, 1),
    ];
    let (mut engine, _) = setup(&server, &cached);

    let boards = engine.load().await;
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].name, "First");
    assert_eq!(server.creates(), (2, 1));

    engine.load().await;
    assert_eq!(server.creates(), (2, 1));
}

#[tokio::test]
async fn test_failed_refresh_after_migration_keeps_cache() {
    let server = FakeServer::online();
    *server.list_budget.lock().unwrap() = Some(1);
    let cached = vec![local_board("t-keep000", "Keep me", 0, 2)];
    let (mut engine, _) = setup(&server, &cached);

    let boards = engine.load().await;

    assert_eq!(boards, cached);
    assert_eq!(engine.cache().read_boards(), cached);
    assert_eq!(engine.connectivity(), Connectivity::Offline);
}

#[tokio::test]
async fn test_failed_refresh_after_migration_keeps_selection() {
    let server = FakeServer::online();
    *server.list_budget.lock().unwrap() = Some(1);
    let (mut engine, _) = setup(&server, &[local_board("t-sel0001", "Picked", 0, 0)]);
    engine.select_board("t-sel0001").unwrap();

    let boards = engine.load().await;

    let ids: Vec<_> = boards.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["t-sel0001"]);
    assert_eq!(engine.selection().board_id(), Some("t-sel0001"));
    assert_eq!(engine.cache().read_selection().as_deref(), Some("t-sel0001"));
    let view = BoardView::build(&boards, engine.selection(), engine.connectivity());
    assert_eq!(view.panels.len(), 1);
}

#[tokio::test]
async fn test_migration_adopting_nothing_keeps_cache() {
    let server = FakeServer::online();
    *server.create_budget.lock().unwrap() = Some(0);
    let cached = vec![local_board("t-keep001", "Rejected", 0, 1)];
    let (mut engine, _) = setup(&server, &cached);

    assert_eq!(engine.load().await, cached);
    assert_eq!(engine.cache().read_boards(), cached);
}

// ── Board mutations ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_board_online_uses_server_identity() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[]);

    let first = engine.create_board("  Sprint 1 ").await.unwrap();
    assert!(first.confirmed);
    assert_eq!(first.value.name, "Sprint 1");
    assert_eq!(first.value.order, 0);
    assert!(first.value.id.starts_with("srv-b"));
    assert_eq!(engine.selection().board_id(), Some(first.value.id.as_str()));

    let second = engine.create_board("Sprint 2").await.unwrap();
    assert_eq!(second.value.order, 1);
    assert_eq!(second.boards.len(), 2);
    assert_eq!(server.snapshot().len(), 2);
}

#[tokio::test]
async fn test_create_board_offline_is_local_only() {
    let server = FakeServer::offline();
    let (mut engine, _) = setup(&server, &[local_board("t-exist00", "Existing", 4, 0)]);

    let applied = engine.create_board("Later").await.unwrap();

    assert!(!applied.confirmed);
    assert!(is_temp_id(&applied.value.id));
    assert_eq!(applied.value.order, 5);
    assert_eq!(applied.boards.len(), 2);
    assert!(applied.boards.iter().any(|b| b.id == applied.value.id));
    assert_eq!(engine.cache().read_selection(), Some(applied.value.id.clone()));
}

#[tokio::test]
async fn test_blank_board_name_is_rejected_without_writes() {
    let server = FakeServer::online();
    let (mut engine, store) = setup(&server, &[]);

    assert_eq!(engine.create_board("   ").await, Err(SyncError::EmptyName));
    assert_eq!(server.creates(), (0, 0));
    assert_eq!(store.get(BOARDS_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_rename_board_offline_applies_locally() {
    let server = FakeServer::offline();
    let (mut engine, _) = setup(&server, &[local_board("t-ren0000", "Old", 0, 0)]);

    let applied = engine.rename_board("t-ren0000", "New").await.unwrap();

    assert!(!applied.confirmed);
    assert_eq!(applied.boards[0].name, "New");
    assert_eq!(server.update_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rename_unknown_board_is_rejected() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[]);
    assert_eq!(
        engine.rename_board("nope", "x").await,
        Err(SyncError::BoardNotFound("nope".into()))
    );
    assert_eq!(server.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_delete_board_cascades_even_when_offline() {
    let server = FakeServer::offline();
    let mut other = local_board("t-other00", "Other", 1, 1);
    // A stray task pointing at the doomed board from another board's set.
    let stray = Task {
        id: "stray".into(),
        board_id: Some("t-doomed0".into()),
        ..other.tasks[0].clone()
    };
    other.tasks.push(stray);
    let cached = vec![local_board("t-doomed0", "Doomed", 0, 3), other];
    let (mut engine, _) = setup(&server, &cached);

    let applied = engine.delete_board("t-doomed0").await;

    assert!(!applied.confirmed);
    assert_eq!(applied.value.map(|b| b.tasks.len()), Some(3));
    assert_eq!(applied.boards.len(), 1);
    let orphaned = applied
        .boards
        .iter()
        .flat_map(|b| b.tasks.iter())
        .filter(|t| t.board_id.as_deref() == Some("t-doomed0"))
        .count();
    assert_eq!(orphaned, 0);
    assert!(find_task(&applied.boards, "stray").is_none());
}

#[tokio::test]
async fn test_cascade_holds_for_every_board() {
    let cached = vec![
        local_board("t-a000000", "A", 0, 2),
        local_board("t-b000000", "B", 1, 0),
        local_board("t-c000000", "C", 2, 5),
    ];
    for target in &cached {
        let server = FakeServer::offline();
        let (mut engine, _) = setup(&server, &cached);
        let applied = engine.delete_board(&target.id).await;
        assert!(applied
            .boards
            .iter()
            .flat_map(|b| b.tasks.iter())
            .all(|t| t.board_id.as_deref() != Some(target.id.as_str())));
        assert_eq!(applied.boards.len(), cached.len() - 1);
    }
}

#[tokio::test]
async fn test_delete_selected_board_falls_back() {
    let server = FakeServer::offline();
    let cached = vec![
        local_board("t-one0000", "One", 0, 0),
        local_board("t-two0000", "Two", 1, 0),
    ];
    let (mut engine, _) = setup(&server, &cached);
    engine.select_board("t-one0000").unwrap();

    engine.delete_board("t-one0000").await;
    assert_eq!(engine.selection().board_id(), Some("t-two0000"));

    engine.delete_board("t-two0000").await;
    assert_eq!(engine.selection().board_id(), None);
    assert_eq!(engine.cache().read_selection(), None);
}

#[tokio::test]
async fn test_delete_board_online_cascades_on_server() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[]);
    let board = engine.create_board("Gone soon").await.unwrap().value;
    engine
        .create_task(&board.id, NewTask::titled("child"))
        .await
        .unwrap();

    let applied = engine.delete_board(&board.id).await;

    assert!(applied.confirmed);
    assert!(applied.boards.is_empty());
    assert!(server.snapshot().is_empty());
}

// ── Task mutations ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_task_online() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[]);
    let board = engine.create_board("Work").await.unwrap().value;

    let applied = engine
        .create_task(
            &board.id,
            NewTask {
                title: "Write report".into(),
                description: Some("  ".into()),
                priority: Priority::High,
            },
        )
        .await
        .unwrap();

    assert!(applied.confirmed);
    assert!(applied.value.id.starts_with("srv-t"));
    assert_eq!(applied.value.description, None);
    assert_eq!(applied.value.status, TaskStatus::Todo);
    assert_eq!(applied.value.board_id.as_deref(), Some(board.id.as_str()));
    let stored = find_task(&applied.boards, &applied.value.id).unwrap();
    assert_eq!(stored.priority, Priority::High);
}

#[tokio::test]
async fn test_create_task_offline_gets_temp_id() {
    let server = FakeServer::offline();
    let (mut engine, _) = setup(&server, &[local_board("t-home000", "Home", 0, 0)]);

    let applied = engine
        .create_task("t-home000", NewTask::titled("Laundry"))
        .await
        .unwrap();

    assert!(!applied.confirmed);
    assert!(is_temp_id(&applied.value.id));
    assert_eq!(applied.boards[0].tasks, vec![applied.value.clone()]);
}

#[tokio::test]
async fn test_create_task_validation() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[local_board("t-home000", "Home", 0, 0)]);

    assert_eq!(
        engine.create_task("t-home000", NewTask::titled(" ")).await,
        Err(SyncError::EmptyTitle)
    );
    assert_eq!(
        engine.create_task("missing", NewTask::titled("x")).await,
        Err(SyncError::BoardNotFound("missing".into()))
    );
    assert_eq!(server.creates(), (0, 0));
}

#[tokio::test]
async fn test_update_task_patches_fields() {
    let server = FakeServer::offline();
    let (mut engine, _) = setup(&server, &[local_board("t-b0000000", "B", 0, 1)]);
    let task_id = "t-b0000000-task-0";

    let applied = engine
        .update_task(
            task_id,
            TaskPatch {
                title: Some(" Renamed ".into()),
                description: Some("details".into()),
                priority: Some(Priority::Low),
            },
        )
        .await
        .unwrap();

    assert_eq!(applied.value.title, "Renamed");
    assert_eq!(applied.value.description.as_deref(), Some("details"));
    assert_eq!(applied.value.priority, Priority::Low);
    assert_eq!(applied.value.status, TaskStatus::Todo);
    assert_eq!(find_task(&applied.boards, task_id), Some(&applied.value));

    assert_eq!(
        engine
            .update_task(
                task_id,
                TaskPatch {
                    title: Some("".into()),
                    ..Default::default()
                }
            )
            .await,
        Err(SyncError::EmptyTitle)
    );
    assert_eq!(
        engine.update_task("ghost", TaskPatch::default()).await,
        Err(SyncError::TaskNotFound("ghost".into()))
    );
}

#[tokio::test]
async fn test_delete_task() {
    let server = FakeServer::offline();
    let (mut engine, _) = setup(&server, &[local_board("t-b0000000", "B", 0, 2)]);

    let applied = engine.delete_task("t-b0000000-task-0").await;

    assert_eq!(applied.value.map(|t| t.id), Some("t-b0000000-task-0".to_string()));
    assert_eq!(applied.boards[0].tasks.len(), 1);
    assert!(engine.delete_task("t-b0000000-task-0").await.value.is_none());
}

#[tokio::test]
async fn test_move_task_reassigns_board_and_status() {
    let server = FakeServer::offline();
    let cached = vec![
        local_board("t-src0000", "Source", 0, 2),
        local_board("t-dst0000", "Dest", 1, 1),
    ];
    let (mut engine, _) = setup(&server, &cached);
    let task_id = "t-src0000-task-0";

    let applied = engine
        .move_task(task_id, "t-dst0000", TaskStatus::Done)
        .await
        .unwrap();

    assert_eq!(applied.value.status, TaskStatus::Done);
    assert_eq!(applied.value.board_id.as_deref(), Some("t-dst0000"));
    let source = &applied.boards[0];
    let dest = &applied.boards[1];
    assert!(source.tasks.iter().all(|t| t.id != task_id));
    assert_eq!(source.tasks.len(), 1);
    assert_eq!(dest.tasks.last().map(|t| t.id.as_str()), Some(task_id));
    assert_eq!(dest.tasks.len(), 2);
}

#[tokio::test]
async fn test_move_task_within_board_changes_column() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[]);
    let board = engine.create_board("Flow").await.unwrap().value;
    let task = engine
        .create_task(&board.id, NewTask::titled("Review"))
        .await
        .unwrap()
        .value;

    let applied = engine
        .move_task(&task.id, &board.id, TaskStatus::InProgress)
        .await
        .unwrap();

    assert!(applied.confirmed);
    let on_server = find_task(&server.snapshot(), &task.id).cloned().unwrap();
    assert_eq!(on_server.status, TaskStatus::InProgress);
    assert_eq!(applied.boards[0].tasks_in(TaskStatus::InProgress).count(), 1);
}

#[tokio::test]
async fn test_move_task_rejects_unknown_targets() {
    let server = FakeServer::offline();
    let cached = vec![local_board("t-src0000", "Source", 0, 1)];
    let (mut engine, _) = setup(&server, &cached);

    assert_eq!(
        engine
            .move_task("t-src0000-task-0", "nowhere", TaskStatus::Done)
            .await,
        Err(SyncError::BoardNotFound("nowhere".into()))
    );
    assert_eq!(
        engine.move_task("ghost", "t-src0000", TaskStatus::Done).await,
        Err(SyncError::TaskNotFound("ghost".into()))
    );
    assert_eq!(engine.cache().read_boards(), cached);
}

// ── Cache write failures ─────────────────────────────────────────────

/// Memory store that starts refusing writes once frozen.
#[derive(Default)]
struct FreezableStore {
    inner: MemoryStore,
    frozen: AtomicBool,
}

impl KeyValueStore for FreezableStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.frozen.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("read-only").into());
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

fn frozen_setup(
    server: &Arc<FakeServer>,
    cached: &[Board],
) -> (Reconciler<Arc<FreezableStore>, Arc<FakeServer>>, Arc<FreezableStore>) {
    let store = Arc::new(FreezableStore::default());
    let cache = LocalCache::new(store.clone());
    cache.write_boards(cached);
    store.frozen.store(true, Ordering::SeqCst);
    (Reconciler::new(cache, server.clone()), store)
}

#[tokio::test]
async fn test_unwritable_cache_keeps_session_edits() {
    let server = FakeServer::offline();
    let (mut engine, store) = frozen_setup(&server, &[local_board("t-exist00", "Existing", 0, 0)]);
    engine.load().await;

    let created = engine.create_board("New").await.unwrap();
    let names: Vec<_> = created.boards.iter().map(|b| b.name.as_str()).collect();
    assert!(names.contains(&"New"));
    assert!(names.contains(&"Existing"));

    let task = engine
        .create_task(&created.value.id, NewTask::titled("Still here"))
        .await
        .unwrap();
    assert_eq!(task.boards.len(), 2);
    let board = engine.boards().iter().find(|b| b.id == created.value.id).unwrap();
    assert_eq!(board.tasks[0].title, "Still here");

    // Disk still holds the last successful write.
    assert_eq!(LocalCache::new(store).read_boards().len(), 1);
}

#[tokio::test]
async fn test_unwritable_cache_still_adopts_server_list() {
    let server = FakeServer::online();
    server.seed(vec![local_board("srv-b-9", "Remote", 0, 1)]);
    let (mut engine, store) = frozen_setup(&server, &[]);

    let boards = engine.load().await;

    assert_eq!(boards.len(), 1);
    assert_eq!(engine.boards(), boards.as_slice());
    engine.select_board("srv-b-9").unwrap();
    assert!(LocalCache::new(store).read_boards().is_empty());
}

// ── Selection ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_selection_survives_restart() {
    let server = FakeServer::offline();
    let (mut engine, store) = setup(&server, &[local_board("t-keep000", "Keep", 0, 0)]);
    engine.select_board("t-keep000").unwrap();
    assert!(engine.select_board("missing").is_err());

    let restarted = Reconciler::new(LocalCache::new(store.clone()), server.clone());
    assert_eq!(restarted.selection().board_id(), Some("t-keep000"));

    engine.show_all_boards();
    let restarted = Reconciler::new(LocalCache::new(store), server.clone());
    assert_eq!(restarted.selection().board_id(), None);
}

// ── Known gap ────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "unconfirmed edits are not replayed once the server is reachable again"]
async fn test_offline_edit_survives_reconnect() {
    let server = FakeServer::online();
    let (mut engine, _) = setup(&server, &[]);
    let board = engine.create_board("Shared").await.unwrap().value;

    server.set_online(false);
    engine.rename_board(&board.id, "Renamed offline").await.unwrap();

    server.set_online(true);
    let boards = engine.load().await;
    assert_eq!(boards[0].name, "Renamed offline");
}
