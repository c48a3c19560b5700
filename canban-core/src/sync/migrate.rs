/// First-run migration: the server answered with no boards while the cache
/// holds some, so the cache is pushed up (local -> server only).
///
/// Best-effort and attempted once per load. Boards the server adopted before
/// a failure stay adopted; the next load sees a non-empty server and does not
/// retry the rest.
use crate::normalize;
use crate::remote::{CreateTaskRequest, RemoteApi};
use crate::storage::KeyValueStore;
use crate::types::Board;

use super::{Connectivity, Reconciler, TARGET};

impl<S: KeyValueStore, R: RemoteApi> Reconciler<S, R> {
    pub(super) async fn migrate_local(&mut self, local: Vec<Board>) -> Vec<Board> {
        log::info!(
            target: TARGET,
            "Server has no boards, migrating {} cached boards",
            local.len()
        );

        let mut boards_created = 0usize;
        let mut tasks_created = 0usize;
        let mut remapped: Option<String> = None;

        for board in &local {
            let created = self
                .remote
                .create_board(&board.name)
                .await
                .as_ref()
                .and_then(normalize::normalize_board);
            let Some(created) = created else {
                log::warn!(
                    target: TARGET,
                    "Migration: server did not adopt board {} ({:?})",
                    board.id,
                    board.name
                );
                continue;
            };
            boards_created += 1;

            for task in &board.tasks {
                let request = CreateTaskRequest::from_task(task, &created.id);
                if self.remote.create_task(&request).await.is_some() {
                    tasks_created += 1;
                } else {
                    log::warn!(
                        target: TARGET,
                        "Migration: server did not adopt task {} of board {}",
                        task.id,
                        created.id
                    );
                }
            }

            if self.selection.is_selected(&board.id) {
                remapped = Some(created.id.clone());
            }
        }

        log::info!(
            target: TARGET,
            "Migration created {}/{} boards and {} tasks",
            boards_created,
            local.len(),
            tasks_created
        );

        match self.fetch_server_boards().await {
            Some(refreshed) if !refreshed.is_empty() => {
                // Selection moves to the server id only together with the refreshed list.
                if let Some(id) = remapped {
                    self.selection.select(id);
                    self.persist_selection();
                }
                self.commit(refreshed)
            }
            Some(_) => {
                // Returning the empty list would silently drop every cached board.
                log::warn!(target: TARGET, "Migration adopted nothing, keeping cached boards");
                local
            }
            None => {
                self.connectivity = Connectivity::Offline;
                log::warn!(target: TARGET, "Refresh after migration failed, keeping cached boards");
                local
            }
        }
    }
}
