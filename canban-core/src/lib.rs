/// Canban core: board/task model and the client-side cache/sync engine.
pub mod config;
pub mod normalize;
pub mod remote;
pub mod selection;
pub mod storage;
pub mod sync;
pub mod types;
pub mod view;

pub use selection::Selection;
pub use sync::{Applied, Connectivity, Reconciler, SyncError};
pub use types::{Board, NewTask, Priority, Task, TaskPatch, TaskStatus};
