use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use canban_core::config::{default_config_path, load_config};
use canban_core::remote::{Offline, RemoteApi};
use canban_core::storage::{FileStore, LocalCache};
use canban_core::view::BoardView;
use canban_core::{Applied, NewTask, Priority, Reconciler, TaskPatch, TaskStatus};
use clap::{Parser, Subcommand};

mod render;

type Engine = Reconciler<FileStore, Arc<dyn RemoteApi>>;

#[derive(Parser)]
#[command(name = "canban")]
#[command(version, about = "Kanban boards that keep working offline")]
pub struct Cli {
    /// Server base URL. Overrides client.json.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Directory for the local cache. Overrides client.json.
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Path to client.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the server entirely and work from the cache
    #[arg(long, global = true)]
    pub offline: bool,

    /// Print the view as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and print the boards (default)
    Show,
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
}

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Create a board and focus it
    Add { name: String },
    Rename { id: String, name: String },
    /// Delete a board together with its tasks
    Delete { id: String },
    /// Show only this board
    Select { id: String },
    /// Show every board
    All,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task to the To Do column of a board
    Add {
        board: String,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,
    },
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,
    },
    /// Move a task to another column and/or board
    Move {
        id: String,
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
        /// Destination board (defaults to the task's current board)
        #[arg(short, long)]
        board: Option<String>,
    },
    Delete { id: String },
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("unknown priority: {} (low, medium, high)", value))
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value).ok_or_else(|| format!("unknown status: {} (todo, inprogress, done)", value))
}

fn build_engine(cli: &Cli) -> Result<Engine> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path);

    let cache_dir = cli
        .cache_dir
        .clone()
        .unwrap_or_else(|| config.resolved_cache_dir());
    let store = FileStore::open(&cache_dir)
        .with_context(|| format!("Failed to open cache at {}", cache_dir.display()))?;

    let remote: Arc<dyn RemoteApi> = if cli.offline {
        Arc::new(Offline)
    } else {
        let server = cli.server.clone().unwrap_or(config.server_url);
        log::info!("Using server {}", server);
        Arc::new(canban_core::remote::HttpApi::new(server))
    };
    Ok(Reconciler::new(LocalCache::new(store), remote))
}

fn report<T>(what: &str, applied: &Applied<T>) {
    if !applied.confirmed {
        eprintln!("{} saved locally; the server did not confirm it", what);
    }
}

async fn execute(engine: &mut Engine, command: Commands) -> Result<()> {
    match command {
        Commands::Show => {}
        Commands::Board { command } => match command {
            BoardCommands::Add { name } => {
                let applied = engine.create_board(&name).await?;
                report("Board", &applied);
            }
            BoardCommands::Rename { id, name } => {
                let applied = engine.rename_board(&id, &name).await?;
                report("Rename", &applied);
            }
            BoardCommands::Delete { id } => {
                let applied = engine.delete_board(&id).await;
                if applied.value.is_none() {
                    eprintln!("No cached board {}", id);
                }
                report("Delete", &applied);
            }
            BoardCommands::Select { id } => engine.select_board(&id)?,
            BoardCommands::All => engine.show_all_boards(),
        },
        Commands::Task { command } => match command {
            TaskCommands::Add {
                board,
                title,
                description,
                priority,
            } => {
                let new_task = NewTask {
                    title,
                    description,
                    priority,
                };
                let applied = engine.create_task(&board, new_task).await?;
                report("Task", &applied);
            }
            TaskCommands::Edit {
                id,
                title,
                description,
                priority,
            } => {
                let patch = TaskPatch {
                    title,
                    description,
                    priority,
                };
                let applied = engine.update_task(&id, patch).await?;
                report("Edit", &applied);
            }
            TaskCommands::Move { id, status, board } => {
                let board = match board {
                    Some(board) => board,
                    None => engine
                        .boards()
                        .iter()
                        .find(|b| b.tasks.iter().any(|t| t.id == id))
                        .map(|b| b.id.clone())
                        .with_context(|| format!("Task not found: {}", id))?,
                };
                let applied = engine.move_task(&id, &board, status).await?;
                report("Move", &applied);
            }
            TaskCommands::Delete { id } => {
                let applied = engine.delete_task(&id).await;
                if applied.value.is_none() {
                    eprintln!("No cached task {}", id);
                }
                report("Delete", &applied);
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut engine = build_engine(&cli)?;
    engine.load().await;

    if let Some(command) = cli.command {
        execute(&mut engine, command).await?;
    }

    let view = BoardView::build(engine.boards(), engine.selection(), engine.connectivity());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::render(&view));
    }
    Ok(())
}
