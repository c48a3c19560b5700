/// Canban backend: config loading, store init, REST API server.
pub mod api;
pub mod config;
pub mod server;
pub mod state;
pub mod store;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::store::{ServerStore, StoreError};

/// Build the store described by `config`.
pub fn open_store(config: &ServerConfig) -> Result<ServerStore, StoreError> {
    match &config.data_file {
        Some(path) => ServerStore::open(path),
        None => Ok(ServerStore::in_memory()),
    }
}

/// Serve until the server task ends or ctrl-c arrives.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let store = open_store(&config)?;
    let state = AppState::new(store, config.port, config.bind_address.clone());
    let (_, handle) = server::spawn_server(state).await?;

    tokio::select! {
        result = handle => {
            if let Err(e) = result {
                log::error!("Server task failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Shutting down");
        }
    }
    Ok(())
}
