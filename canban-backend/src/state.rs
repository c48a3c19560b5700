/// Shared application state passed to axum handlers.
use std::sync::Arc;

use crate::store::ServerStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ServerStore>,
    pub port: u16,
    pub bind_address: String,
}

impl AppState {
    pub fn new(store: ServerStore, port: u16, bind_address: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            port,
            bind_address: bind_address.into(),
        }
    }
}
