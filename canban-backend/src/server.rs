/// HTTP server: spawns axum on a background tokio task.
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::api::api_router;
use crate::state::AppState;

/// Full application router with CORS applied.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api_router().layer(cors).with_state(state)
}

/// Bind and serve in the background. Returns the bound port (useful when
/// the configured port is 0) and the server task.
pub async fn spawn_server(
    state: AppState,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    let port = state.port;
    let bind_addr = state.bind_address.clone();
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    let actual_port = listener.local_addr()?.port();

    log::info!(
        "HTTP server listening on http://{}:{}",
        bind_addr,
        actual_port
    );

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("HTTP server exited with error: {}", e);
        }
    });

    Ok((actual_port, handle))
}
