use std::path::PathBuf;

use canban_backend::config::{default_config_path, load_config};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let config = load_config(&config_path);

    if let Err(e) = canban_backend::run(config).await {
        log::error!("canban-backend failed: {}", e);
        std::process::exit(1);
    }
}
