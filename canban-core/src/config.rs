/// Client configuration.
/// Reads client.json from ~/.config/canban/client.json (or platform equivalent).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Directory holding the Local Cache Store documents.
    #[serde(default)]
    pub cache_dir: Option<String>,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            cache_dir: None,
        }
    }
}

impl ClientConfig {
    /// Cache directory, falling back to the platform cache dir.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("canban"),
        }
    }
}

/// Default config path: ~/.config/canban/client.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("canban")
        .join("client.json")
}

/// Load config from path. Returns defaults if the file is missing or unparsable.
pub fn load_config(path: &Path) -> ClientConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Failed to parse config {}: {}", path.display(), e);
            ClientConfig::default()
        }),
        Err(_) => {
            log::info!("No config at {}, using defaults", path.display());
            ClientConfig::default()
        }
    }
}
