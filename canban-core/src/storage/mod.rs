pub mod cache;
pub mod local;
pub mod memory;

pub use cache::LocalCache;
pub use local::FileStore;
pub use memory::MemoryStore;

/// Durable key-value backend for client-side state.
/// Implementations: FileStore (one file per key), MemoryStore (tests, embedding).
pub trait KeyValueStore: Send + Sync {
    /// Read the document stored under `key`, `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Drop `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
