use std::time::SystemTime;
use crate::application::errors::StorageError;

/// Store trait - abstraction for flat key-value persistence
pub trait Store: Send + Sync {
    /// Look up a key. I/O failures read as "not found".
    fn read_item(&self, key: &str) -> Option<String>;

    /// Insert or replace a key, creating the backing file if needed
    fn write_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Last write time of the backing file, if it exists
    fn last_modified(&self) -> Option<SystemTime>;
}
