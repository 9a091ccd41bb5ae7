//! Durable key-value storage used to persist client session state.
//!
//! The console keeps its tokens in a small string-to-string store, the
//! same shape as browser local storage. Two backends are provided:
//!
//! - [`MemoryStore`]: process-local, used in tests and for ephemeral sessions.
//! - [`FileStore`]: a JSON document on disk that survives restarts.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

/// A string key-value store.
///
/// Implementations must be safe to share between tasks. Writes are
/// last-writer-wins; no cross-process locking is attempted.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
