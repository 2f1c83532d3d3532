//! core::lock
//!
//! Exclusive document lock shared across processes.
//!
//! # Architecture
//!
//! Inside one process the [`DocumentStore`](crate::core::store::DocumentStore)
//! serializes access with a mutex. That does nothing for a second process
//! pointed at the same data directory, so every load and compare-and-swap
//! additionally holds an OS-level exclusive lock on `doc.json.lock`.
//!
//! # Invariants
//!
//! - The lock is held for the entire read-check-write sequence
//! - Lock is automatically released on drop (RAII pattern)
//! - [`StoreLock::acquire`] blocks until any other holder lets go
//!
//! # Example
//!
//! ```ignore
//! use linecook::core::lock::StoreLock;
//! use linecook::core::paths::DataPaths;
//!
//! let paths = DataPaths::new("data");
//! let lock = StoreLock::acquire(&paths)?;
//!
//! // Read, decide, write while holding the lock
//! // ...
//!
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::DataPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on the stored document.
///
/// Released when this guard is dropped, even if the holder panics.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Acquire the document lock, waiting for any other holder.
    ///
    /// Creates the data directory and the lock file if they are missing.
    ///
    /// # Errors
    ///
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &DataPaths) -> Result<Self, LockError> {
        let file = open_lock_file(paths)?;
        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;
        Ok(Self { file })
    }
}

fn open_lock_file(paths: &DataPaths) -> Result<File, LockError> {
    let data_dir = paths.data_dir();
    fs::create_dir_all(data_dir).map_err(|e| {
        LockError::CreateFailed(format!("cannot create {}: {}", data_dir.display(), e))
    })?;

    let path = paths.lock_path();
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e)))
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Best-effort release on drop
        let _ = self.file.unlock();
    }
}
