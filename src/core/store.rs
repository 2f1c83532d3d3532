//! core::store
//!
//! Durable storage for the single document.
//!
//! # Architecture
//!
//! The document lives in `doc.json` under the data directory (see
//! [`DataPaths`]). The store is a constructed object: callers open it once
//! and share it by reference. It is the only code that writes the
//! persisted representation.
//!
//! # CAS Semantics
//!
//! Writes go through [`DocumentStore::compare_and_swap`], which succeeds
//! only if the stored revision still equals the caller's expected revision.
//! The read-check-write sequence runs under an in-process mutex and an
//! OS-level [`StoreLock`], so two writers holding the same base revision
//! cannot both commit.
//!
//! # Atomic Writes
//!
//! The new document is written to `doc.json.tmp`, synced to disk, then
//! renamed over `doc.json`. A reader (or a crash) sees either the old or the
//! new document, never a mix.
//!
//! # Example
//!
//! ```no_run
//! use linecook::core::paths::DataPaths;
//! use linecook::core::store::{CasOutcome, DocumentStore};
//!
//! let store = DocumentStore::open(DataPaths::new("data")).unwrap();
//! let current = store.load().unwrap();
//!
//! let mut payload = current.doc.clone();
//! payload.insert("tasks".into(), serde_json::json!([]));
//!
//! match store.compare_and_swap(current.revision, payload).unwrap() {
//!     CasOutcome::Committed(doc) => println!("now at revision {}", doc.revision),
//!     CasOutcome::Conflict(doc) => println!("lost the race to revision {}", doc.revision),
//! }
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::document::{Document, Payload};
use crate::core::lock::{LockError, StoreLock};
use crate::core::paths::DataPaths;
use crate::core::types::{Revision, UtcTimestamp};

/// Errors from document storage operations.
///
/// Every variant means the persisted state could not be read or written.
/// None of them is recoverable within a single request.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the persisted document failed.
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    /// Writing the persisted document failed.
    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    /// The persisted bytes are not a valid document.
    #[error("corrupt document at '{path}': {message}")]
    Corrupt { path: PathBuf, message: String },

    /// The document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(String),

    /// The revision counter cannot advance any further.
    #[error("revision counter exhausted at {0}")]
    RevisionExhausted(Revision),

    /// The cross-process lock could not be taken.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),
}

/// Result of a compare-and-swap.
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    /// The expected revision matched and the new document was persisted.
    Committed(Document),
    /// The stored revision differs. Nothing was written; this is the
    /// document as currently persisted.
    Conflict(Document),
}

impl CasOutcome {
    /// The document carried by either outcome.
    pub fn document(&self) -> &Document {
        match self {
            Self::Committed(doc) | Self::Conflict(doc) => doc,
        }
    }

    /// Whether the write landed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// File-backed store for exactly one document.
#[derive(Debug)]
pub struct DocumentStore {
    paths: DataPaths,
    /// Serializes load and compare-and-swap within this process. The
    /// document itself lives on disk, so the guard protects no data.
    guard: Mutex<()>,
}

impl DocumentStore {
    /// Open the store rooted at `paths`, creating the data directory if needed.
    ///
    /// The document itself is not created here; the first
    /// [`load`](Self::load) or [`compare_and_swap`](Self::compare_and_swap)
    /// seeds it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the data directory cannot be created.
    pub fn open(paths: DataPaths) -> Result<Self, StoreError> {
        fs::create_dir_all(paths.data_dir()).map_err(|e| StoreError::Write {
            path: paths.data_dir().to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            paths,
            guard: Mutex::new(()),
        })
    }

    /// The storage layout this store writes to.
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Load the current document, seeding it first if none exists.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Read`] if the file exists but cannot be read
    /// - [`StoreError::Corrupt`] if its contents are not a document
    /// - [`StoreError::Lock`] if the document lock cannot be taken
    pub fn load(&self) -> Result<Document, StoreError> {
        let _guard = self.lock_in_process();
        let _lock = StoreLock::acquire(&self.paths)?;
        self.read_or_seed()
    }

    /// Persist `payload` as the next revision if the stored revision equals
    /// `expected`.
    ///
    /// On success the new document has `revision = expected + 1` and
    /// `updatedAt = now`. On mismatch nothing is written and the current
    /// document is returned as [`CasOutcome::Conflict`].
    ///
    /// # Errors
    ///
    /// Any read, parse, serialize, write or lock failure. A failed write
    /// leaves the previously committed document intact.
    pub fn compare_and_swap(
        &self,
        expected: Revision,
        payload: Payload,
    ) -> Result<CasOutcome, StoreError> {
        let _guard = self.lock_in_process();
        let _lock = StoreLock::acquire(&self.paths)?;

        let current = self.read_or_seed()?;
        if current.revision != expected {
            info!(
                expected = %expected,
                current = %current.revision,
                "revision conflict; write rejected"
            );
            return Ok(CasOutcome::Conflict(current));
        }

        let revision = expected
            .next()
            .ok_or(StoreError::RevisionExhausted(expected))?;
        let next = Document {
            revision,
            updated_at: UtcTimestamp::now(),
            doc: payload,
        };
        self.write_atomic(&next)?;
        info!(revision = %next.revision, "document committed");

        Ok(CasOutcome::Committed(next))
    }

    /// The mutex guards no data, so a poisoned guard is still usable.
    fn lock_in_process(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the document, writing the seed first if the file is absent.
    ///
    /// Caller must hold both locks.
    fn read_or_seed(&self) -> Result<Document, StoreError> {
        let path = self.paths.doc_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let seed = Document::seed();
                self.write_atomic(&seed)?;
                info!(path = %path.display(), "seeded new document");
                return Ok(seed);
            }
            Err(e) => return Err(StoreError::Read { path, source: e }),
        };

        let doc: Document = serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(revision = %doc.revision, "document loaded");
        Ok(doc)
    }

    /// Write `doc` to the temp sibling, sync it, then rename over the
    /// canonical path.
    fn write_atomic(&self, doc: &Document) -> Result<(), StoreError> {
        let mut contents =
            serde_json::to_string_pretty(doc).map_err(|e| StoreError::Serialize(e.to_string()))?;
        contents.push('\n');

        let temp_path = self.paths.temp_path();
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StoreError::Write {
                    path: temp_path.clone(),
                    source: e,
                })?;

            file.write_all(contents.as_bytes())
                .map_err(|e| StoreError::Write {
                    path: temp_path.clone(),
                    source: e,
                })?;

            file.sync_all().map_err(|e| StoreError::Write {
                path: temp_path.clone(),
                source: e,
            })?;
        }

        let doc_path = self.paths.doc_path();
        fs::rename(&temp_path, &doc_path).map_err(|e| StoreError::Write {
            path: doc_path,
            source: e,
        })?;

        Ok(())
    }
}
