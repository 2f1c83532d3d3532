//! core::paths
//!
//! Centralized path routing for LineCook storage locations.
//!
//! # Storage Layout
//!
//! All persisted state lives under a single data directory:
//! - `doc.json` - The canonical serialized document
//! - `doc.json.tmp` - Transient sibling used by the atomic write
//! - `doc.json.lock` - OS-level exclusive lock file
//!
//! **Hard rule:** no code outside this module should compute these file
//! names. Everything goes through [`DataPaths`].
//!
//! # Example
//!
//! ```
//! use linecook::core::paths::DataPaths;
//! use std::path::PathBuf;
//!
//! let paths = DataPaths::new("/srv/linecook/data");
//!
//! assert_eq!(paths.doc_path(), PathBuf::from("/srv/linecook/data/doc.json"));
//! assert_eq!(paths.temp_path(), PathBuf::from("/srv/linecook/data/doc.json.tmp"));
//! ```

use std::path::{Path, PathBuf};

/// File name of the canonical document.
const DOC_FILE: &str = "doc.json";

/// Centralized path routing for document storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    data_dir: PathBuf,
}

impl DataPaths {
    /// Route storage under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The directory holding all persisted state.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Canonical location of the serialized document.
    pub fn doc_path(&self) -> PathBuf {
        self.data_dir.join(DOC_FILE)
    }

    /// Temporary sibling written before the atomic rename.
    ///
    /// Lives in the same directory as [`doc_path`](Self::doc_path) so the
    /// rename never crosses a filesystem boundary.
    pub fn temp_path(&self) -> PathBuf {
        self.data_dir.join(format!("{DOC_FILE}.tmp"))
    }

    /// Lock file guarding the document across processes.
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(format!("{DOC_FILE}.lock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_files_share_the_data_dir() {
        let paths = DataPaths::new("/data");
        assert_eq!(paths.doc_path().parent(), Some(Path::new("/data")));
        assert_eq!(paths.temp_path().parent(), Some(Path::new("/data")));
        assert_eq!(paths.lock_path().parent(), Some(Path::new("/data")));
    }

    #[test]
    fn lock_path_is_distinct_from_document() {
        let paths = DataPaths::new("/data");
        assert_ne!(paths.lock_path(), paths.doc_path());
        assert_ne!(paths.lock_path(), paths.temp_path());
        assert_eq!(paths.lock_path(), PathBuf::from("/data/doc.json.lock"));
    }

    #[test]
    fn relative_data_dir_is_preserved() {
        let paths = DataPaths::new("data");
        assert_eq!(paths.data_dir(), Path::new("data"));
        assert_eq!(paths.doc_path(), PathBuf::from("data/doc.json"));
    }
}
