//! server::static_files
//!
//! Serves the web client from the static directory.
//!
//! # Path Rules
//!
//! - Request paths are relative to the static directory
//! - `..` components are rejected, so nothing outside it is reachable
//! - A directory resolves to its `index.html`

use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors from resolving or reading a static asset.
#[derive(Debug, Error)]
pub enum StaticError {
    /// The request tried to leave the static directory.
    #[error("invalid path")]
    InvalidPath,

    /// No such file.
    #[error("not found")]
    NotFound,

    /// The file exists but could not be read.
    #[error("failed to read '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// A static asset ready to send.
#[derive(Debug, Clone)]
pub struct Asset {
    pub content_type: &'static str,
    pub body: Bytes,
}

/// Map `relative` onto `root`, refusing anything that escapes it.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf, StaticError> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StaticError::InvalidPath)
            }
        }
    }
    Ok(resolved)
}

/// Load the asset at `relative` under `root`.
pub async fn load(root: &Path, relative: &str) -> Result<Asset, StaticError> {
    let mut path = resolve(root, relative)?;

    if tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        path.push("index.html");
    }

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(StaticError::NotFound),
    }

    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| StaticError::Io {
            path: path.clone(),
            source: e,
        })?;

    Ok(Asset {
        content_type: content_type_for(&path),
        body: Bytes::from(body),
    })
}

/// Infer content type from file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webmanifest" => "application/manifest+json",
        "woff2" => "font/woff2",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_stays_under_root() {
        let root = Path::new("/srv/static");
        assert_eq!(
            resolve(root, "css/app.css").unwrap(),
            PathBuf::from("/srv/static/css/app.css")
        );
        assert_eq!(
            resolve(root, "/./app.js").unwrap(),
            PathBuf::from("/srv/static/app.js")
        );
    }

    #[test]
    fn resolve_rejects_traversal() {
        let root = Path::new("/srv/static");
        assert!(matches!(
            resolve(root, "../secret"),
            Err(StaticError::InvalidPath)
        ));
        assert!(matches!(
            resolve(root, "css/../../secret"),
            Err(StaticError::InvalidPath)
        ));
    }

    #[test]
    fn content_types() {
        assert_eq!(
            content_type_for(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            content_type_for(Path::new("APP.JS")),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(content_type_for(Path::new("blob")), DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn directory_serves_index() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        std::fs::write(temp.path().join("docs/index.html"), "<h1>docs</h1>").unwrap();

        let asset = load(temp.path(), "docs").await.unwrap();
        assert_eq!(asset.content_type, "text/html; charset=utf-8");
        assert_eq!(&asset.body[..], b"<h1>docs</h1>");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            load(temp.path(), "nope.js").await,
            Err(StaticError::NotFound)
        ));
        // A directory without index.html
        assert!(matches!(
            load(temp.path(), "").await,
            Err(StaticError::NotFound)
        ));
    }
}
