//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the stores. Nothing below reads environment variables: the binary reads them once
//! and hands the raw values to the helpers here, so request handling never depends on ambient
//! process state.

use crate::constants::{CANVAS_DIR_NAME, DEFAULT_PORT, FILE_DIR_NAME};
use crate::{CanvasError, CanvasResult};
use canvas_files::BlobStore;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at `data_dir`.
    ///
    /// The blob and canvas directories are derived from it and need not exist yet.
    pub fn new(data_dir: PathBuf) -> CanvasResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(CanvasError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding uploaded files.
    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join(FILE_DIR_NAME)
    }

    /// Directory holding canvas documents.
    pub fn canvas_dir(&self) -> PathBuf {
        self.data_dir.join(CANVAS_DIR_NAME)
    }

    /// Opens the blob store under [`Self::blob_dir`], creating the directory.
    pub fn open_blob_store(&self) -> CanvasResult<BlobStore> {
        Ok(BlobStore::open(self.blob_dir())?)
    }
}

/// Parse the listen port from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PORT`].
pub fn port_from_env_value(value: Option<String>) -> CanvasResult<u16> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_PORT),
        Some(v) => v
            .parse::<u16>()
            .map_err(|e| CanvasError::InvalidInput(format!("invalid PORT '{}': {}", v, e))),
    }
}

/// Resolve the data directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`crate::DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(crate::DEFAULT_DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_directories_are_siblings() {
        let cfg = CoreConfig::new(PathBuf::from("/srv/canvas-data")).unwrap();

        assert_eq!(cfg.blob_dir(), PathBuf::from("/srv/canvas-data/file"));
        assert_eq!(cfg.canvas_dir(), PathBuf::from("/srv/canvas-data/canvas"));
        assert_eq!(cfg.data_dir(), Path::new("/srv/canvas-data"));
    }

    #[test]
    fn test_empty_data_dir_rejected() {
        let result = CoreConfig::new(PathBuf::new());

        assert!(matches!(result, Err(CanvasError::InvalidInput(_))));
    }

    #[test]
    fn test_open_blob_store_creates_directory() {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().to_path_buf()).unwrap();

        let store = cfg.open_blob_store().unwrap();

        assert_eq!(store.directory(), cfg.blob_dir());
        assert!(cfg.blob_dir().is_dir());
    }

    #[test]
    fn test_port_defaults_when_unset_or_blank() {
        assert_eq!(port_from_env_value(None).unwrap(), DEFAULT_PORT);
        assert_eq!(port_from_env_value(Some("  ".into())).unwrap(), DEFAULT_PORT);
    }

    #[test]
    fn test_port_parses_value() {
        assert_eq!(port_from_env_value(Some(" 8080 ".into())).unwrap(), 8080);
    }

    #[test]
    fn test_port_rejects_garbage() {
        assert!(matches!(
            port_from_env_value(Some("eighty".into())),
            Err(CanvasError::InvalidInput(_))
        ));
        assert!(port_from_env_value(Some("70000".into())).is_err());
    }

    #[test]
    fn test_data_dir_from_env_value() {
        assert_eq!(data_dir_from_env_value(None), PathBuf::from("."));
        assert_eq!(
            data_dir_from_env_value(Some("/var/lib/canvas".into())),
            PathBuf::from("/var/lib/canvas")
        );
    }
}
