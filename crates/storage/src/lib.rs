//! Canvas Storage
//!
//! Low-level helpers shared by the blob store and the canvas store. Both keep one flat
//! directory of entries named after their identifier; this crate owns the directory itself:
//!
//! - creating it lazily and idempotently ([`StorageDir::ensure`])
//! - writing entries so that readers never observe a half-written file
//!   ([`StorageDir::write_atomic`], [`StorageDir::staging_file`])
//!
//! ## Staging files
//!
//! Atomic writes go through a staging file created in the same directory (so the final rename
//! never crosses a filesystem) and renamed into place once complete. Staging files carry the
//! hidden [`STAGING_PREFIX`] and must be skipped by anything that enumerates entries; see
//! [`is_staging_name`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name prefix reserved for in-flight writes.
pub const STAGING_PREFIX: &str = ".staging-";

/// Returns true if `name` belongs to an in-flight write rather than a stored entry.
pub fn is_staging_name(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX)
}

/// A flat directory holding the entries of one store.
///
/// Constructing the handle performs no I/O. The directory is (re)created by [`Self::ensure`]
/// before writes and scans, so deleting it while the service runs is healed on the next request.
#[derive(Clone, Debug)]
pub struct StorageDir {
    path: PathBuf,
}

impl StorageDir {
    /// Creates a handle without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a handle and ensures the directory exists.
    ///
    /// Intended for startup, where failure is fatal.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be created, for example because
    /// the path exists as a regular file or permission is denied.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = Self::new(path);
        dir.ensure()?;
        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the entry called `name` inside this directory.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Ensures the directory exists, creating missing parents.
    ///
    /// A no-op when the directory is already present. Concurrent callers racing to create it all
    /// succeed: losing the race to another creator is not an error.
    pub fn ensure(&self) -> io::Result<()> {
        if self.path.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.path)?;
        tracing::debug!("created storage directory {}", self.path.display());
        Ok(())
    }

    /// Async counterpart of [`Self::ensure`].
    pub async fn ensure_async(&self) -> io::Result<()> {
        if tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.path).await?;
        tracing::debug!("created storage directory {}", self.path.display());
        Ok(())
    }

    /// Creates an empty staging file inside this directory.
    ///
    /// The file is removed when dropped unless persisted, so an abandoned write leaves nothing
    /// behind.
    pub fn staging_file(&self) -> io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.path)
    }

    /// Writes `contents` to the entry called `name`, atomically.
    ///
    /// The bytes go to a staging file which is flushed to disk and then renamed over `name`.
    /// Readers see either no entry or the complete one.
    ///
    /// # Returns
    ///
    /// The final path of the entry.
    pub fn write_atomic(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let target = self.entry_path(name);

        let mut staged = self.staging_file()?;
        staged.write_all(contents)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| e.error)?;

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn entry_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_does_not_create_directory() {
        let temp = TempDir::new().unwrap();
        let dir = StorageDir::new(temp.path().join("canvas"));

        assert!(!dir.path().exists());
    }

    #[test]
    fn test_ensure_creates_missing_parents() {
        let temp = TempDir::new().unwrap();
        let dir = StorageDir::new(temp.path().join("data").join("nested").join("file"));

        dir.ensure().unwrap();

        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = StorageDir::open(temp.path().join("file")).unwrap();
        fs::write(dir.entry_path("keep.txt"), b"still here").unwrap();

        dir.ensure().unwrap();
        dir.ensure().unwrap();

        assert_eq!(fs::read(dir.entry_path("keep.txt")).unwrap(), b"still here");
    }

    #[test]
    fn test_ensure_concurrent_callers_all_succeed() {
        let temp = TempDir::new().unwrap();
        let dir = Arc::new(StorageDir::new(temp.path().join("a").join("b").join("c")));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let dir = Arc::clone(&dir);
                thread::spawn(move || dir.ensure())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_ensure_fails_when_path_is_a_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("canvas");
        fs::write(&path, "not a directory").unwrap();

        let result = StorageDir::open(&path);

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ensure_async_heals_deleted_directory() {
        let temp = TempDir::new().unwrap();
        let dir = StorageDir::open(temp.path().join("file")).unwrap();
        fs::remove_dir(dir.path()).unwrap();

        dir.ensure_async().await.unwrap();

        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_write_atomic_leaves_only_the_entry() {
        let temp = TempDir::new().unwrap();
        let dir = StorageDir::open(temp.path().join("canvas")).unwrap();

        let path = dir.write_atomic("entry.json", b"{}").unwrap();

        assert_eq!(path, dir.entry_path("entry.json"));
        assert_eq!(fs::read(&path).unwrap(), b"{}");
        assert_eq!(entry_names(dir.path()), vec!["entry.json".to_string()]);
    }

    #[test]
    fn test_write_atomic_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let dir = StorageDir::new(temp.path().join("missing"));

        assert!(dir.write_atomic("entry.json", b"{}").is_err());
    }

    #[test]
    fn test_dropped_staging_file_is_removed() {
        let temp = TempDir::new().unwrap();
        let dir = StorageDir::open(temp.path().join("file")).unwrap();

        let staged = dir.staging_file().unwrap();
        let name = staged
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(is_staging_name(&name));

        drop(staged);

        assert!(entry_names(dir.path()).is_empty());
    }
}
