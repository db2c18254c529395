//! Canvas File Storage
//!
//! This crate stores opaque uploaded files ("blobs") in a single flat directory, one file per
//! blob, addressed by a generated [`ResourceId`].
//!
//! ## Storage Model
//!
//! ```text
//! file/
//! ├── 550e8400-e29b-41d4-a716-446655440000.jpg
//! ├── 6fa459ea-ee8a-3ca4-894e-db77e160355e.tar.gz   # only ".gz" is kept, see below
//! └── 9b2f6c1e-4a8d-4f0e-b1c2-3d4e5f607182          # uploaded without an extension
//! ```
//!
//! - The entry name is the identifier followed by the original file's extension
//! - The extension is everything from the last `.` of the original name, inclusive
//! - Content is stored verbatim and never modified or deleted
//! - Callers only know the identifier, so lookups resolve `id → entry name` through an
//!   in-memory index built from the directory listing
//!
//! ## Example Usage
//!
//! ```no_run
//! use canvas_files::BlobStore;
//!
//! # async fn run() -> Result<(), canvas_files::FilesError> {
//! let store = BlobStore::open("data/file")?;
//! let id = store.put(&b"hello"[..], "greeting.txt").await?;
//! let blob = store.get(&id.to_string()).await?;
//! assert_eq!(blob.size, 5);
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;
mod index;

pub use constants::{DEFAULT_MEDIA_TYPE, SNIFF_LEN};
pub use files::{extension_of, BlobStore, StoredBlob};
pub use canvas_uuid::ResourceId;

/// Errors that can occur during blob operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// No entry exists for the requested identifier
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for blob operations.
pub type FilesResult<T> = Result<T, FilesError>;
