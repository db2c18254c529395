//! Blob store implementation
//!
//! This module provides [`BlobStore`], which writes uploaded byte streams into a flat directory
//! and resolves identifiers back to those files.
//!
//! # Entry Naming
//!
//! An entry is named `<identifier><extension>`, where the extension is copied from the
//! original filename (see [`extension_of`]). The extension is preserved so the stored file stays
//! recognisable on disk, but callers address blobs by identifier alone; the extension is
//! recovered through the index in [`crate::index`].
//!
//! # Write Path
//!
//! Uploads are streamed into a staging file inside the blob directory, flushed, and renamed to
//! the final entry name. A failed or abandoned upload therefore never leaves a visible entry,
//! and a concurrent download never observes a truncated file.
//!
//! # Read Path
//!
//! 1. Reject identifiers that are not canonical (they cannot name an entry)
//! 2. Look the identifier up in the index; on a miss, rescan the directory once
//! 3. Open the entry and sniff its media type from the leading bytes
//!
//! Entries written by another process are found by the rescan in step 2.

use crate::constants::{DEFAULT_MEDIA_TYPE, SNIFF_LEN};
use crate::index::BlobIndex;
use crate::{FilesError, FilesResult};
use canvas_storage::StorageDir;
use canvas_uuid::ResourceId;
use std::fmt::Display;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

/// Returns the extension of `original_name`: everything from its last `.`, inclusive.
///
/// Only the final path component is considered, so a client-supplied name such as
/// `../../x.sh` or `C:\uploads\report.pdf` can never smuggle a path separator into the entry
/// name. Names without a `.` have no extension.
///
/// ```
/// use canvas_files::extension_of;
///
/// assert_eq!(extension_of("photo.jpg"), ".jpg");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of("README"), "");
/// ```
pub fn extension_of(original_name: &str) -> &str {
    let base = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original_name);

    match base.rfind('.') {
        Some(dot) => &base[dot..],
        None => "",
    }
}

/// A blob opened for reading.
#[derive(Debug)]
pub struct StoredBlob {
    /// Identifier the blob was requested by
    pub id: ResourceId,

    /// Name of the entry on disk (`<identifier><extension>`)
    pub file_name: String,

    /// Size of the blob in bytes
    pub size: u64,

    /// Media type sniffed from the content, else guessed from the stored extension, else
    /// [`DEFAULT_MEDIA_TYPE`]
    pub media_type: &'static str,

    /// Open handle positioned at the start of the content
    pub file: File,
}

/// Identifier-addressed blob storage over one flat directory.
///
/// The store holds no locks across I/O. Uploads never coordinate with each other: each one gets
/// a fresh identifier and its own staging file.
#[derive(Debug)]
pub struct BlobStore {
    dir: StorageDir,
    index: BlobIndex,
}

impl BlobStore {
    /// Opens the store rooted at `path`, creating the directory if needed.
    ///
    /// The index starts empty and is filled lazily by the first lookup that misses.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> FilesResult<Self> {
        let dir = StorageDir::new(path);
        dir.ensure().map_err(|e| {
            io_context(
                e,
                format_args!("Failed to create storage directory {}", dir.path().display()),
            )
        })?;

        Ok(Self {
            dir,
            index: BlobIndex::default(),
        })
    }

    /// Returns the directory holding the entries.
    pub fn directory(&self) -> &Path {
        self.dir.path()
    }

    /// Stores `content` under a new identifier and returns it.
    ///
    /// The entry is written to `<dir>/<identifier><extension>`, with the extension taken from
    /// `original_name`. No size limit is applied here.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if reading `content` fails or the entry cannot be written (disk
    /// full, permission denied). No entry is left behind in that case.
    pub async fn put<R>(&self, mut content: R, original_name: &str) -> FilesResult<ResourceId>
    where
        R: AsyncRead + Unpin,
    {
        let id = ResourceId::new();
        let entry_name = format!("{}{}", id, extension_of(original_name));

        self.dir.ensure_async().await.map_err(|e| {
            io_context(
                e,
                format_args!(
                    "Failed to create storage directory {}",
                    self.dir.path().display()
                ),
            )
        })?;

        let (staged_file, staged_path) = self.dir.staging_file()?.into_parts();
        let mut file = File::from_std(staged_file);

        let size = tokio::io::copy(&mut content, &mut file)
            .await
            .map_err(|e| io_context(e, format_args!("Failed to store upload {}", entry_name)))?;
        file.sync_all().await?;
        drop(file);

        let target = self.dir.entry_path(&entry_name);
        staged_path.persist(&target).map_err(|e| {
            io_context(
                e.error,
                format_args!("Failed to write file to {}", target.display()),
            )
        })?;

        self.index.insert(id, entry_name.clone());
        tracing::info!(%id, entry = %entry_name, size, "stored file");

        Ok(id)
    }

    /// Opens the blob stored under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `FilesError::NotFound` if no entry exists for `identifier` (including identifiers that
    ///   are not canonical and so could never have been issued)
    /// - `FilesError::Io` if the directory cannot be read or the entry cannot be opened
    pub async fn get(&self, identifier: &str) -> FilesResult<StoredBlob> {
        let not_found = || FilesError::NotFound(identifier.to_owned());

        let id = ResourceId::parse(identifier).map_err(|_| not_found())?;

        let file_name = match self.index.lookup(&id) {
            Some(name) => name,
            None => {
                self.rescan().await?;
                self.index.lookup(&id).ok_or_else(not_found)?
            }
        };

        let path = self.dir.entry_path(&file_name);
        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(%id, entry = %file_name, "indexed file is missing from storage");
                self.index.remove(&id);
                return Err(not_found());
            }
            Err(e) => {
                return Err(io_context(
                    e,
                    format_args!("Failed to open file {}", path.display()),
                ))
            }
        };

        let size = file.metadata().await?.len();
        let media_type = media_type_of(&mut file, &file_name).await?;

        Ok(StoredBlob {
            id,
            file_name,
            size,
            media_type,
            file,
        })
    }

    /// Re-reads the directory listing into the index.
    ///
    /// Heals a deleted directory first, so a missing directory reads as empty.
    async fn rescan(&self) -> FilesResult<usize> {
        self.dir.ensure_async().await?;

        let mut listing = tokio::fs::read_dir(self.dir.path()).await.map_err(|e| {
            io_context(
                e,
                format_args!("Failed to read directory {}", self.dir.path().display()),
            )
        })?;

        let mut names = Vec::new();
        while let Some(entry) = listing.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        let added = self.index.merge_listing(names);
        tracing::debug!(added, "rescanned {}", self.dir.path().display());

        Ok(added)
    }
}

/// Content signature first, then the entry's extension.
async fn media_type_of(file: &mut File, file_name: &str) -> io::Result<&'static str> {
    let media_type = sniff_media_type(file)
        .await?
        .or_else(|| mime_guess::from_path(file_name).first_raw())
        .unwrap_or(DEFAULT_MEDIA_TYPE);

    Ok(media_type)
}

/// Sniffs the media type from the first [`SNIFF_LEN`] bytes and rewinds `file`.
async fn sniff_media_type(file: &mut File) -> io::Result<Option<&'static str>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut *file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await?;
    file.seek(SeekFrom::Start(0)).await?;

    Ok(infer::get(&head).map(|kind| kind.mime_type()))
}

fn io_context(e: io::Error, context: impl Display) -> FilesError {
    FilesError::Io(io::Error::new(e.kind(), format!("{}: {}", context, e)))
}
