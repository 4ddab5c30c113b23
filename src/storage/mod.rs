//! Filesystem gateway
//!
//! Every filesystem touch made by the request handlers goes through
//! [`FileStore`]: existence checks, root bootstrap, directory listing, file
//! creation through a staging file, byte copies and opening for download.
//! Nothing here retries; failures are returned to the caller as
//! [`StorageError`].

mod error;
mod path;

pub use error::StorageError;

use hyper::body::Bytes;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::config::CollisionPolicy;

/// Name prefix of in-progress uploads; such entries are never listed
const STAGING_PREFIX: &str = ".upload-";

/// Directory entry as reported by the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Handle on the storage root
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied relative name to a path under the root
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        path::join_within(&self.root, relative)
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Create the root directory if it is missing
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        self.ensure_dir(&self.root).await
    }

    /// Create `path` (and missing parents) as a directory
    ///
    /// New directories get mode 0755 on unix.
    pub async fn ensure_dir(&self, path: &Path) -> Result<(), StorageError> {
        if fs::metadata(path).await.is_ok_and(|m| m.is_dir()) {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);

        builder
            .create(path)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: path.to_path_buf(),
                source,
            })
    }

    /// List the entries of `dir` in the order the platform returns them
    pub async fn list_entries(&self, dir: &Path) -> Result<Vec<DirEntry>, StorageError> {
        let read_err = |source| StorageError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = fs::read_dir(dir).await.map_err(read_err)?;
        let mut listed = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_staging_name(&name) {
                continue;
            }
            let is_dir = entry.file_type().await.map_err(read_err)?.is_dir();
            listed.push(DirEntry { name, is_dir });
        }

        Ok(listed)
    }

    /// Store `data` at `path` in one step
    ///
    /// Equivalent to [`create_file`](Self::create_file), [`copy`](Self::copy)
    /// and [`StagedFile::commit`].
    pub async fn save(
        &self,
        path: &Path,
        data: Bytes,
        policy: CollisionPolicy,
    ) -> Result<u64, StorageError> {
        let mut staged = self.create_file(path, policy).await?;
        let mut source: &[u8] = &data;
        let copied = self.copy(&mut source, staged.writer()).await?;
        staged.commit().await?;
        Ok(copied)
    }

    /// Create a writable file that will land at `path` once committed
    ///
    /// The bytes go to a staging file next to `path`. Readers and concurrent
    /// writers of the same name only ever see one complete upload. Dropping
    /// the handle without committing removes the staging file.
    pub async fn create_file(
        &self,
        path: &Path,
        policy: CollisionPolicy,
    ) -> Result<StagedFile, StorageError> {
        let target = path.to_path_buf();
        let dir = target
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let staged = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .tempfile_in(dir)
        })
        .await
        .map_err(|e| StorageError::Write(std::io::Error::other(e)))?
        .map_err(|source| StorageError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;

        let (file, temp_path) = staged.into_parts();
        Ok(StagedFile {
            file: File::from_std(file),
            temp_path,
            target,
            policy,
        })
    }

    /// Open an existing file for reading
    pub async fn open_file(&self, path: &Path) -> Result<File, StorageError> {
        File::open(path)
            .await
            .map_err(|source| StorageError::OpenFile {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Copy `reader` to the end into `writer`, flushing before returning
    pub async fn copy<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let copied = tokio::io::copy(reader, writer)
            .await
            .map_err(StorageError::Write)?;
        writer.flush().await.map_err(StorageError::Write)?;
        Ok(copied)
    }
}

/// Upload in progress: a staging file plus where it should end up
#[derive(Debug)]
pub struct StagedFile {
    file: File,
    temp_path: TempPath,
    target: PathBuf,
    policy: CollisionPolicy,
}

impl StagedFile {
    pub fn writer(&mut self) -> &mut File {
        &mut self.file
    }

    /// Rename the staging file onto its target
    ///
    /// `overwrite` replaces an existing file; `reject` refuses and reports
    /// [`StorageError::AlreadyExists`], leaving the existing file untouched.
    pub async fn commit(self) -> Result<(), StorageError> {
        let Self {
            file,
            temp_path,
            target,
            policy,
        } = self;
        drop(file);

        tokio::task::spawn_blocking(move || {
            // A failed persist hands the path back; dropping it removes the file
            let persisted = match policy {
                CollisionPolicy::Overwrite => temp_path.persist(&target),
                CollisionPolicy::Reject => temp_path.persist_noclobber(&target),
            };
            persisted.map_err(|e| {
                if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(target)
                } else {
                    StorageError::Persist {
                        path: target,
                        source: e.error,
                    }
                }
            })
        })
        .await
        .map_err(|e| StorageError::Write(std::io::Error::other(e)))?
    }
}

/// Whether `name` is a staging file of an upload in progress
fn is_staging_name(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX)
}
