use std::path::PathBuf;

/// Failures surfaced by the filesystem gateway
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("path escapes the storage root: {0}")]
    OutsideRoot(String),
    #[error("failed to create directory {path}: {source}", path = path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read directory {path}: {source}", path = path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("failed to create file {path}: {source}", path = path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open file {path}: {source}", path = path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file contents: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to move upload into place at {path}: {source}", path = path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
