use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid canvas document: {0}")]
    InvalidDocument(String),
    #[error("canvas not found: {0}")]
    NotFound(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write canvas file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read canvas file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize canvas: {0}")]
    Serialization(serde_json::Error),
    #[error(
        "failed to deserialize canvas {path}: {source}",
        path = path.display()
    )]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("file storage error: {0}")]
    Files(#[from] canvas_files::FilesError),
}

pub type CanvasResult<T> = std::result::Result<T, CanvasError>;
