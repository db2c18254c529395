//! # Canvas Core
//!
//! Core storage logic for the canvas service.
//!
//! This crate contains pure data operations and file/folder management:
//! - Canvas document creation, listing and lookup ([`CanvasService`])
//! - Startup configuration and the on-disk layout ([`CoreConfig`])
//! - Access to the blob store for uploaded files ([`BlobStore`], re-exported from
//!   `canvas-files`)
//!
//! **No API concerns**: HTTP routing, status codes and request decoding belong in `api-rest`.

pub mod canvas;
pub mod config;
pub mod constants;
pub mod error;

pub use canvas::{Canvas, CanvasService, RESERVED_FIELDS};
pub use canvas_files::{BlobStore, FilesError, StoredBlob};
pub use canvas_uuid::ResourceId;
pub use config::{data_dir_from_env_value, port_from_env_value, CoreConfig};
pub use constants::*;
pub use error::{CanvasError, CanvasResult};
