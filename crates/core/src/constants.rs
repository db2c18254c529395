//! Constants used throughout the canvas core crate.
//!
//! Directory names, file suffixes and defaults live here so the on-disk layout is defined in
//! one place.

/// Directory name for uploaded file storage.
pub const FILE_DIR_NAME: &str = "file";

/// Directory name for canvas document storage.
pub const CANVAS_DIR_NAME: &str = "canvas";

/// Default data directory when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = ".";

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Extension (without the dot) of canvas document entries.
pub const CANVAS_FILE_EXTENSION: &str = "json";
