//! Canvas document storage.
//!
//! A canvas is an arbitrary JSON object supplied by the client, stored together with two
//! system-owned fields:
//!
//! - `id`: the generated [`ResourceId`]
//! - `createAt`: the creation time, ISO-8601 UTC with millisecond precision
//!
//! ## Storage Layout
//!
//! ```text
//! canvas/
//!   <id>.json    # pretty-printed, two-space indentation
//! ```
//!
//! Entries are written once through an atomic rename and never modified afterwards.
//!
//! ## System fields
//!
//! [`Canvas`] keeps the client payload in a separate map and strips any client keys that
//! collide with the system fields, so `id` and `createAt` always carry the values assigned at
//! creation regardless of what the client sent.

use crate::config::CoreConfig;
use crate::constants::CANVAS_FILE_EXTENSION;
use crate::error::{CanvasError, CanvasResult};
use canvas_storage::{is_staging_name, StorageDir};
use canvas_uuid::ResourceId;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Payload keys owned by the system.
pub const RESERVED_FIELDS: [&str; 2] = ["id", "createAt"];

/// A stored canvas document.
///
/// Serialises flat: the payload's keys sit next to `id` and `createAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: ResourceId,

    #[serde(rename = "createAt", with = "iso_millis")]
    pub create_at: DateTime<Utc>,

    /// Client-supplied fields, never containing a [`RESERVED_FIELDS`] key.
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Canvas {
    /// Builds a canvas, dropping any payload keys that collide with system fields.
    pub fn new(id: ResourceId, create_at: DateTime<Utc>, mut content: Map<String, Value>) -> Self {
        for key in RESERVED_FIELDS {
            content.remove(key);
        }

        Self {
            id,
            create_at,
            content,
        }
    }
}

/// `createAt` as `YYYY-MM-DDTHH:MM:SS.mmmZ`, which sorts lexically in time order.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Service for creating and reading canvas documents.
///
/// All operations use blocking `std::fs` calls; async callers should run them on a
/// blocking thread.
#[derive(Clone, Debug)]
pub struct CanvasService {
    dir: StorageDir,
}

impl CanvasService {
    /// Creates the service over the configured canvas directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::StorageDirCreation` if the directory cannot be created.
    pub fn new(cfg: &CoreConfig) -> CanvasResult<Self> {
        let dir = StorageDir::open(cfg.canvas_dir()).map_err(CanvasError::StorageDirCreation)?;
        Ok(Self { dir })
    }

    /// Returns the directory holding the documents.
    pub fn directory(&self) -> &Path {
        self.dir.path()
    }

    /// Stores `document` as a new canvas and returns the stored record.
    ///
    /// # Arguments
    ///
    /// * `document` - Client payload; must be a JSON object
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `CanvasError::InvalidDocument` if `document` is not an object
    /// - `CanvasError::StorageDirCreation` / `CanvasError::FileWrite` if the entry cannot be
    ///   written
    pub fn create(&self, document: Value) -> CanvasResult<Canvas> {
        let content = match document {
            Value::Object(content) => content,
            other => {
                return Err(CanvasError::InvalidDocument(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let canvas = Canvas::new(ResourceId::new(), Utc::now().trunc_subsecs(3), content);
        let json = serde_json::to_vec_pretty(&canvas).map_err(CanvasError::Serialization)?;

        self.dir
            .ensure()
            .map_err(CanvasError::StorageDirCreation)?;
        self.dir
            .write_atomic(&entry_name(&canvas.id), &json)
            .map_err(CanvasError::FileWrite)?;

        tracing::info!(id = %canvas.id, "created canvas");
        Ok(canvas)
    }

    /// Lists every stored canvas, newest first.
    ///
    /// Recreates the directory if it has gone missing, in which case the list is empty. Order is
    /// by `createAt` descending, ties broken by identifier descending.
    ///
    /// # Errors
    ///
    /// Any entry that cannot be read or parsed fails the whole listing; no partial results are
    /// returned.
    pub fn list(&self) -> CanvasResult<Vec<Canvas>> {
        self.dir
            .ensure()
            .map_err(CanvasError::StorageDirCreation)?;

        let mut canvases = Vec::new();
        for entry in fs::read_dir(self.dir.path()).map_err(CanvasError::FileRead)? {
            let entry = entry.map_err(CanvasError::FileRead)?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if is_staging_name(name) || !is_canvas_entry(name) {
                continue;
            }
            if !entry.file_type().map_err(CanvasError::FileRead)?.is_file() {
                continue;
            }

            canvases.push(read_canvas(&entry.path())?);
        }

        canvases.sort_by(|a, b| {
            b.create_at
                .cmp(&a.create_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(canvases)
    }

    /// Reads the canvas stored under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `CanvasError::NotFound` if there is no such entry, or `identifier` is not a canonical
    ///   identifier
    /// - `CanvasError::FileRead` / `CanvasError::Deserialization` if the entry is unreadable
    pub fn get(&self, identifier: &str) -> CanvasResult<Canvas> {
        let id = ResourceId::parse(identifier)
            .map_err(|_| CanvasError::NotFound(identifier.to_owned()))?;
        let path = self.dir.entry_path(&entry_name(&id));

        match fs::metadata(&path) {
            Ok(_) => read_canvas(&path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CanvasError::NotFound(identifier.to_owned()))
            }
            Err(e) => Err(CanvasError::FileRead(e)),
        }
    }
}

fn entry_name(id: &ResourceId) -> String {
    format!("{}.{}", id, CANVAS_FILE_EXTENSION)
}

fn is_canvas_entry(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == CANVAS_FILE_EXTENSION)
}

fn read_canvas(path: &Path) -> CanvasResult<Canvas> {
    let bytes = fs::read(path).map_err(CanvasError::FileRead)?;
    serde_json::from_slice(&bytes).map_err(|source| CanvasError::Deserialization {
        path: path.to_path_buf(),
        source,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
