//! Resource identifiers.
//!
//! Every stored file and canvas is addressed by a random 128-bit identifier. The identifier is
//! also the stem of the entry's filename on disk, so its string form must be a safe path
//! segment.
//!
//! ## Canonical form
//! - Length: 36
//! - Characters: `0-9`, `a-f` and `-` at positions 8, 13, 18 and 23
//! - Example: `550e8400-e29b-41d4-a716-446655440000`
//!
//! Notes:
//! - This is the same value you would get from `Uuid::new_v4().hyphenated().to_string()`.
//! - Externally supplied identifiers (URL path segments) must already be canonical. Use
//!   [`ResourceId::parse`] to validate them; anything else cannot name a stored entry.

mod service;

pub use service::{ResourceId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
