//! Internal implementation of the resource identifier.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Byte offsets of the hyphens in the canonical form.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Length of the canonical form.
const CANONICAL_LEN: usize = 36;

/// Identifier of a stored file or canvas (canonical hyphenated lowercase UUID).
///
/// Once constructed, the contained UUID always renders in canonical form, so it can be joined
/// onto a storage directory without further checks.
///
/// # Construction
/// - [`ResourceId::new`] generates a fresh random identifier for a new entry.
/// - [`ResourceId::parse`] validates an externally supplied identifier.
///
/// Identifiers are never checked against existing entries before use; a collision in the
/// 122 random bits of a v4 UUID is treated as impossible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Uuid);

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceId {
    /// Generates a new random identifier.
    ///
    /// Backed by the operating system's randomness source. If that source is unavailable the
    /// `uuid` crate panics; there is no sensible way to continue without it.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be in canonical form.
    ///
    /// Uppercase, braced, URN or simple (unhyphenated) forms are rejected rather than
    /// normalised, so a single entry can never be reached through two different spellings.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "identifier must be 36 lowercase hex characters with hyphens, got: '{}'",
                input
            )));
        }

        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid identifier '{}': {}", input, e)))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic: exactly 36 bytes, hyphens at the four group boundaries and lowercase hex
    /// everywhere else.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == CANONICAL_LEN
            && input.bytes().enumerate().all(|(i, b)| {
                if HYPHEN_POSITIONS.contains(&i) {
                    b == b'-'
                } else {
                    matches!(b, b'0'..=b'9' | b'a'..=b'f')
                }
            })
    }

    /// Splits `name` into an identifier and the remainder, if `name` starts with a canonical
    /// identifier.
    ///
    /// Used when resolving directory entries named `<id><suffix>`.
    pub fn split_prefix(name: &str) -> Option<(Self, &str)> {
        let head = name.get(..CANONICAL_LEN)?;
        let id = Self::parse(head).ok()?;
        Some((id, &name[CANONICAL_LEN..]))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ResourceId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_identifier() {
        let id = ResourceId::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 36);
        assert!(ResourceId::is_canonical(&canonical));
    }

    #[test]
    fn test_new_generates_distinct_identifiers() {
        let first = ResourceId::new();
        let second = ResourceId::new();

        assert_ne!(first, second);
    }

    #[test]
    fn test_parse_valid_canonical_identifier() {
        let canonical = "550e8400-e29b-41d4-a716-446655440000";
        let result = ResourceId::parse(canonical);

        assert!(result.is_ok());
        assert_eq!(result.unwrap().to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_simple_form() {
        let simple = "550e8400e29b41d4a716446655440000";
        let result = ResourceId::parse(simple);

        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("36 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        assert!(ResourceId::parse("550E8400-E29B-41D4-A716-446655440000").is_err());
    }

    #[test]
    fn test_parse_rejects_path_traversal() {
        assert!(ResourceId::parse("../../../../../../etc/passwd/xxxxxx").is_err());
        assert!(ResourceId::parse("does-not-exist").is_err());
    }

    #[test]
    fn test_is_canonical_invalid() {
        // Hyphen in the wrong place
        assert!(!ResourceId::is_canonical(
            "550e840-0e29b-41d4-a716-446655440000"
        ));

        // Too short
        assert!(!ResourceId::is_canonical(
            "550e8400-e29b-41d4-a716-44665544000"
        ));

        // Invalid characters
        assert!(!ResourceId::is_canonical(
            "550e8400-e29b-41d4-a716-4466554400zz"
        ));

        // Empty string
        assert!(!ResourceId::is_canonical(""));
    }

    #[test]
    fn test_split_prefix() {
        let (id, rest) = ResourceId::split_prefix("550e8400-e29b-41d4-a716-446655440000.tar.gz")
            .expect("name starts with an identifier");

        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(rest, ".tar.gz");

        assert!(ResourceId::split_prefix(".staging-abc").is_none());
        assert!(ResourceId::split_prefix("short").is_none());
    }

    #[test]
    fn test_split_prefix_multibyte_boundary() {
        // 35 ASCII bytes followed by a multi-byte character straddling byte 36
        let name = format!("{}é", "a".repeat(35));
        assert!(ResourceId::split_prefix(&name).is_none());
    }

    #[test]
    fn test_from_str_round_trip() {
        let id = ResourceId::new();
        let parsed: ResourceId = id.to_string().parse().unwrap();

        assert_eq!(parsed, id);
    }

    #[test]
    fn test_serde_as_string() {
        let id = ResourceId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
        assert!(serde_json::from_str::<ResourceId>("\"not-an-id\"").is_err());
    }
}
