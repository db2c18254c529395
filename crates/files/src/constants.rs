//! Constants used by the blob store.

/// Media type reported when the leading bytes of a blob match no known signature.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Number of leading bytes inspected when sniffing a blob's media type.
pub const SNIFF_LEN: usize = 8192;
