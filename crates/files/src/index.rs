//! In-memory `identifier → entry name` index for the blob directory.
//!
//! Entry names carry an extension the caller does not know, so resolving an identifier would
//! otherwise mean scanning the directory on every download. The index is filled from directory
//! scans and from successful uploads; it never holds names that were not seen on disk.

use canvas_storage::is_staging_name;
use canvas_uuid::ResourceId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub(crate) struct BlobIndex {
    entries: RwLock<HashMap<ResourceId, String>>,
}

impl BlobIndex {
    pub(crate) fn lookup(&self, id: &ResourceId) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Records an entry written by this process.
    pub(crate) fn insert(&self, id: ResourceId, name: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, name);
    }

    pub(crate) fn remove(&self, id: &ResourceId) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    /// Merges the names from a directory listing, in listing order.
    ///
    /// Names that are not entries are ignored. Identifiers already indexed keep their existing
    /// name, and within one listing the first name seen for an identifier wins.
    ///
    /// Returns the number of identifiers added.
    pub(crate) fn merge_listing<I>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut added = 0;
        for name in names {
            let Some(id) = entry_id(&name) else {
                continue;
            };
            entries.entry(id).or_insert_with(|| {
                added += 1;
                name
            });
        }
        added
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Identifier of the blob entry called `name`, if it is one.
///
/// A blob entry is named `<id>` or `<id>.<anything>`.
pub(crate) fn entry_id(name: &str) -> Option<ResourceId> {
    if is_staging_name(name) {
        return None;
    }
    let (id, rest) = ResourceId::split_prefix(name)?;
    (rest.is_empty() || rest.starts_with('.')).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_entry_id_accepts_bare_and_extended_names() {
        let id = ResourceId::parse(ID).unwrap();

        assert_eq!(entry_id(ID), Some(id));
        assert_eq!(entry_id(&format!("{ID}.jpg")), Some(id));
        assert_eq!(entry_id(&format!("{ID}.")), Some(id));
    }

    #[test]
    fn test_entry_id_rejects_other_names() {
        assert_eq!(entry_id(&format!("{ID}jpg")), None);
        assert_eq!(entry_id(&format!(".staging-{ID}")), None);
        assert_eq!(entry_id("notes.txt"), None);
    }

    #[test]
    fn test_merge_listing_first_name_wins() {
        let index = BlobIndex::default();
        let id = ResourceId::parse(ID).unwrap();

        let added = index.merge_listing(vec![
            format!("{ID}.png"),
            format!("{ID}.jpg"),
            "stray.tmp".to_string(),
        ]);

        assert_eq!(added, 1);
        assert_eq!(index.lookup(&id), Some(format!("{ID}.png")));
    }

    #[test]
    fn test_merge_listing_keeps_known_entries() {
        let index = BlobIndex::default();
        let id = ResourceId::parse(ID).unwrap();
        index.insert(id, format!("{ID}.pdf"));

        let added = index.merge_listing(vec![format!("{ID}.bin")]);

        assert_eq!(added, 0);
        assert_eq!(index.lookup(&id), Some(format!("{ID}.pdf")));
    }

    #[test]
    fn test_remove_evicts_entry() {
        let index = BlobIndex::default();
        let id = ResourceId::parse(ID).unwrap();
        index.insert(id, ID.to_string());

        index.remove(&id);

        assert_eq!(index.lookup(&id), None);
        assert_eq!(index.len(), 0);
    }
}
