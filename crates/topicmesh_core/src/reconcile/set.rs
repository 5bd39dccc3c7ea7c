//! Insertion-ordered, dedup-keyed mention collection.
//!
//! # Invariants
//! - No two entries share a dedup key.
//! - Iteration order is first-insertion order; re-inserting a key merges
//!   into the existing entry in place.

use crate::model::entity::EntityRef;
use log::debug;

/// The association set attached to one content item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentionSet {
    entries: Vec<(String, EntityRef)>,
}

impl MentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from references, merging duplicates in order.
    pub fn from_refs(refs: impl IntoIterator<Item = EntityRef>) -> Self {
        let mut set = Self::new();
        for reference in refs {
            set.insert(reference);
        }
        set
    }

    /// Inserts one reference.
    ///
    /// Returns `true` when the key was new, `false` when the reference was
    /// merged into an existing entry.
    pub fn insert(&mut self, reference: EntityRef) -> bool {
        let key = reference.dedup_key();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            existing.absorb(reference);
            return false;
        }
        self.entries.push((key, reference));
        true
    }

    /// Resolves a dedup key, or a raw entity id carried by exactly one
    /// entry, to that entry's key.
    ///
    /// A raw id shared by several kinds (`company:x1`, `contact:x1`) is
    /// ambiguous and resolves to `None`.
    pub fn resolve_key(&self, id_or_key: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.iter().find(|(key, _)| key == id_or_key) {
            return Some(key);
        }
        let mut hits = self
            .entries
            .iter()
            .filter(|(_, reference)| reference.id == id_or_key);
        let (key, _) = hits.next()?;
        if hits.next().is_some() {
            debug!("event=mention_resolve module=reconcile status=ignored reason=ambiguous_id");
            return None;
        }
        Some(key)
    }

    /// Removes the entry [`resolve_key`](Self::resolve_key) finds.
    pub fn remove(&mut self, id_or_key: &str) -> Option<EntityRef> {
        let key = self.resolve_key(id_or_key)?.to_string();
        let position = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Keeps only the references `keep` accepts, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&EntityRef) -> bool) {
        self.entries.retain(|(_, reference)| keep(reference));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&EntityRef> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, reference)| reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.entries.iter().map(|(_, reference)| reference)
    }

    /// Dedup keys in display order; the `topicIds` persisted for the item.
    pub fn topic_ids(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn into_refs(self) -> Vec<EntityRef> {
        self.entries
            .into_iter()
            .map(|(_, reference)| reference)
            .collect()
    }
}

impl FromIterator<EntityRef> for MentionSet {
    fn from_iter<T: IntoIterator<Item = EntityRef>>(iter: T) -> Self {
        Self::from_refs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::MentionSet;
    use crate::model::entity::{EntityKind, EntityRef};

    #[test]
    fn insert_merges_same_key_in_place() {
        let mut set = MentionSet::new();
        assert!(set.insert(EntityRef::existing(EntityKind::Company, "c1", "Acme")));
        assert!(set.insert(EntityRef::existing(EntityKind::Contact, "p1", "Jane Doe")));
        assert!(!set.insert(
            EntityRef::existing(EntityKind::Agency, "c1", "Acme Agency").with_description("Agency")
        ));

        assert_eq!(set.len(), 2);
        assert_eq!(set.topic_ids(), vec!["company:c1", "contact:p1"]);
        let merged = set.get("company:c1").expect("company should exist");
        assert_eq!(merged.display_name, "Acme");
        assert_eq!(merged.description.as_deref(), Some("Agency"));
    }

    #[test]
    fn remove_prefers_exact_key_over_raw_id() {
        let mut set = MentionSet::from_refs([
            EntityRef::existing(EntityKind::Company, "x1", "Acme"),
            EntityRef::existing(EntityKind::Contact, "x1", "Jane Doe"),
            EntityRef::existing(EntityKind::Contact, "p2", "John Roe"),
        ]);

        assert_eq!(set.remove("contact:x1").unwrap().display_name, "Jane Doe");
        assert_eq!(set.topic_ids(), vec!["company:x1", "contact:p2"]);

        assert_eq!(set.remove("p2").unwrap().display_name, "John Roe");
        assert_eq!(set.remove("x1").unwrap().kind, EntityKind::Company);
        assert!(set.is_empty());
        assert!(set.remove("missing").is_none());
    }

    #[test]
    fn raw_id_shared_by_two_kinds_removes_nothing() {
        let mut set = MentionSet::from_refs([
            EntityRef::existing(EntityKind::Company, "x1", "Acme"),
            EntityRef::existing(EntityKind::Contact, "x1", "Jane Doe"),
        ]);

        assert_eq!(set.resolve_key("x1"), None);
        assert!(set.remove("x1").is_none());
        assert_eq!(set.len(), 2);
        assert_eq!(set.resolve_key("company:x1"), Some("company:x1"));
    }
}
