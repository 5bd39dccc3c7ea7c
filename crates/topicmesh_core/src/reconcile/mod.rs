//! Mention reconciliation: merging prior, accepted and typed references.
//!
//! # Responsibility
//! - Compute the final association set for one content item from prior
//!   mentions, accepted suggestions, free-text topics and removals.
//! - Drive the editing session through a pure reducer ([`EditorState`]).
//!
//! # Invariants
//! - The output never holds two entries with the same dedup key.
//! - Order is prior first, then accepted, then manual, each in input order.
//! - A removal drops its reference whatever source produced it.
//! - Reconciling the output again with the same inputs yields the same set.
//!
//! # See also
//! - docs/architecture/mentions.md

pub mod editor;
pub mod legacy;
pub mod payload;
pub mod set;

use crate::model::entity::EntityRef;
use log::debug;

pub use editor::{EditorState, MentionEvent};
pub use legacy::{
    CompanyMentionRecord, ContactMentionRecord, LegacyMentions, TopicMentionRecord,
};
pub use payload::MentionPayload;
pub use set::MentionSet;

/// Merges the mention sources into one deduplicated set.
///
/// `removals` hold dedup keys or raw entity ids; see [`MentionSet::remove`].
pub fn reconcile(
    prior: &MentionSet,
    accepted: &[EntityRef],
    manual: &[EntityRef],
    removals: &[String],
) -> MentionSet {
    let mut merged = prior.clone();
    for reference in accepted.iter().chain(manual) {
        merged.insert(reference.clone());
    }

    let mut removed = 0usize;
    for id in removals {
        removed += usize::from(merged.remove(id).is_some());
    }

    debug!(
        "event=mentions_reconcile module=reconcile status=ok prior={} accepted={} manual={} removed={removed} total={}",
        prior.len(),
        accepted.len(),
        manual.len(),
        merged.len()
    );
    merged
}

/// Creates a free-text topic reference from user input.
///
/// Returns `None` for input that is empty after trimming or has nothing
/// alphanumeric to derive an id from.
pub fn manual_topic(raw: &str) -> Option<EntityRef> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    EntityRef::free_text(trimmed)
}
