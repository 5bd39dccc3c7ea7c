//! Slug normalization for free-text topics.
//!
//! # Invariants
//! - Slugs are lowercase alphanumeric runs joined by a single `-`.
//! - Slugs never start or end with `-`.
//! - Equivalent spellings ("Ad  Fraud!", "ad-fraud") share one slug.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix for synthesized free-text topic ids.
///
/// Keeps synthesized ids disjoint from persisted entity ids, which never
/// carry this prefix.
pub const FREE_TEXT_TOPIC_PREFIX: &str = "manual-";

static NON_ALNUM_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid separator regex"));

/// Normalizes raw text into a slug.
///
/// Returns `None` when nothing alphanumeric remains.
pub fn slugify(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let collapsed = NON_ALNUM_RUN_RE.replace_all(&lowered, "-");
    let slug = collapsed.trim_matches('-');
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// Synthesizes the id of a free-text topic from its display name.
pub fn free_text_topic_id(raw: &str) -> Option<String> {
    slugify(raw).map(|slug| format!("{FREE_TEXT_TOPIC_PREFIX}{slug}"))
}

/// Returns whether `id` was synthesized by [`free_text_topic_id`].
pub fn is_free_text_topic_id(id: &str) -> bool {
    id.starts_with(FREE_TEXT_TOPIC_PREFIX)
}
