//! Entity search resolver.
//!
//! # Responsibility
//! - Guard the index against too-short queries.
//! - Normalize caller limits and shape index matches into references.
//! - In restricted mode, keep only companies and contacts and refine company
//!   kinds from their category label.
//!
//! # Invariants
//! - Never returns more than the normalized limit.
//! - Every result is an exact selection: confidence 1.0, existing entity.
//! - Index failures degrade to `[]` and are logged at `warn`.

use crate::config::EngineConfig;
use crate::index::{EntityIndex, IndexMatch};
use crate::model::company_type::kind_for_company_label;
use crate::model::entity::{EntityKind, EntityRef};
use log::{debug, warn};
use std::time::Instant;

/// How many index rows restricted mode reads per requested result.
const RESTRICTED_OVERFETCH: u32 = 3;

/// Which entity kinds a resolver returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Every kind the index knows.
    Unrestricted,
    /// Companies (with refined sub-kind) and contacts only.
    Restricted,
}

impl SearchMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::Restricted => "restricted",
        }
    }
}

pub struct EntitySearchResolver<I> {
    index: I,
    mode: SearchMode,
    min_query_chars: usize,
    default_limit: u32,
    max_limit: u32,
}

impl<I: EntityIndex> EntitySearchResolver<I> {
    pub fn new(index: I, mode: SearchMode) -> Self {
        Self::with_config(index, mode, &EngineConfig::default())
    }

    pub fn unrestricted(index: I) -> Self {
        Self::new(index, SearchMode::Unrestricted)
    }

    pub fn restricted(index: I) -> Self {
        Self::new(index, SearchMode::Restricted)
    }

    pub fn with_config(index: I, mode: SearchMode, config: &EngineConfig) -> Self {
        Self {
            index,
            mode,
            min_query_chars: config.min_query_chars,
            default_limit: config.search_default_limit,
            max_limit: config.search_max_limit,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Maps `0` to the default limit and caps at the maximum.
    pub fn normalize_limit(&self, limit: u32) -> u32 {
        if limit == 0 {
            self.default_limit
        } else {
            limit.min(self.max_limit)
        }
    }

    /// Returns entities matching `query`.
    ///
    /// Returns `[]` without touching the index when the trimmed query is
    /// shorter than the configured minimum.
    pub fn search(&self, query: &str, limit: u32) -> Vec<EntityRef> {
        let query = query.trim();
        if query.chars().count() < self.min_query_chars {
            return Vec::new();
        }

        let limit = self.normalize_limit(limit);
        let fetch = match self.mode {
            SearchMode::Unrestricted => limit,
            SearchMode::Restricted => limit.saturating_mul(RESTRICTED_OVERFETCH),
        };

        let started_at = Instant::now();
        let matches = match self.index.find(query, fetch) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(
                    "event=entity_search module=search status=degraded mode={} duration_ms={} error={err}",
                    self.mode.as_str(),
                    started_at.elapsed().as_millis()
                );
                return Vec::new();
            }
        };

        let fetched = matches.len();
        let mut seen: Vec<String> = Vec::new();
        let mut results = Vec::new();
        for found in matches {
            let Some(reference) = self.shape(found) else {
                continue;
            };
            let key = reference.dedup_key();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            results.push(reference);
            if results.len() >= limit as usize {
                break;
            }
        }

        debug!(
            "event=entity_search module=search status=ok mode={} duration_ms={} fetched={fetched} returned={}",
            self.mode.as_str(),
            started_at.elapsed().as_millis(),
            results.len()
        );
        results
    }

    fn shape(&self, found: IndexMatch) -> Option<EntityRef> {
        let kind = match self.mode {
            SearchMode::Unrestricted => found.kind,
            SearchMode::Restricted => restricted_kind(&found)?,
        };
        let mut reference = EntityRef::existing(kind, found.id, found.display_name);
        if let Some(description) = found.description {
            reference = reference.with_description(description);
        }
        Some(reference)
    }
}

/// Company-family matches refined by label, contacts kept, others dropped.
fn restricted_kind(found: &IndexMatch) -> Option<EntityKind> {
    match found.kind {
        EntityKind::Company => Some(kind_for_company_label(found.category.as_deref())),
        EntityKind::Contact
        | EntityKind::Agency
        | EntityKind::Advertiser
        | EntityKind::Industry
        | EntityKind::Publisher
        | EntityKind::DspSsp
        | EntityKind::Adtech => Some(found.kind),
        EntityKind::Topic | EntityKind::Category => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{EntitySearchResolver, SearchMode};
    use crate::index::{EntityIndex, IndexMatch, IndexResult};

    struct NoIndex;

    impl EntityIndex for NoIndex {
        fn find(&self, _: &str, _: u32) -> IndexResult<Vec<IndexMatch>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn limit_normalization_defaults_and_caps() {
        let resolver = EntitySearchResolver::new(NoIndex, SearchMode::Unrestricted);
        assert_eq!(resolver.normalize_limit(0), 10);
        assert_eq!(resolver.normalize_limit(7), 7);
        assert_eq!(resolver.normalize_limit(500), 50);
    }
}
