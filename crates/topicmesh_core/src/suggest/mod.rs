//! Content-derived topic suggestions.
//!
//! # Responsibility
//! - Guard backends against content too short to be worth analyzing.
//! - Merge, rank and truncate what backends propose.
//! - Degrade every backend failure to "no suggestions".
//!
//! # Invariants
//! - Content shorter than the configured minimum (after trimming) never
//!   reaches a backend.
//! - Returned suggestions have unique dedup keys and are ordered by
//!   confidence, then existing entities first, then display name.
//! - `suggest` never fails; failures are logged at `warn`.
//!
//! # See also
//! - docs/architecture/mentions.md

pub mod composite;
pub mod index_backend;
pub mod keyword;
pub mod markup;

use crate::config::EngineConfig;
use crate::index::IndexError;
use crate::model::entity::TopicSuggestion;
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub use composite::CompositeSuggester;
pub use index_backend::IndexSuggester;
pub use keyword::KeywordSuggester;
pub use markup::{extract_markup_mentions, MarkupMention};

/// Input handed to a [`SuggestionBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    pub content: String,
    pub title: Option<String>,
    /// Id of an entity the content is known to be about.
    pub scope_hint: Option<String>,
}

impl SuggestRequest {
    /// Title and content joined as one analyzable text.
    pub fn full_text(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => format!("{title}\n{}", self.content),
            _ => self.content.clone(),
        }
    }
}

#[derive(Debug)]
pub enum BackendError {
    Index(IndexError),
    Unavailable(String),
    InvalidResponse(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "suggestion backend unavailable: {message}"),
            Self::InvalidResponse(message) => {
                write!(f, "suggestion backend returned invalid data: {message}")
            }
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Index(err) => Some(err),
            Self::Unavailable(_) | Self::InvalidResponse(_) => None,
        }
    }
}

impl From<IndexError> for BackendError {
    fn from(value: IndexError) -> Self {
        Self::Index(value)
    }
}

/// Something that proposes topics for a piece of content.
pub trait SuggestionBackend {
    fn suggest(&self, request: &SuggestRequest) -> Result<Vec<TopicSuggestion>, BackendError>;
}

impl<T: SuggestionBackend + ?Sized> SuggestionBackend for &T {
    fn suggest(&self, request: &SuggestRequest) -> Result<Vec<TopicSuggestion>, BackendError> {
        (**self).suggest(request)
    }
}

impl<T: SuggestionBackend + ?Sized> SuggestionBackend for Box<T> {
    fn suggest(&self, request: &SuggestRequest) -> Result<Vec<TopicSuggestion>, BackendError> {
        (**self).suggest(request)
    }
}

/// Guarded, fail-soft front of a [`SuggestionBackend`].
pub struct SuggestionEngine<B> {
    backend: B,
    min_content_chars: usize,
    limit: usize,
}

impl<B: SuggestionBackend> SuggestionEngine<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, &EngineConfig::default())
    }

    pub fn with_config(backend: B, config: &EngineConfig) -> Self {
        Self {
            backend,
            min_content_chars: config.min_content_chars,
            limit: config.suggestion_limit,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Proposes topics for `content`.
    ///
    /// Returns `[]` for short content and when the backend fails.
    pub fn suggest(
        &self,
        content: &str,
        title: Option<&str>,
        scope_hint: Option<&str>,
    ) -> Vec<TopicSuggestion> {
        let content_chars = content.trim().chars().count();
        if content_chars < self.min_content_chars {
            debug!(
                "event=suggest module=suggest status=skipped reason=short_content chars={content_chars}"
            );
            return Vec::new();
        }

        let request = SuggestRequest {
            content: content.to_string(),
            title: title.map(str::to_string),
            scope_hint: scope_hint
                .map(str::trim)
                .filter(|hint| !hint.is_empty())
                .map(str::to_string),
        };

        let started_at = Instant::now();
        match self.backend.suggest(&request) {
            Ok(raw) => {
                let raw_count = raw.len();
                let ranked = rank_suggestions(raw, self.limit);
                info!(
                    "event=suggest module=suggest status=ok duration_ms={} raw={raw_count} returned={}",
                    started_at.elapsed().as_millis(),
                    ranked.len()
                );
                ranked
            }
            Err(err) => {
                warn!(
                    "event=suggest module=suggest status=degraded duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Vec::new()
            }
        }
    }
}

/// Merges same-key suggestions, orders them and keeps the first `limit`.
pub fn rank_suggestions(raw: Vec<TopicSuggestion>, limit: usize) -> Vec<TopicSuggestion> {
    let mut merged: Vec<(String, TopicSuggestion)> = Vec::with_capacity(raw.len());
    for suggestion in raw {
        let key = suggestion.dedup_key();
        match merged.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => existing.reference.absorb(suggestion.reference),
            None => merged.push((key, suggestion)),
        }
    }

    let mut ranked = merged
        .into_iter()
        .map(|(_, suggestion)| suggestion)
        .collect::<Vec<_>>();
    ranked.sort_by(compare_suggestions);
    ranked.truncate(limit);
    ranked
}

fn compare_suggestions(left: &TopicSuggestion, right: &TopicSuggestion) -> Ordering {
    let (left, right) = (&left.reference, &right.reference);
    right
        .confidence
        .total_cmp(&left.confidence)
        .then_with(|| right.is_existing.cmp(&left.is_existing))
        .then_with(|| {
            left.display_name
                .to_lowercase()
                .cmp(&right.display_name.to_lowercase())
        })
}
