//! Vocabulary-driven backend proposing novel topics.
//!
//! Finds industry terms (media channels, verticals, deal terms) in content
//! and proposes each as a free-text topic. It never consults the entity
//! index, so it keeps working when the index is unreachable.

use crate::model::entity::{EntityRef, TopicSuggestion};
use crate::suggest::markup::excerpt;
use crate::suggest::{BackendError, SuggestRequest, SuggestionBackend};
use once_cell::sync::Lazy;
use regex::Regex;

const KEYWORD_CONFIDENCE: f64 = 0.5;
const DEFAULT_MAX_TOPICS: usize = 5;

/// Canonical topic labels; matched case-insensitively on word boundaries.
const VOCABULARY: &[&str] = &[
    // Media channels
    "Programmatic",
    "Connected TV",
    "CTV",
    "OTT",
    "Streaming",
    "Podcast",
    "Out-of-Home",
    "Digital Out-of-Home",
    "Retail Media",
    "Social Media",
    "Influencer Marketing",
    "Display Advertising",
    "Video Advertising",
    "Audio Advertising",
    "Search Advertising",
    // Verticals
    "Automotive",
    "CPG",
    "Healthcare",
    "Pharma",
    "Financial Services",
    "Gaming",
    "Sports",
    "Entertainment",
    "Travel",
    "Retail",
    // Deal terms and industry concerns
    "RFP",
    "Agency Review",
    "Account Win",
    "Sponsorship",
    "Partnership",
    "Acquisition",
    "Measurement",
    "Attribution",
    "Brand Safety",
    "Ad Fraud",
    "First-Party Data",
    "Privacy",
];

static VOCABULARY_RE: Lazy<Regex> = Lazy::new(|| {
    let mut terms = VOCABULARY
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>();
    // Longest first so "Digital Out-of-Home" wins over "Out-of-Home".
    terms.sort_by_key(|term| std::cmp::Reverse(term.len()));
    Regex::new(&format!(r"(?i)\b(?:{})\b", terms.join("|"))).expect("valid vocabulary regex")
});

/// Backend proposing free-text topics from a fixed industry vocabulary.
pub struct KeywordSuggester {
    max_topics: usize,
}

impl Default for KeywordSuggester {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordSuggester {
    pub fn new() -> Self {
        Self {
            max_topics: DEFAULT_MAX_TOPICS,
        }
    }

    pub fn with_max_topics(max_topics: usize) -> Self {
        Self { max_topics }
    }
}

impl SuggestionBackend for KeywordSuggester {
    fn suggest(&self, request: &SuggestRequest) -> Result<Vec<TopicSuggestion>, BackendError> {
        let text = request.full_text();
        let mut seen: Vec<String> = Vec::new();
        let mut suggestions = Vec::new();

        for found in VOCABULARY_RE.find_iter(&text) {
            if suggestions.len() >= self.max_topics {
                break;
            }
            let Some(label) = canonical_label(found.as_str()) else {
                continue;
            };
            let Some(reference) = EntityRef::free_text(label) else {
                continue;
            };
            let key = reference.dedup_key();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            suggestions.push(TopicSuggestion::new(
                reference
                    .with_confidence(KEYWORD_CONFIDENCE)
                    .with_context(excerpt(&text, found.start(), found.end())),
            ));
        }

        Ok(suggestions)
    }
}

fn canonical_label(matched: &str) -> Option<&'static str> {
    VOCABULARY
        .iter()
        .copied()
        .find(|term| term.eq_ignore_ascii_case(matched))
}
