//! Local suggestion backend driven by the entity index.
//!
//! # Responsibility
//! - Turn explicit mention markup into exact suggestions.
//! - Find capitalized name-like runs and resolve them through
//!   [`EntityIndex`]: the whole run first, then the run without leading
//!   stopwords, then shorter sub-runs that must match a name exactly.
//!
//! # Invariants
//! - Only persisted entities are proposed; novel topics are left to other
//!   backends.
//! - Markup mentions never trigger an index lookup.
//! - Inferred confidence stays below 1.0, which is reserved for exact
//!   selections.

use crate::index::EntityIndex;
use crate::model::entity::{EntityRef, TopicSuggestion};
use crate::suggest::markup::{blank_out_markup, excerpt, extract_markup_mentions};
use crate::suggest::{BackendError, SuggestRequest, SuggestionBackend};
use once_cell::sync::Lazy;
use regex::Regex;

const EXACT_MATCH_CONFIDENCE: f64 = 0.9;
const PREFIX_MATCH_CONFIDENCE: f64 = 0.6;
const SCOPE_HINT_BOOST: f64 = 0.05;
const INFERRED_CONFIDENCE_CAP: f64 = 0.99;

const WORD_SEPARATORS: &[char] = &[' ', '\t'];
const TRAILING_PUNCTUATION: &[char] = &['-', '\'', '’'];

const DEFAULT_MATCHES_PER_CANDIDATE: u32 = 3;
const DEFAULT_MAX_CANDIDATES: usize = 12;
const MAX_FALLBACKS_PER_CANDIDATE: usize = 8;

static CAPITALIZED_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\p{Lu}[\p{L}\p{N}&'’-]*(?:[ \t]+\p{Lu}[\p{L}\p{N}&'’-]*)*")
        .expect("valid capitalized run regex")
});

/// Capitalized words that start sentences far more often than names.
const LEADING_STOPWORDS: &[&str] = &[
    "a", "about", "after", "also", "an", "and", "any", "anyone", "are", "at", "before", "but",
    "did", "do", "does", "for", "from", "good", "great", "has", "have", "he", "hello", "here",
    "hi", "how", "i", "if", "in", "is", "it", "its", "just", "looking", "my", "new", "no", "ok",
    "on", "or", "our", "please", "she", "so", "some", "thank", "thanks", "that", "the", "there",
    "these", "they", "this", "those", "was", "we", "what", "when", "where", "which", "who", "why",
    "with", "yes", "you", "your",
];

/// A span of content text looked up in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Phrase {
    text: String,
    start: usize,
    end: usize,
}

/// Lookups derived from one capitalized run, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    /// The whole run, then the run without leading stopwords.
    phrases: Vec<Phrase>,
    /// Shorter sub-runs tried when no phrase matched; exact names only.
    fallbacks: Vec<Phrase>,
}

/// Suggestion backend resolving content phrases against an entity index.
pub struct IndexSuggester<I> {
    index: I,
    matches_per_candidate: u32,
    max_candidates: usize,
}

impl<I: EntityIndex> IndexSuggester<I> {
    pub fn new(index: I) -> Self {
        Self {
            index,
            matches_per_candidate: DEFAULT_MATCHES_PER_CANDIDATE,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    /// Caps how many distinct capitalized runs are resolved per request.
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Looks `phrase` up and pushes every scored hit.
    ///
    /// Returns whether at least one hit was kept.
    fn resolve(
        &self,
        phrase: &Phrase,
        exact_only: bool,
        request: &SuggestRequest,
        text: &str,
        out: &mut Vec<TopicSuggestion>,
    ) -> Result<bool, BackendError> {
        let mut kept = false;
        for found in self.index.find(&phrase.text, self.matches_per_candidate)? {
            let Some(mut confidence) = score_match(&phrase.text, &found.display_name) else {
                continue;
            };
            if exact_only && confidence < EXACT_MATCH_CONFIDENCE {
                continue;
            }
            if request.scope_hint.as_deref() == Some(found.id.as_str()) {
                confidence = (confidence + SCOPE_HINT_BOOST).min(INFERRED_CONFIDENCE_CAP);
            }

            let mut reference = EntityRef::existing(found.kind, found.id, found.display_name)
                .with_confidence(confidence)
                .with_context(excerpt(text, phrase.start, phrase.end));
            if let Some(description) = found.description {
                reference = reference.with_description(description);
            }
            out.push(TopicSuggestion::new(reference));
            kept = true;
        }
        Ok(kept)
    }
}

impl<I: EntityIndex> SuggestionBackend for IndexSuggester<I> {
    fn suggest(&self, request: &SuggestRequest) -> Result<Vec<TopicSuggestion>, BackendError> {
        let text = request.full_text();
        let mut suggestions = extract_markup_mentions(&text)
            .iter()
            .map(|mention| TopicSuggestion::new(mention.to_reference(&text)))
            .collect::<Vec<_>>();

        for candidate in candidate_phrases(&text)
            .into_iter()
            .take(self.max_candidates)
        {
            let mut resolved = false;
            for phrase in &candidate.phrases {
                if self.resolve(phrase, false, request, &text, &mut suggestions)? {
                    resolved = true;
                    break;
                }
            }
            if resolved {
                continue;
            }

            let mut covered: Vec<(usize, usize)> = Vec::new();
            for phrase in &candidate.fallbacks {
                let overlaps = covered
                    .iter()
                    .any(|&(start, end)| phrase.start < end && start < phrase.end);
                if !overlaps && self.resolve(phrase, true, request, &text, &mut suggestions)? {
                    covered.push((phrase.start, phrase.end));
                }
            }
        }

        Ok(suggestions)
    }
}

/// Scores an index hit against the phrase that produced it.
///
/// Returns `None` for hits that are neither an exact nor a prefix match.
fn score_match(phrase: &str, display_name: &str) -> Option<f64> {
    let phrase = phrase.to_lowercase();
    let name = display_name.trim().to_lowercase();
    if name == phrase {
        Some(EXACT_MATCH_CONFIDENCE)
    } else if name.starts_with(&phrase) {
        Some(PREFIX_MATCH_CONFIDENCE)
    } else {
        None
    }
}

/// One lookup candidate per capitalized run outside mention markup,
/// deduplicated case-insensitively in order of appearance.
fn candidate_phrases(text: &str) -> Vec<Candidate> {
    let blanked = blank_out_markup(text);
    let mut seen: Vec<String> = Vec::new();
    let mut candidates = Vec::new();

    for found in CAPITALIZED_RUN_RE.find_iter(&blanked) {
        let words = run_words(found.as_str(), found.start());
        let Some(candidate) = candidate_for_run(&words) else {
            continue;
        };
        let lowered = candidate.phrases[0].text.to_lowercase();
        if seen.contains(&lowered) {
            continue;
        }
        seen.push(lowered);
        candidates.push(candidate);
    }
    candidates
}

/// Splits a run into words with absolute byte offsets.
///
/// Trailing punctuation is trimmed from every word and a possessive from
/// the last one.
fn run_words(run: &str, base: usize) -> Vec<Phrase> {
    let mut words = Vec::new();
    let mut cursor = base;
    for piece in run.split(WORD_SEPARATORS) {
        let start = cursor;
        cursor += piece.len() + 1;
        let text = piece.trim_end_matches(TRAILING_PUNCTUATION);
        if text.is_empty() {
            continue;
        }
        words.push(Phrase {
            text: text.to_string(),
            start,
            end: start + text.len(),
        });
    }
    if let Some(last) = words.last_mut() {
        let stripped = strip_possessive(&last.text).trim_end_matches(TRAILING_PUNCTUATION);
        if stripped.len() < last.text.len() {
            last.end = last.start + stripped.len();
            last.text = stripped.to_string();
        }
        if last.text.is_empty() {
            words.pop();
        }
    }
    words
}

fn candidate_for_run(words: &[Phrase]) -> Option<Candidate> {
    let leading = words.iter().take_while(|word| is_stopword(&word.text)).count();
    if leading == words.len() {
        return None;
    }

    let mut phrases = vec![join_words(words)];
    if leading > 0 {
        phrases.push(join_words(&words[leading..]));
    }
    phrases.retain(|phrase| phrase.text.chars().count() >= 2);
    if phrases.is_empty() {
        return None;
    }

    let mut fallbacks = Vec::new();
    for len in (1..words.len()).rev() {
        for window in words.windows(len) {
            if is_stopword(&window[0].text) || window[0].text.chars().count() < 2 {
                continue;
            }
            let phrase = join_words(window);
            if !phrases.contains(&phrase) && fallbacks.len() < MAX_FALLBACKS_PER_CANDIDATE {
                fallbacks.push(phrase);
            }
        }
    }
    Some(Candidate { phrases, fallbacks })
}

/// Joins adjacent words with single spaces; offsets span the originals.
fn join_words(words: &[Phrase]) -> Phrase {
    let text = words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Phrase {
        text,
        start: words.first().map_or(0, |word| word.start),
        end: words.last().map_or(0, |word| word.end),
    }
}

fn is_stopword(word: &str) -> bool {
    LEADING_STOPWORDS.contains(&word.to_lowercase().as_str())
}

fn strip_possessive(phrase: &str) -> &str {
    phrase
        .strip_suffix("'s")
        .or_else(|| phrase.strip_suffix("’s"))
        .unwrap_or(phrase)
}

#[cfg(test)]
mod tests {
    use super::{candidate_phrases, score_match};

    fn lookups(text: &str) -> Vec<(Vec<String>, Vec<String>)> {
        candidate_phrases(text)
            .into_iter()
            .map(|candidate| {
                (
                    candidate.phrases.into_iter().map(|p| p.text).collect(),
                    candidate.fallbacks.into_iter().map(|p| p.text).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn candidates_skip_stopword_runs_and_possessives() {
        assert_eq!(
            lookups("Great case study about Nike's programmatic strategy."),
            vec![(vec!["Nike".to_string()], Vec::new())]
        );
        let found = lookups("The team at Horizon Media met Jane Doe. Horizon Media again.");
        let heads: Vec<_> = found.iter().map(|(phrases, _)| phrases[0].as_str()).collect();
        assert_eq!(heads, vec!["Horizon Media", "Jane Doe"]);
    }

    #[test]
    fn leading_stopword_run_is_tried_whole_then_trimmed() {
        let found = lookups("Budgets moved to The Trade Desk");
        assert_eq!(found[1].0, vec!["The Trade Desk", "Trade Desk"]);
        assert_eq!(found[1].1, vec!["Trade", "Desk"]);
    }

    #[test]
    fn glued_runs_fall_back_to_sub_runs_longest_first() {
        let found = lookups("Yesterday Horizon Media announced it");
        assert_eq!(found[0].0, vec!["Yesterday Horizon Media"]);
        assert_eq!(
            found[0].1,
            vec!["Yesterday Horizon", "Horizon Media", "Yesterday", "Horizon", "Media"]
        );
    }

    #[test]
    fn candidates_ignore_markup_and_keep_offsets() {
        let text = "Ping @[Acme](company:c1) and Globex's team";
        let candidates = candidate_phrases(text);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].phrases[0].text, "Ping");
        let globex = &candidates[1].phrases[0];
        assert_eq!(&text[globex.start..globex.end], "Globex");
    }

    #[test]
    fn single_letters_and_stopwords_alone_are_dropped() {
        assert!(candidate_phrases("This").is_empty());
        assert!(candidate_phrases("X").is_empty());
    }

    #[test]
    fn scoring_distinguishes_exact_and_prefix() {
        assert_eq!(score_match("nike", "Nike"), Some(0.9));
        assert_eq!(score_match("Horizon", "Horizon Media"), Some(0.6));
        assert_eq!(score_match("Media", "Horizon Media"), None);
    }
}
