//! Editing-session state and its reducer.
//!
//! # Responsibility
//! - Track suggestions, accepted suggestions, typed topics, removals and the
//!   primary topic for one content item being edited.
//! - Apply user and backend events through [`EditorState::reduce`].
//!
//! # Invariants
//! - `reduce` is pure: the new state depends only on the old state and the
//!   event.
//! - Suggestions from a superseded request are discarded.
//! - Re-adding a removed reference cancels its removal.

use crate::model::entity::{EntityRef, PrimaryTopic, TopicSuggestion};
use crate::primary::{PrimaryTopicRejected, PrimaryTopicSelector, PrimaryUpdate};
use crate::reconcile::payload::MentionPayload;
use crate::reconcile::set::MentionSet;
use crate::reconcile::{manual_topic, reconcile};
use crate::sequence::{RequestSequencer, RequestTicket};
use log::debug;

/// Input to [`EditorState::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum MentionEvent {
    SuggestionsLoaded {
        ticket: RequestTicket,
        suggestions: Vec<TopicSuggestion>,
    },
    /// Accepts or un-accepts the suggestion with this dedup key.
    SuggestionToggled { key: String },
    ManualAdded { raw: String },
    /// Removes by dedup key, or by a raw id carried by exactly one mention.
    ManualRemoved { id: String },
    PrimarySelected(EntityRef),
    PrimaryCleared,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    prior: MentionSet,
    suggestions: Vec<TopicSuggestion>,
    accepted: Vec<EntityRef>,
    manual: Vec<EntityRef>,
    removals: Vec<String>,
    primary: PrimaryTopicSelector,
    sequencer: RequestSequencer,
    last_rejection: Option<PrimaryTopicRejected>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for content that already has stored mentions.
    pub fn with_prior(prior: MentionSet, stored_primary: Option<PrimaryTopic>) -> Self {
        Self {
            prior,
            primary: PrimaryTopicSelector::seeded(stored_primary),
            ..Self::default()
        }
    }

    /// Issues the ticket a suggestion request for `content` must carry.
    pub fn begin_suggestions(&mut self, content: &str) -> RequestTicket {
        self.sequencer.issue(content)
    }

    /// Applies one event and returns the next state.
    pub fn reduce(mut self, event: MentionEvent) -> Self {
        match event {
            MentionEvent::SuggestionsLoaded {
                ticket,
                suggestions,
            } => {
                if self.sequencer.is_latest(&ticket) {
                    self.suggestions = suggestions;
                } else {
                    debug!(
                        "event=suggestions_loaded module=reconcile status=stale seq={}",
                        ticket.seq()
                    );
                }
            }
            MentionEvent::SuggestionToggled { key } => self.toggle_suggestion(&key),
            MentionEvent::ManualAdded { raw } => {
                if let Some(topic) = manual_topic(&raw) {
                    let key = topic.dedup_key();
                    self.cancel_removal(&key, &topic.id);
                    if !self.manual.iter().any(|r| r.dedup_key() == key) {
                        self.manual.push(topic);
                    }
                }
            }
            MentionEvent::ManualRemoved { id } => {
                if let Some(key) = self.removal_key(id.trim()) {
                    self.accepted.retain(|r| r.dedup_key() != key);
                    self.manual.retain(|r| r.dedup_key() != key);
                    if !self.removals.contains(&key) {
                        self.removals.push(key);
                    }
                }
            }
            MentionEvent::PrimarySelected(reference) => {
                self.last_rejection = self.primary.select(&reference).err();
            }
            MentionEvent::PrimaryCleared => {
                self.primary.clear();
                self.last_rejection = None;
            }
        }
        self
    }

    /// Adds references accepted implicitly, e.g. explicit markup in content.
    ///
    /// Unlike a toggle, this does not cancel a standing removal.
    pub fn with_accepted(mut self, references: impl IntoIterator<Item = EntityRef>) -> Self {
        for reference in references {
            let key = reference.dedup_key();
            if !self.accepted.iter().any(|r| r.dedup_key() == key) {
                self.accepted.push(reference);
            }
        }
        self
    }

    pub fn prior(&self) -> &MentionSet {
        &self.prior
    }

    pub fn suggestions(&self) -> &[TopicSuggestion] {
        &self.suggestions
    }

    pub fn accepted(&self) -> &[EntityRef] {
        &self.accepted
    }

    pub fn manual(&self) -> &[EntityRef] {
        &self.manual
    }

    pub fn removals(&self) -> &[String] {
        &self.removals
    }

    pub fn primary(&self) -> &PrimaryTopicSelector {
        &self.primary
    }

    /// Why the most recent primary selection was refused, if it was.
    pub fn last_rejection(&self) -> Option<&PrimaryTopicRejected> {
        self.last_rejection.as_ref()
    }

    pub fn is_accepted(&self, key: &str) -> bool {
        self.accepted.iter().any(|r| r.dedup_key() == key)
    }

    /// The reconciled association set for the current state.
    pub fn mentions(&self) -> MentionSet {
        reconcile(&self.prior, &self.accepted, &self.manual, &self.removals)
    }

    pub fn primary_update(&self) -> PrimaryUpdate {
        self.primary.update()
    }

    pub fn payload(&self) -> MentionPayload {
        MentionPayload::new(&self.mentions(), &self.primary_update())
    }

    fn toggle_suggestion(&mut self, key: &str) {
        if self.is_accepted(key) {
            self.accepted.retain(|r| r.dedup_key() != key);
            return;
        }
        let Some(suggestion) = self.suggestions.iter().find(|s| s.dedup_key() == key) else {
            debug!("event=suggestion_toggle module=reconcile status=ignored reason=unknown_key");
            return;
        };
        let reference = suggestion.reference.clone();
        self.cancel_removal(key, &reference.id);
        self.accepted.push(reference);
    }

    fn cancel_removal(&mut self, key: &str, id: &str) {
        self.removals.retain(|removal| removal != key && removal != id);
    }

    /// Dedup key recorded for a removal request.
    ///
    /// An id not among the current mentions is kept verbatim so it still
    /// applies to mentions merged in later, such as content markup. An id
    /// shared by several current mentions is ambiguous and ignored.
    fn removal_key(&self, id: &str) -> Option<String> {
        if id.is_empty() {
            return None;
        }
        let current = self.mentions();
        if let Some(key) = current.resolve_key(id) {
            return Some(key.to_string());
        }
        if current.iter().any(|reference| reference.id == id) {
            debug!("event=manual_remove module=reconcile status=ignored reason=ambiguous_id");
            return None;
        }
        Some(id.to_string())
    }
}
