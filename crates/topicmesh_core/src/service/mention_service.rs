//! Mention use-case service.
//!
//! # Responsibility
//! - Open editing sessions seeded from stored mentions.
//! - Fold explicit markup mentions found in content into the accepted set.
//! - Check every existing-entity mention against the entity directory.
//! - Persist the reconciled set and primary topic atomically and verify the
//!   write by reading it back.
//!
//! # Invariants
//! - A submit either stores the whole reconciled set or nothing.
//! - The returned payload always describes what was stored.
//! - Stored references marked existing resolve to a directory entry; unknown
//!   ids are dropped, an unknown primary topic fails the submit.
//!
//! # See also
//! - docs/architecture/mentions.md

use crate::model::entity::EntityKind;
use crate::reconcile::{EditorState, LegacyMentions, MentionPayload};
use crate::repo::entity_repo::EntityRepository;
use crate::repo::mention_repo::{ContentId, MentionRepository, StoredMentions};
use crate::repo::{RepoError, RepoResult};
use crate::suggest::extract_markup_mentions;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for mention use-cases.
#[derive(Debug)]
pub enum MentionServiceError {
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Selected primary topic is not in the entity directory.
    UnknownPrimaryTopic { kind: EntityKind, id: String },
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for MentionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::UnknownPrimaryTopic { kind, id } => {
                write!(f, "primary topic {}:{id} does not exist", kind.as_str())
            }
            Self::InconsistentState(details) => {
                write!(f, "inconsistent mention state: {details}")
            }
        }
    }
}

impl Error for MentionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UnknownPrimaryTopic { .. } | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for MentionServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case facade over a [`MentionRepository`] and the entity directory.
pub struct MentionService<R: MentionRepository, E: EntityRepository> {
    repo: R,
    entities: E,
}

impl<R: MentionRepository, E: EntityRepository> MentionService<R, E> {
    pub fn new(repo: R, entities: E) -> Self {
        Self { repo, entities }
    }

    /// Starts an editing session; empty when nothing is stored yet.
    pub fn open_editor(&self, content_id: ContentId) -> Result<EditorState, MentionServiceError> {
        let state = match self.repo.load_mentions(content_id)? {
            Some(stored) => EditorState::with_prior(stored.mentions, stored.primary_topic),
            None => EditorState::new(),
        };
        Ok(state)
    }

    /// Starts an editing session from per-kind mention records.
    pub fn open_editor_from_legacy(&self, legacy: LegacyMentions) -> EditorState {
        EditorState::with_prior(legacy.into_mention_set(), None)
    }

    pub fn load_mentions(&self, content_id: ContentId) -> RepoResult<Option<StoredMentions>> {
        self.repo.load_mentions(content_id)
    }

    /// Saves the session outcome for `content_id`.
    ///
    /// Markup mentions in `content` count as accepted unless the session
    /// removed them. Existing-entity mentions missing from the directory
    /// are dropped.
    pub fn submit(
        &mut self,
        content_id: ContentId,
        content: &str,
        state: EditorState,
    ) -> Result<MentionPayload, MentionServiceError> {
        let markup = extract_markup_mentions(content);
        let markup_count = markup.len();
        let state = state.with_accepted(
            markup
                .iter()
                .map(|mention| mention.to_reference(content)),
        );

        let mut mentions = state.mentions();
        let mut unknown = Vec::new();
        for reference in mentions.iter().filter(|reference| reference.is_existing) {
            if !self.entity_exists(reference.kind, &reference.id)? {
                unknown.push(reference.dedup_key());
            }
        }
        if !unknown.is_empty() {
            warn!(
                "event=mentions_submit module=service status=degraded reason=unknown_entity dropped={}",
                unknown.len()
            );
            mentions.retain(|reference| !unknown.contains(&reference.dedup_key()));
        }

        let primary = state.primary_update();
        if let Some(Some(topic)) = &primary {
            if !self.entity_exists(topic.kind, &topic.id)? {
                return Err(MentionServiceError::UnknownPrimaryTopic {
                    kind: topic.kind,
                    id: topic.id.clone(),
                });
            }
        }
        self.repo.save_mentions(content_id, &mentions, &primary)?;

        let stored = self
            .repo
            .load_mentions(content_id)?
            .ok_or(MentionServiceError::InconsistentState(
                "saved mentions not found in read-back",
            ))?;
        if stored.mentions.topic_ids() != mentions.topic_ids() {
            return Err(MentionServiceError::InconsistentState(
                "stored mention keys differ from reconciled set",
            ));
        }
        if let Some(expected) = &primary {
            if stored.primary_topic.as_ref() != expected.as_ref() {
                return Err(MentionServiceError::InconsistentState(
                    "stored primary topic differs from selection",
                ));
            }
        }

        info!(
            "event=mentions_submit module=service status=ok mentions={} markup={markup_count}",
            mentions.len()
        );
        Ok(MentionPayload::new(&mentions, &primary))
    }

    /// Looks the entity up under its family first, so `agency:c1` finds a
    /// row stored as `company`, then under its own kind.
    fn entity_exists(&self, kind: EntityKind, id: &str) -> RepoResult<bool> {
        let family = kind.family();
        if self.entities.get_entity(family, id)?.is_some() {
            return Ok(true);
        }
        Ok(family != kind && self.entities.get_entity(kind, id)?.is_some())
    }
}
