//! Primary topic selection for one editing session.
//!
//! # Responsibility
//! - Hold at most one primary topic per content item.
//! - Reject abstract kinds (`topic`, `category`) and unresolved references.
//! - Tell persistence whether the primary topic was set, cleared or left
//!   untouched.
//!
//! # Invariants
//! - Selecting replaces any previous selection.
//! - A primary topic always points at a persisted entity.
//! - An untouched selector never produces a write.

use crate::model::entity::{EntityKind, EntityRef, PrimaryTopic};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Write instruction for the stored primary topic.
///
/// - `None`: leave the stored value untouched.
/// - `Some(None)`: clear it.
/// - `Some(Some(topic))`: replace it.
pub type PrimaryUpdate = Option<Option<PrimaryTopic>>;

/// Why a reference cannot become the primary topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryTopicRejected {
    IneligibleKind { kind: EntityKind, id: String },
    /// Free-text topics have no persisted entity to point at.
    Unresolved { id: String },
}

impl Display for PrimaryTopicRejected {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IneligibleKind { kind, id } => write!(
                f,
                "{} `{id}` cannot be a primary topic",
                kind.label().to_lowercase()
            ),
            Self::Unresolved { id } => {
                write!(f, "`{id}` does not resolve to an existing entity")
            }
        }
    }
}

impl Error for PrimaryTopicRejected {}

/// Current selector slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PrimarySlot {
    /// Nothing chosen in this session and nothing stored.
    #[default]
    Unset,
    Selected(PrimaryTopic),
    /// Explicitly cleared by the user.
    Cleared,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryTopicSelector {
    slot: PrimarySlot,
    dirty: bool,
}

impl PrimaryTopicSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the value already stored for the content item.
    pub fn seeded(stored: Option<PrimaryTopic>) -> Self {
        Self {
            slot: stored.map_or(PrimarySlot::Unset, PrimarySlot::Selected),
            dirty: false,
        }
    }

    /// Makes `reference` the primary topic.
    ///
    /// On rejection the previous selection stays in place.
    pub fn select(&mut self, reference: &EntityRef) -> Result<PrimaryTopic, PrimaryTopicRejected> {
        if !reference.kind.is_primary_eligible() {
            debug!(
                "event=primary_select module=primary status=rejected reason=ineligible_kind kind={}",
                reference.kind.as_str()
            );
            return Err(PrimaryTopicRejected::IneligibleKind {
                kind: reference.kind,
                id: reference.id.clone(),
            });
        }
        if !reference.is_existing {
            debug!("event=primary_select module=primary status=rejected reason=unresolved");
            return Err(PrimaryTopicRejected::Unresolved {
                id: reference.id.clone(),
            });
        }

        let topic = PrimaryTopic {
            kind: reference.kind,
            id: reference.id.clone(),
            display_name: reference.display_name.clone(),
        };
        self.slot = PrimarySlot::Selected(topic.clone());
        self.dirty = true;
        Ok(topic)
    }

    /// Clears the primary topic. No-op when nothing was ever selected.
    pub fn clear(&mut self) {
        match self.slot {
            PrimarySlot::Unset => {}
            PrimarySlot::Selected(_) | PrimarySlot::Cleared => {
                self.slot = PrimarySlot::Cleared;
                self.dirty = true;
            }
        }
    }

    pub fn slot(&self) -> &PrimarySlot {
        &self.slot
    }

    /// The topic currently shown as primary.
    pub fn current(&self) -> Option<&PrimaryTopic> {
        match &self.slot {
            PrimarySlot::Selected(topic) => Some(topic),
            PrimarySlot::Unset | PrimarySlot::Cleared => None,
        }
    }

    /// Whether `key` is the dedup key of the current primary topic.
    pub fn is_primary(&self, key: &str) -> bool {
        self.current().is_some_and(|topic| topic.dedup_key() == key)
    }

    /// The write instruction for persistence.
    pub fn update(&self) -> PrimaryUpdate {
        if !self.dirty {
            return None;
        }
        match &self.slot {
            PrimarySlot::Selected(topic) => Some(Some(topic.clone())),
            PrimarySlot::Cleared | PrimarySlot::Unset => Some(None),
        }
    }
}
