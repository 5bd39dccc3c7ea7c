//! Entity reference domain model.
//!
//! # Responsibility
//! - Define the closed entity-kind tag set and the reference shape shared by
//!   suggestions, search results and persisted mentions.
//! - Own dedup-key derivation and same-key merge rules.
//!
//! # Invariants
//! - `confidence` is always within `[0, 1]`.
//! - Existing references dedup on `family:id`; free-text topics dedup on
//!   their synthesized id.
//! - Company sub-kinds share the `company` family key, so one company
//!   reached through different kind refinements is still one mention.
//!
//! # See also
//! - docs/architecture/mentions.md

use crate::model::slug::{free_text_topic_id, is_free_text_topic_id};
use serde::{Deserialize, Serialize};

/// Closed set of entity kinds a mention can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Contact,
    /// Abstract subject, possibly free text with no backing record.
    Topic,
    /// Forum category.
    Category,
    Agency,
    Advertiser,
    Industry,
    Publisher,
    DspSsp,
    Adtech,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 10] = [
        Self::Company,
        Self::Contact,
        Self::Topic,
        Self::Category,
        Self::Agency,
        Self::Advertiser,
        Self::Industry,
        Self::Publisher,
        Self::DspSsp,
        Self::Adtech,
    ];

    /// Stable storage/wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Contact => "contact",
            Self::Topic => "topic",
            Self::Category => "category",
            Self::Agency => "agency",
            Self::Advertiser => "advertiser",
            Self::Industry => "industry",
            Self::Publisher => "publisher",
            Self::DspSsp => "dsp_ssp",
            Self::Adtech => "adtech",
        }
    }

    /// Parses a wire string. Accepts `-` in place of `_` (`dsp-ssp`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }

    /// User-facing short label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Contact => "Contact",
            Self::Topic => "Topic",
            Self::Category => "Category",
            Self::Agency => "Agency",
            Self::Advertiser => "Advertiser",
            Self::Industry => "Industry",
            Self::Publisher => "Publisher",
            Self::DspSsp => "DSP/SSP",
            Self::Adtech => "AdTech",
        }
    }

    /// Whether this kind is `company` or one of its refinements.
    pub fn is_company_family(self) -> bool {
        match self {
            Self::Company
            | Self::Agency
            | Self::Advertiser
            | Self::Industry
            | Self::Publisher
            | Self::DspSsp
            | Self::Adtech => true,
            Self::Contact | Self::Topic | Self::Category => false,
        }
    }

    /// Whether a reference of this kind may become the primary topic.
    pub fn is_primary_eligible(self) -> bool {
        match self {
            Self::Topic | Self::Category => false,
            Self::Company
            | Self::Contact
            | Self::Agency
            | Self::Advertiser
            | Self::Industry
            | Self::Publisher
            | Self::DspSsp
            | Self::Adtech => true,
        }
    }

    /// Collapses company refinements to `company`.
    pub fn family(self) -> Self {
        if self.is_company_family() {
            Self::Company
        } else {
            self
        }
    }
}

/// One real-world thing mentioned in content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    /// Persisted entity id, or a synthesized `manual-` id for free text.
    pub id: String,
    pub display_name: String,
    /// 1.0 for exact/manual selections, lower for inferred suggestions.
    pub confidence: f64,
    /// Whether `id` resolves to a persisted entity.
    pub is_existing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content excerpt that triggered the reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl EntityRef {
    /// Creates an exact reference to a persisted entity.
    pub fn existing(kind: EntityKind, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            display_name: display_name.into(),
            confidence: 1.0,
            is_existing: true,
            description: None,
            context: None,
        }
    }

    /// Creates a free-text topic with a synthesized id.
    ///
    /// Returns `None` when `display_name` is empty after normalization.
    pub fn free_text(display_name: &str) -> Option<Self> {
        let id = free_text_topic_id(display_name)?;
        Some(Self {
            kind: EntityKind::Topic,
            id,
            display_name: display_name.trim().to_string(),
            confidence: 1.0,
            is_existing: false,
            description: None,
            context: None,
        })
    }

    /// Returns a copy with `confidence` clamped into `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = non_blank(context.into());
        self
    }

    /// Canonical key used to detect duplicate mentions.
    pub fn dedup_key(&self) -> String {
        if self.is_existing {
            return format!("{}:{}", self.kind.family().as_str(), self.id);
        }
        if is_free_text_topic_id(&self.id) {
            return self.id.clone();
        }
        free_text_topic_id(&self.display_name).unwrap_or_else(|| self.id.clone())
    }

    /// Whether this reference carries a description or context excerpt.
    pub fn has_rich_metadata(&self) -> bool {
        self.description.is_some() || self.context.is_some()
    }

    /// Merges a same-key duplicate into `self`.
    ///
    /// Keeps the first display name and kind, the higher confidence, and
    /// fills description/context from `other` when `self` has none.
    pub fn absorb(&mut self, other: EntityRef) {
        self.confidence = self.confidence.max(clamp_confidence(other.confidence));
        if self.description.is_none() {
            self.description = other.description.and_then(non_blank);
        }
        if self.context.is_none() {
            self.context = other.context.and_then(non_blank);
        }
    }
}

/// A proposed reference the user has not accepted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicSuggestion {
    pub reference: EntityRef,
}

impl TopicSuggestion {
    pub fn new(reference: EntityRef) -> Self {
        Self { reference }
    }

    pub fn dedup_key(&self) -> String {
        self.reference.dedup_key()
    }

    pub fn into_reference(self) -> EntityRef {
        self.reference
    }
}

/// The single entity a content item is primarily about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryTopic {
    pub kind: EntityKind,
    pub id: String,
    pub display_name: String,
}

impl PrimaryTopic {
    /// Mention dedup key of the same entity.
    pub fn dedup_key(&self) -> String {
        format!("{}:{}", self.kind.family().as_str(), self.id)
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
