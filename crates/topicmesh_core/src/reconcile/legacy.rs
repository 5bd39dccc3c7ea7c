//! Mapping from per-kind mention records into one [`MentionSet`].
//!
//! Older content stores company, contact and topic mentions in separate
//! collections. Editing such content starts from the unified set built here.

use crate::model::company_type::kind_for_company_label;
use crate::model::entity::{EntityKind, EntityRef};
use crate::reconcile::set::MentionSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMentionRecord {
    pub company_id: String,
    pub name: String,
    /// Directory company type code, e.g. `AGENCY`.
    #[serde(default)]
    pub company_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMentionRecord {
    pub contact_id: String,
    pub full_name: String,
}

/// Topic mention; `topic_id` is absent for topics typed as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicMentionRecord {
    #[serde(default)]
    pub topic_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMentions {
    #[serde(default)]
    pub companies: Vec<CompanyMentionRecord>,
    #[serde(default)]
    pub contacts: Vec<ContactMentionRecord>,
    #[serde(default)]
    pub topics: Vec<TopicMentionRecord>,
}

impl LegacyMentions {
    /// Builds the prior set: companies, then contacts, then topics.
    ///
    /// Topic records whose name has nothing alphanumeric are dropped.
    pub fn into_mention_set(self) -> MentionSet {
        let companies = self.companies.into_iter().map(|record| {
            let kind = kind_for_company_label(record.company_type.as_deref());
            EntityRef::existing(kind, record.company_id, record.name)
        });
        let contacts = self.contacts.into_iter().map(|record| {
            EntityRef::existing(EntityKind::Contact, record.contact_id, record.full_name)
        });
        let topics = self.topics.into_iter().filter_map(topic_reference);

        companies.chain(contacts).chain(topics).collect()
    }
}

fn topic_reference(record: TopicMentionRecord) -> Option<EntityRef> {
    let mut reference = match record.topic_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => EntityRef::existing(EntityKind::Topic, id, record.name),
        None => EntityRef::free_text(&record.name)?,
    };
    if let Some(description) = record.description {
        reference = reference.with_description(description);
    }
    if let Some(context) = record.context {
        reference = reference.with_context(context);
    }
    Some(reference)
}
