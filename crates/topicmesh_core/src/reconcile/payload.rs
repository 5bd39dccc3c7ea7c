//! Serializable result of one editing session.

use crate::model::entity::EntityKind;
use crate::primary::PrimaryUpdate;
use crate::reconcile::set::MentionSet;
use serde::Serialize;

/// What the content-persistence caller stores.
///
/// Primary topic fields are omitted when untouched and `null` when cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionPayload {
    pub topic_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_topic_type: Option<Option<EntityKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_topic_id: Option<Option<String>>,
}

impl MentionPayload {
    pub fn new(mentions: &MentionSet, primary: &PrimaryUpdate) -> Self {
        let (primary_topic_type, primary_topic_id) = match primary {
            None => (None, None),
            Some(None) => (Some(None), Some(None)),
            Some(Some(topic)) => (Some(Some(topic.kind)), Some(Some(topic.id.clone()))),
        };
        Self {
            topic_ids: mentions.topic_ids(),
            primary_topic_type,
            primary_topic_id,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::MentionPayload;
    use crate::model::entity::{EntityKind, EntityRef, PrimaryTopic};
    use crate::reconcile::set::MentionSet;

    #[test]
    fn primary_fields_follow_update_state() {
        let set = MentionSet::from_refs([EntityRef::existing(EntityKind::Agency, "c1", "Acme")]);

        let untouched = MentionPayload::new(&set, &None).to_json().unwrap();
        assert_eq!(untouched, r#"{"topicIds":["company:c1"]}"#);

        let cleared = MentionPayload::new(&set, &Some(None)).to_json().unwrap();
        assert_eq!(
            cleared,
            r#"{"topicIds":["company:c1"],"primaryTopicType":null,"primaryTopicId":null}"#
        );

        let topic = PrimaryTopic {
            kind: EntityKind::Agency,
            id: "c1".to_string(),
            display_name: "Acme".to_string(),
        };
        let selected = MentionPayload::new(&set, &Some(Some(topic))).to_json().unwrap();
        assert_eq!(
            selected,
            r#"{"topicIds":["company:c1"],"primaryTopicType":"agency","primaryTopicId":"c1"}"#
        );
    }
}
