//! Persisted mention sets and primary topics.
//!
//! # Responsibility
//! - Store the reconciled association set of a content item.
//! - Apply the primary topic write instruction alongside it.
//!
//! # Invariants
//! - `save_mentions` is atomic: the set is fully replaced and the primary
//!   topic updated in one immediate transaction, or nothing changes.
//! - Loaded sets keep the order they were saved in.
//! - A stored primary topic never has an abstract kind.

use crate::model::entity::{EntityKind, EntityRef, PrimaryTopic};
use crate::primary::PrimaryUpdate;
use crate::reconcile::MentionSet;
use crate::repo::{ensure_schema, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Stable identifier of a content item (forum post, article, ...).
pub type ContentId = Uuid;

const CONTENT_ITEM_COLUMNS: &[&str] = &[
    "uuid",
    "primary_topic_kind",
    "primary_topic_id",
    "primary_topic_name",
    "updated_at",
];

const CONTENT_MENTION_COLUMNS: &[&str] = &[
    "content_uuid",
    "dedup_key",
    "kind",
    "entity_id",
    "display_name",
    "confidence",
    "is_existing",
    "description",
    "context",
    "position",
];

/// Mentions and primary topic stored for one content item.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMentions {
    pub content_id: ContentId,
    pub mentions: MentionSet,
    pub primary_topic: Option<PrimaryTopic>,
    /// Epoch milliseconds of the last save.
    pub updated_at: i64,
}

/// Repository interface for per-content mention sets.
pub trait MentionRepository {
    /// Returns `None` when nothing was ever saved for `content_id`.
    fn load_mentions(&self, content_id: ContentId) -> RepoResult<Option<StoredMentions>>;
    /// Replaces the stored set and applies `primary` atomically.
    fn save_mentions(
        &mut self,
        content_id: ContentId,
        mentions: &MentionSet,
        primary: &PrimaryUpdate,
    ) -> RepoResult<()>;
}

/// SQLite-backed mention repository.
///
/// Borrows the connection shared with the entity repository.
pub struct SqliteMentionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMentionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(
            conn,
            &[
                ("content_items", CONTENT_ITEM_COLUMNS),
                ("content_mentions", CONTENT_MENTION_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl MentionRepository for SqliteMentionRepository<'_> {
    fn load_mentions(&self, content_id: ContentId) -> RepoResult<Option<StoredMentions>> {
        let content_text = content_id.to_string();
        let item = self
            .conn
            .query_row(
                "SELECT primary_topic_kind, primary_topic_id, primary_topic_name, updated_at
                 FROM content_items
                 WHERE uuid = ?1;",
                [content_text.as_str()],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((kind, id, name, updated_at)) = item else {
            return Ok(None);
        };

        let primary_topic = parse_primary_topic(kind, id, name)?;

        let mut stmt = self.conn.prepare(
            "SELECT kind, entity_id, display_name, confidence, is_existing, description, context
             FROM content_mentions
             WHERE content_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([content_text.as_str()])?;
        let mut mentions = MentionSet::new();
        while let Some(row) = rows.next()? {
            mentions.insert(parse_mention_row(row)?);
        }

        Ok(Some(StoredMentions {
            content_id,
            mentions,
            primary_topic,
            updated_at,
        }))
    }

    fn save_mentions(
        &mut self,
        content_id: ContentId,
        mentions: &MentionSet,
        primary: &PrimaryUpdate,
    ) -> RepoResult<()> {
        if let Some(Some(topic)) = primary {
            if !topic.kind.is_primary_eligible() {
                return Err(RepoError::InvalidInput(format!(
                    "kind `{}` cannot be a primary topic",
                    topic.kind.as_str()
                )));
            }
        }

        let content_text = content_id.to_string();
        // Fails instead of nesting if a caller already opened a transaction.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT OR IGNORE INTO content_items (uuid) VALUES (?1);",
            [content_text.as_str()],
        )?;
        tx.execute(
            "DELETE FROM content_mentions WHERE content_uuid = ?1;",
            [content_text.as_str()],
        )?;
        insert_mentions(&tx, content_text.as_str(), mentions)?;
        apply_primary_update(&tx, content_text.as_str(), primary)?;

        tx.execute(
            "UPDATE content_items
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [content_text.as_str()],
        )?;
        tx.commit()?;

        info!(
            "event=mentions_save module=repo status=ok mentions={} primary={}",
            mentions.len(),
            match primary {
                None => "unchanged",
                Some(None) => "cleared",
                Some(Some(_)) => "set",
            }
        );
        Ok(())
    }
}

fn insert_mentions(tx: &Transaction<'_>, content_uuid: &str, mentions: &MentionSet) -> RepoResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO content_mentions (
            content_uuid,
            dedup_key,
            kind,
            entity_id,
            display_name,
            confidence,
            is_existing,
            description,
            context,
            position
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
    )?;

    for (position, reference) in mentions.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| RepoError::InvalidInput("mention set too large".to_string()))?;
        stmt.execute(params![
            content_uuid,
            reference.dedup_key(),
            reference.kind.as_str(),
            reference.id.as_str(),
            reference.display_name.as_str(),
            reference.confidence,
            i64::from(reference.is_existing),
            reference.description.as_deref(),
            reference.context.as_deref(),
            position,
        ])?;
    }
    Ok(())
}

fn apply_primary_update(
    tx: &Transaction<'_>,
    content_uuid: &str,
    primary: &PrimaryUpdate,
) -> RepoResult<()> {
    match primary {
        None => {}
        Some(None) => {
            tx.execute(
                "UPDATE content_items
                 SET primary_topic_kind = NULL,
                     primary_topic_id = NULL,
                     primary_topic_name = NULL
                 WHERE uuid = ?1;",
                [content_uuid],
            )?;
        }
        Some(Some(topic)) => {
            tx.execute(
                "UPDATE content_items
                 SET primary_topic_kind = ?2,
                     primary_topic_id = ?3,
                     primary_topic_name = ?4
                 WHERE uuid = ?1;",
                params![
                    content_uuid,
                    topic.kind.as_str(),
                    topic.id.as_str(),
                    topic.display_name.as_str(),
                ],
            )?;
        }
    }
    Ok(())
}

fn parse_primary_topic(
    kind: Option<String>,
    id: Option<String>,
    name: Option<String>,
) -> RepoResult<Option<PrimaryTopic>> {
    let (Some(kind_text), Some(id)) = (kind, id) else {
        return Ok(None);
    };
    let kind = parse_kind(&kind_text)?;
    let display_name = name.unwrap_or_else(|| id.clone());
    Ok(Some(PrimaryTopic {
        kind,
        id,
        display_name,
    }))
}

fn parse_mention_row(row: &Row<'_>) -> RepoResult<EntityRef> {
    let kind_text: String = row.get(0)?;
    let is_existing: i64 = row.get(4)?;

    Ok(EntityRef {
        kind: parse_kind(&kind_text)?,
        id: row.get(1)?,
        display_name: row.get(2)?,
        confidence: row.get(3)?,
        is_existing: is_existing == 1,
        description: row.get(5)?,
        context: row.get(6)?,
    })
}

fn parse_kind(value: &str) -> RepoResult<EntityKind> {
    EntityKind::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid entity kind `{value}`")))
}
