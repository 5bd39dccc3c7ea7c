//! Entity directory persistence.
//!
//! # Responsibility
//! - Keep the `entities` table (and through triggers, the FTS index) in sync
//!   with the directory of companies, contacts, topics and categories.
//!
//! # Invariants
//! - `(kind, id)` identifies one entity; upserts never duplicate it.
//! - Deactivated entities stay stored but disappear from index lookups.

use crate::model::entity::EntityKind;
use crate::repo::{ensure_schema, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY_SELECT_SQL: &str = "SELECT
    kind,
    id,
    display_name,
    category,
    description,
    is_active
 FROM entities";

const ENTITY_COLUMNS: &[&str] = &[
    "kind",
    "id",
    "display_name",
    "category",
    "description",
    "is_active",
];

/// One directory entry as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub id: String,
    pub display_name: String,
    /// Company type code or other free-form grouping label.
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

impl EntityRecord {
    pub fn new(kind: EntityKind, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            display_name: display_name.into(),
            category: None,
            description: None,
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn validate(&self) -> RepoResult<()> {
        if self.id.trim().is_empty() {
            return Err(RepoError::InvalidInput("entity id must not be blank".to_string()));
        }
        if self.display_name.trim().is_empty() {
            return Err(RepoError::InvalidInput(format!(
                "entity `{}` display name must not be blank",
                self.id
            )));
        }
        Ok(())
    }
}

/// Repository interface for the entity directory.
pub trait EntityRepository {
    /// Inserts or replaces the entity identified by `(kind, id)`.
    fn upsert_entity(&self, record: &EntityRecord) -> RepoResult<()>;
    fn get_entity(&self, kind: EntityKind, id: &str) -> RepoResult<Option<EntityRecord>>;
    /// Hides an entity from lookups without deleting it.
    fn deactivate_entity(&self, kind: EntityKind, id: &str) -> RepoResult<()>;
}

/// SQLite-backed entity repository.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, &[("entities", ENTITY_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn upsert_entity(&self, record: &EntityRecord) -> RepoResult<()> {
        record.validate()?;

        self.conn.execute(
            "INSERT INTO entities (kind, id, display_name, category, description, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (kind, id) DO UPDATE SET
                display_name = excluded.display_name,
                category = excluded.category,
                description = excluded.description,
                is_active = excluded.is_active,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                record.kind.as_str(),
                record.id.as_str(),
                record.display_name.trim(),
                record.category.as_deref(),
                record.description.as_deref(),
                i64::from(record.is_active),
            ],
        )?;

        debug!(
            "event=entity_upsert module=repo status=ok kind={}",
            record.kind.as_str()
        );
        Ok(())
    }

    fn get_entity(&self, kind: EntityKind, id: &str) -> RepoResult<Option<EntityRecord>> {
        let sql = format!("{ENTITY_SELECT_SQL} WHERE kind = ?1 AND id = ?2;");
        let row = self
            .conn
            .query_row(&sql, params![kind.as_str(), id], |row| {
                Ok(parse_entity_row(row))
            })
            .optional()?;

        row.transpose()
    }

    fn deactivate_entity(&self, kind: EntityKind, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE entities
             SET is_active = 0,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE kind = ?1 AND id = ?2;",
            params![kind.as_str(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(format!("{}:{id}", kind.as_str())));
        }
        Ok(())
    }
}

fn parse_entity_row(row: &Row<'_>) -> RepoResult<EntityRecord> {
    let kind_text: String = row.get(0)?;
    let kind = EntityKind::parse(&kind_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid entity kind `{kind_text}`")))?;
    let is_active: i64 = row.get(5)?;

    Ok(EntityRecord {
        kind,
        id: row.get(1)?,
        display_name: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        is_active: is_active == 1,
    })
}
