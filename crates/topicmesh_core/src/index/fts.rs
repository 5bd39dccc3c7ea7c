//! SQLite FTS5-based entity index.
//!
//! # Responsibility
//! - Provide token-prefix lookup over entity display names.
//! - Return typed matches with stable ids.
//!
//! # Invariants
//! - Only active entities are returned.
//! - Result ordering is deterministic by rank, display name and id.
//! - User text is always escaped; FTS5 operators in input are treated as
//!   plain characters.

use crate::db::DbError;
use crate::index::{EntityIndex, IndexError, IndexMatch, IndexResult};
use crate::model::entity::EntityKind;
use log::debug;
use rusqlite::{params, Connection, Row};

const FIND_SQL: &str = "SELECT
    entities.id AS id,
    entities.kind AS kind,
    entities.category AS category,
    entities.display_name AS display_name,
    entities.description AS description
 FROM entities_fts
 JOIN entities ON entities.rowid = entities_fts.rowid
 WHERE entities_fts MATCH ?1
   AND entities.is_active = 1
 ORDER BY bm25(entities_fts), entities.display_name COLLATE NOCASE ASC, entities.id ASC
 LIMIT ?2";

/// Entity index backed by the `entities_fts` table.
#[derive(Clone, Copy)]
pub struct SqliteEntityIndex<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityIndex<'conn> {
    /// Wraps a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntityIndex for SqliteEntityIndex<'_> {
    fn find(&self, text: &str, limit: u32) -> IndexResult<Vec<IndexMatch>> {
        let Some(match_expr) = build_prefix_expression(text) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(FIND_SQL)?;
        let mut rows = stmt
            .query(params![match_expr.as_str(), i64::from(limit)])
            .map_err(|err| map_query_error(err, &match_expr))?;
        let mut matches = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| map_query_error(err, &match_expr))?
        {
            matches.push(parse_match(row)?);
        }

        debug!(
            "event=index_find module=index status=ok terms={} hits={}",
            match_expr.matches(" AND ").count() + 1,
            matches.len()
        );
        Ok(matches)
    }
}

fn parse_match(row: &Row<'_>) -> IndexResult<IndexMatch> {
    let kind_text: String = row.get("kind")?;
    let kind = EntityKind::parse(&kind_text)
        .ok_or_else(|| IndexError::InvalidData(format!("invalid kind `{kind_text}`")))?;

    Ok(IndexMatch {
        id: row.get("id")?,
        kind,
        category: row.get("category")?,
        display_name: row.get("display_name")?,
        description: row.get("description")?,
    })
}

/// Builds an FTS5 expression where every term is a quoted prefix token.
///
/// Returns `None` when no term carries an alphanumeric character.
fn build_prefix_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(escape_prefix_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }
    Some(terms.join(" AND "))
}

fn escape_prefix_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"*")
}

fn map_query_error(err: rusqlite::Error, query: &str) -> IndexError {
    if is_match_syntax_error(&err) {
        return IndexError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    IndexError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::build_prefix_expression;

    #[test]
    fn prefix_expression_quotes_every_term() {
        assert_eq!(
            build_prefix_expression("Acme corp").as_deref(),
            Some("\"Acme\"* AND \"corp\"*")
        );
        assert_eq!(
            build_prefix_expression("say \"hi\"").as_deref(),
            Some("\"say\"* AND \"\"\"hi\"\"\"*")
        );
    }

    #[test]
    fn prefix_expression_skips_symbol_only_terms() {
        assert_eq!(build_prefix_expression("   "), None);
        assert_eq!(build_prefix_expression("& - +"), None);
        assert_eq!(build_prefix_expression("AT & T").as_deref(), Some("\"AT\"* AND \"T\"*"));
    }
}
