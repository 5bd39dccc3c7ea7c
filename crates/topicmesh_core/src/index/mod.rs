//! Entity index contract and SQLite FTS5 implementation.
//!
//! # Responsibility
//! - Define the free-text lookup seam consumed by suggestion and search.
//! - Keep index ranking/storage internals behind [`EntityIndex`].
//!
//! # Invariants
//! - Callers never depend on how matches are ranked, only on the returned
//!   order being deterministic for the same index state.

pub mod fts;

use crate::db::DbError;
use crate::model::entity::EntityKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use fts::SqliteEntityIndex;

/// Result type for index lookups.
pub type IndexResult<T> = Result<T, IndexError>;

/// Index-layer error for query parsing, storage access and row decoding.
#[derive(Debug)]
pub enum IndexError {
    /// Query text cannot be turned into a valid index expression.
    InvalidQuery {
        query: String,
        message: String,
    },
    Db(DbError),
    InvalidData(String),
    /// Remote or out-of-process index could not be reached.
    Unavailable(String),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid index query `{query}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid index row: {message}"),
            Self::Unavailable(message) => write!(f, "entity index unavailable: {message}"),
        }
    }
}

impl Error for IndexError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidQuery { .. } | Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for IndexError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for IndexError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One candidate returned by [`EntityIndex::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMatch {
    pub id: String,
    pub kind: EntityKind,
    /// Free-form category label, e.g. a company type code.
    pub category: Option<String>,
    pub display_name: String,
    pub description: Option<String>,
}

impl IndexMatch {
    pub fn new(kind: EntityKind, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            category: None,
            display_name: display_name.into(),
            description: None,
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
}

/// Searchable store of entities keyed by kind and id.
pub trait EntityIndex {
    /// Returns up to `limit` entities whose name matches `text`.
    fn find(&self, text: &str, limit: u32) -> IndexResult<Vec<IndexMatch>>;
}

impl<T: EntityIndex + ?Sized> EntityIndex for &T {
    fn find(&self, text: &str, limit: u32) -> IndexResult<Vec<IndexMatch>> {
        (**self).find(text, limit)
    }
}
