//! Entity-mention and topic-resolution engine.
//!
//! Detects references to known entities in free-text content, resolves
//! manual lookups against a searchable index, reconciles accepted and typed
//! mentions with stored ones, and tracks one primary topic per content item.

pub mod config;
pub mod db;
pub mod index;
pub mod logging;
pub mod model;
pub mod primary;
pub mod reconcile;
pub mod repo;
pub mod search;
pub mod sequence;
pub mod service;
pub mod suggest;

pub use config::{ConfigError, EngineConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use index::{EntityIndex, IndexError, IndexMatch, IndexResult, SqliteEntityIndex};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{EntityKind, EntityRef, PrimaryTopic, TopicSuggestion};
pub use primary::{PrimarySlot, PrimaryTopicRejected, PrimaryTopicSelector, PrimaryUpdate};
pub use reconcile::{
    manual_topic, reconcile, EditorState, LegacyMentions, MentionEvent, MentionPayload, MentionSet,
};
pub use repo::entity_repo::{EntityRecord, EntityRepository, SqliteEntityRepository};
pub use repo::mention_repo::{
    ContentId, MentionRepository, SqliteMentionRepository, StoredMentions,
};
pub use repo::{RepoError, RepoResult};
pub use search::{EntitySearchResolver, SearchMode};
pub use sequence::{RequestSequencer, RequestTicket};
pub use service::{MentionService, MentionServiceError};
pub use suggest::{
    BackendError, CompositeSuggester, IndexSuggester, KeywordSuggester, SuggestRequest,
    SuggestionBackend, SuggestionEngine,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
