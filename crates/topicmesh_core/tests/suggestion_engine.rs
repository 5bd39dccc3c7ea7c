use std::cell::{Cell, RefCell};
use topicmesh_core::{
    open_db_in_memory, BackendError, CompositeSuggester, EngineConfig, EntityIndex, EntityKind,
    EntityRecord, EntityRepository, IndexError, IndexMatch, IndexResult, IndexSuggester,
    KeywordSuggester, SqliteEntityIndex, SqliteEntityRepository, SuggestRequest,
    SuggestionBackend, SuggestionEngine, TopicSuggestion,
};

/// Index that knows only Nike and records every lookup.
#[derive(Default)]
struct NikeIndex {
    queries: RefCell<Vec<String>>,
}

impl EntityIndex for NikeIndex {
    fn find(&self, text: &str, _limit: u32) -> IndexResult<Vec<IndexMatch>> {
        self.queries.borrow_mut().push(text.to_string());
        if text.to_lowercase().contains("nike") {
            Ok(vec![IndexMatch::new(EntityKind::Company, "c-nike", "Nike")
                .with_description("Sportswear brand")])
        } else {
            Ok(Vec::new())
        }
    }
}

struct DownIndex;

impl EntityIndex for DownIndex {
    fn find(&self, _: &str, _: u32) -> IndexResult<Vec<IndexMatch>> {
        Err(IndexError::Unavailable("connection refused".to_string()))
    }
}

#[derive(Default)]
struct CountingBackend {
    calls: Cell<usize>,
}

impl SuggestionBackend for CountingBackend {
    fn suggest(&self, _: &SuggestRequest) -> Result<Vec<TopicSuggestion>, BackendError> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vec::new())
    }
}

#[test]
fn short_content_never_reaches_the_backend() {
    let backend = CountingBackend::default();
    let engine = SuggestionEngine::new(&backend);

    assert!(engine.suggest("Nike ad", None, None).is_empty());
    assert!(engine.suggest("   Nike ads   ", Some("A long title here"), None).is_empty());
    assert_eq!(backend.calls.get(), 0);

    engine.suggest("Nike adverts", None, None);
    assert_eq!(backend.calls.get(), 1);
}

#[test]
fn nike_case_study_yields_exactly_one_existing_company() {
    let index = NikeIndex::default();
    let engine = SuggestionEngine::new(IndexSuggester::new(&index));

    let suggestions = engine.suggest(
        "Great case study about Nike's programmatic strategy",
        None,
        None,
    );

    assert_eq!(suggestions.len(), 1);
    let nike = &suggestions[0].reference;
    assert_eq!(nike.kind, EntityKind::Company);
    assert_eq!(nike.id, "c-nike");
    assert!(nike.is_existing);
    assert!(nike.confidence > 0.0 && nike.confidence < 1.0);
    assert_eq!(nike.description.as_deref(), Some("Sportswear brand"));
    assert!(nike.context.as_deref().unwrap().contains("Nike's programmatic"));
    assert_eq!(*index.queries.borrow(), vec!["Nike".to_string()]);
}

#[test]
fn index_failure_degrades_to_empty_list() {
    let engine = SuggestionEngine::new(IndexSuggester::new(DownIndex));
    let suggestions = engine.suggest(
        "Long enough content mentioning Acme Corp",
        Some("Acme"),
        None,
    );
    assert!(suggestions.is_empty());
}

#[test]
fn markup_mentions_are_exact_and_skip_the_index() {
    let index = NikeIndex::default();
    let engine = SuggestionEngine::new(IndexSuggester::new(&index));

    let suggestions = engine.suggest(
        "thanks to @[Jane Doe](contact:p1) for the intro",
        None,
        None,
    );

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].dedup_key(), "contact:p1");
    assert_eq!(suggestions[0].reference.confidence, 1.0);
    assert!(index.queries.borrow().is_empty());
}

#[test]
fn scope_hint_boosts_matching_entity_below_exact() {
    let index = NikeIndex::default();
    let engine = SuggestionEngine::new(IndexSuggester::new(&index));

    let boosted = engine.suggest("Quarterly results from Nike", None, Some("c-nike"));
    let plain = engine.suggest("Quarterly results from Nike", None, None);

    assert!(boosted[0].reference.confidence > plain[0].reference.confidence);
    assert!(boosted[0].reference.confidence < 1.0);
}

#[test]
fn composite_orders_existing_before_novel_and_truncates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntityRepository::try_new(&conn).unwrap();
    repo.upsert_entity(&EntityRecord::new(EntityKind::Company, "c-nike", "Nike"))
        .unwrap();
    repo.upsert_entity(
        &EntityRecord::new(EntityKind::Company, "c-horizon", "Horizon Media")
            .with_category("AGENCY"),
    )
    .unwrap();

    let mut backends = CompositeSuggester::new(Vec::new());
    backends.push(IndexSuggester::new(SqliteEntityIndex::new(&conn)));
    backends.push(KeywordSuggester::new());
    let config = EngineConfig {
        suggestion_limit: 3,
        ..EngineConfig::default()
    };
    let engine = SuggestionEngine::with_config(backends, &config);

    let suggestions = engine.suggest(
        "Nike moves programmatic and retail media budgets to Horizon Media for CTV",
        Some("Nike agency review"),
        None,
    );

    let keys: Vec<_> = suggestions.iter().map(|s| s.dedup_key()).collect();
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[0], "company:c-horizon");
    assert_eq!(keys[1], "company:c-nike");
    assert!(keys[2].starts_with("manual-"));
}

fn directory_engine_keys(conn: &rusqlite::Connection, content: &str) -> Vec<String> {
    let engine = SuggestionEngine::new(IndexSuggester::new(SqliteEntityIndex::new(conn)));
    engine
        .suggest(content, None, None)
        .iter()
        .map(TopicSuggestion::dedup_key)
        .collect()
}

fn seeded_directory() -> rusqlite::Connection {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntityRepository::try_new(&conn).unwrap();
    repo.upsert_entity(
        &EntityRecord::new(EntityKind::Company, "c-ttd", "The Trade Desk").with_category("DSP_SSP"),
    )
    .unwrap();
    repo.upsert_entity(&EntityRecord::new(EntityKind::Company, "c-nike", "Nike"))
        .unwrap();
    repo.upsert_entity(&EntityRecord::new(
        EntityKind::Company,
        "c-horizon",
        "Horizon Media",
    ))
    .unwrap();
    conn
}

#[test]
fn names_starting_with_a_stopword_are_suggested() {
    let conn = seeded_directory();
    assert_eq!(
        directory_engine_keys(&conn, "Budgets shifted to The Trade Desk this quarter"),
        vec!["company:c-ttd"]
    );
}

#[test]
fn names_glued_to_capitalized_words_are_recovered() {
    let conn = seeded_directory();
    assert_eq!(
        directory_engine_keys(&conn, "Yesterday Nike announced a new agency review"),
        vec!["company:c-nike"]
    );
    assert_eq!(
        directory_engine_keys(&conn, "Agency Nike is reviewing"),
        vec!["company:c-nike"]
    );
    assert_eq!(
        directory_engine_keys(&conn, "Meanwhile Nike Horizon Media"),
        vec!["company:c-horizon", "company:c-nike"]
    );
}

#[test]
fn glued_fallback_needs_an_exact_name() {
    let conn = seeded_directory();
    // "Horizon" alone only prefix-matches "Horizon Media".
    assert!(directory_engine_keys(&conn, "Yesterday Horizon reported earnings").is_empty());
}
