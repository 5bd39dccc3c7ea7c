use topicmesh_core::{
    open_db_in_memory, EntityIndex, EntityKind, EntityRecord, EntityRepository, RepoError,
    SqliteEntityIndex, SqliteEntityRepository,
};

fn seed(conn: &rusqlite::Connection) {
    let repo = SqliteEntityRepository::try_new(conn).unwrap();
    for record in [
        EntityRecord::new(EntityKind::Company, "c-horizon", "Horizon Media").with_category("AGENCY"),
        EntityRecord::new(EntityKind::Company, "c-hori", "Horizontal Digital"),
        EntityRecord::new(EntityKind::Contact, "p-jane", "Jane Horner"),
        EntityRecord::new(EntityKind::Topic, "t-ctv", "Connected TV")
            .with_description("Streaming to TV screens"),
        EntityRecord::new(EntityKind::Company, "c-nike", "Nike"),
    ] {
        repo.upsert_entity(&record).unwrap();
    }
}

#[test]
fn find_matches_token_prefixes_across_kinds() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let index = SqliteEntityIndex::new(&conn);

    let ids: Vec<_> = index
        .find("hor", 10)
        .unwrap()
        .into_iter()
        .map(|found| found.id)
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&"c-horizon".to_string()));
    assert!(ids.contains(&"c-hori".to_string()));
    assert!(ids.contains(&"p-jane".to_string()));

    let multi = index.find("horizon med", 10).unwrap();
    assert_eq!(multi.len(), 1);
    assert_eq!(multi[0].kind, EntityKind::Company);
    assert_eq!(multi[0].category.as_deref(), Some("AGENCY"));
}

#[test]
fn find_respects_limit_and_returns_metadata() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let index = SqliteEntityIndex::new(&conn);

    assert_eq!(index.find("hor", 2).unwrap().len(), 2);
    assert!(index.find("hor", 0).unwrap().is_empty());

    let ctv = index.find("connected", 5).unwrap();
    assert_eq!(ctv.len(), 1);
    assert_eq!(ctv[0].description.as_deref(), Some("Streaming to TV screens"));
}

#[test]
fn find_treats_fts_syntax_as_plain_text() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let index = SqliteEntityIndex::new(&conn);

    assert!(index.find("\"nike", 5).is_ok());
    assert!(index.find("nike OR", 5).is_ok());
    assert!(index.find("NEAR(", 5).is_ok());
    assert!(index.find("  ***  ", 5).unwrap().is_empty());
}

#[test]
fn deactivated_and_renamed_entities_follow_the_index() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqliteEntityRepository::try_new(&conn).unwrap();
    let index = SqliteEntityIndex::new(&conn);

    repo.deactivate_entity(EntityKind::Company, "c-nike").unwrap();
    assert!(index.find("nike", 5).unwrap().is_empty());
    let stored = repo.get_entity(EntityKind::Company, "c-nike").unwrap().unwrap();
    assert!(!stored.is_active);

    repo.upsert_entity(&EntityRecord::new(EntityKind::Company, "c-hori", "Globex"))
        .unwrap();
    assert!(index.find("horizontal", 5).unwrap().is_empty());
    assert_eq!(index.find("glob", 5).unwrap()[0].id, "c-hori");
}

#[test]
fn repository_rejects_blank_names_and_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntityRepository::try_new(&conn).unwrap();

    let err = repo
        .upsert_entity(&EntityRecord::new(EntityKind::Company, "c1", "   "))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));

    let err = repo
        .deactivate_entity(EntityKind::Contact, "missing")
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert!(repo.get_entity(EntityKind::Contact, "missing").unwrap().is_none());
}

#[test]
fn repository_requires_migrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteEntityRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("entities")));
}
