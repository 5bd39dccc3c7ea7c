use rusqlite::Connection;
use topicmesh_core::db::migrations::latest_version;
use topicmesh_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "entities");
    assert_table_exists(&conn, "entities_fts");
    assert_table_exists(&conn, "content_items");
    assert_table_exists(&conn, "content_mentions");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topicmesh.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO entities (kind, id, display_name) VALUES ('company', 'c1', 'Acme');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM entities;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_abstract_primary_topic_kinds() {
    let conn = open_db_in_memory().unwrap();

    let err = conn.execute(
        "INSERT INTO content_items (uuid, primary_topic_kind, primary_topic_id)
         VALUES ('a', 'category', 'cat1');",
        [],
    );
    assert!(err.is_err());

    let half_set = conn.execute(
        "INSERT INTO content_items (uuid, primary_topic_kind) VALUES ('b', 'company');",
        [],
    );
    assert!(half_set.is_err());
}

#[test]
fn schema_rejects_unknown_entity_kinds() {
    let conn = open_db_in_memory().unwrap();
    let err = conn.execute(
        "INSERT INTO entities (kind, id, display_name) VALUES ('planet', 'x', 'Mars');",
        [],
    );
    assert!(err.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
