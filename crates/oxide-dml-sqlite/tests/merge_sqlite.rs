//! End-to-end merges against an in-memory SQLite database.

use oxide_dml_core::{Configuration, DmlError, Entity, ListSubQuery, SqlMergeClause, SqlQuery};
use oxide_dml_derive::Entity;
use oxide_dml_sqlite::{SqliteConnection, SqliteDialect};
use url::Url;

#[allow(dead_code)]
#[derive(Debug, Entity)]
#[entity(table = "survey")]
struct Survey {
    id: i64,
    name: Option<String>,
    homepage: Option<Url>,
}

fn open() -> rusqlite::Connection {
    let db = rusqlite::Connection::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE survey (id INTEGER PRIMARY KEY, name TEXT, homepage VARCHAR(255));
         INSERT INTO survey (id, name) VALUES (5, 'x');",
    )
    .unwrap();
    db
}

fn native() -> Configuration {
    Configuration::new(SqliteDialect::new())
}

fn composite() -> Configuration {
    Configuration::new(SqliteDialect::new().with_native_merge(false))
}

fn count(db: &rusqlite::Connection) -> i64 {
    db.query_row("SELECT COUNT(*) FROM survey", [], |row| row.get(0))
        .unwrap()
}

fn name_of(db: &rusqlite::Connection, id: i64) -> Option<String> {
    db.query_row("SELECT name FROM survey WHERE id = ?1", [id], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_composite_merge_updates_existing_row() {
    let db = open();
    let mut conn = SqliteConnection::new(&db);

    let rows = SqlMergeClause::new(&mut conn, composite(), SurveyEntity::entity())
        .keys(&[&Survey::id()])
        .set(&Survey::id(), 5_i64)
        .set(&Survey::name(), String::from("x"))
        .execute()
        .unwrap();

    assert_eq!(rows, 1);
    assert_eq!(count(&db), 1);
}

#[test]
fn test_composite_merge_inserts_missing_row() {
    let db = open();
    let mut conn = SqliteConnection::new(&db);

    let rows = SqlMergeClause::new(&mut conn, composite(), SurveyEntity::entity())
        .keys(&[&Survey::id()])
        .set(&Survey::id(), 999_i64)
        .set(&Survey::name(), String::from("x"))
        .execute()
        .unwrap();

    assert_eq!(rows, 1);
    assert_eq!(count(&db), 2);
    assert_eq!(name_of(&db, 999).as_deref(), Some("x"));
}

#[test]
fn test_composite_merge_probes_null_with_is_null() {
    let db = open();
    db.execute("INSERT INTO survey (id, name) VALUES (7, NULL)", [])
        .unwrap();
    let mut conn = SqliteConnection::new(&db);

    // `name = NULL` would never match and the INSERT would hit the primary key
    let rows = SqlMergeClause::new(&mut conn, composite(), SurveyEntity::entity())
        .keys(&[&Survey::id()])
        .set(&Survey::id(), 7_i64)
        .set(&Survey::name(), None)
        .execute()
        .unwrap();

    assert_eq!(rows, 1);
    assert_eq!(count(&db), 2);
}

#[test]
fn test_composite_merge_decides_on_first_key_only() {
    let db = rusqlite::Connection::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE membership (org TEXT, member TEXT, role TEXT);
         INSERT INTO membership VALUES ('acme', 'alice', 'admin'), ('acme', 'bob', 'admin');",
    )
    .unwrap();
    let org = oxide_dml_core::Path::<String>::new("org");
    let member = oxide_dml_core::Path::<String>::new("member");
    let role = oxide_dml_core::Path::<String>::new("role");
    let mut conn = SqliteConnection::new(&db);

    let rows = SqlMergeClause::new(&mut conn, composite(), "membership")
        .keys(&[&org, &member])
        .set(&org, String::from("acme"))
        .set(&role, String::from("admin"))
        .execute()
        .unwrap();

    // both rows match the first key, whatever their member
    assert_eq!(rows, 2);
}

#[test]
fn test_native_merge_updates_and_inserts() {
    let db = open();
    let mut conn = SqliteConnection::new(&db);

    let updated = SqlMergeClause::new(&mut conn, native(), SurveyEntity::entity())
        .keys(&[&Survey::id()])
        .set(&Survey::id(), 5_i64)
        .set(&Survey::name(), String::from("renamed"))
        .execute()
        .unwrap();
    let inserted = SqlMergeClause::new(&mut conn, native(), SurveyEntity::entity())
        .keys(&[&Survey::id()])
        .set(&Survey::id(), 6_i64)
        .set(&Survey::name(), String::from("new"))
        .execute()
        .unwrap();

    assert_eq!((updated, inserted), (1, 1));
    assert_eq!(name_of(&db, 5).as_deref(), Some("renamed"));
    assert_eq!(name_of(&db, 6).as_deref(), Some("new"));
}

#[test]
fn test_native_merge_with_repeated_key() {
    let db = open();
    let mut conn = SqliteConnection::new(&db);

    let rows = SqlMergeClause::new(&mut conn, native(), SurveyEntity::entity())
        .keys(&[&Survey::id(), &Survey::id()])
        .set(&Survey::id(), 5_i64)
        .set(&Survey::name(), String::from("y"))
        .execute()
        .unwrap();

    assert_eq!(rows, 1);
    assert_eq!(count(&db), 1);
    assert_eq!(name_of(&db, 5).as_deref(), Some("y"));
}

#[test]
fn test_native_merge_from_sub_query() {
    let db = open();
    db.execute_batch(
        "CREATE TABLE survey_import (id INTEGER, name TEXT);
         INSERT INTO survey_import VALUES (5, 'imported'), (8, 'fresh');",
    )
    .unwrap();
    let mut conn = SqliteConnection::new(&db);

    let rows = SqlMergeClause::new(&mut conn, native(), SurveyEntity::entity())
        .keys(&[&Survey::id()])
        .columns(&[&Survey::id(), &Survey::name()])
        .select(
            ListSubQuery::new("survey_import")
                .column(&Survey::id())
                .column(&Survey::name()),
        )
        .execute()
        .unwrap();

    assert_eq!(rows, 2);
    assert_eq!(name_of(&db, 5).as_deref(), Some("imported"));
    assert_eq!(name_of(&db, 8).as_deref(), Some("fresh"));
}

#[test]
fn test_url_round_trip() {
    let db = open();
    let homepage = Url::parse("https://example.com/survey?id=5").unwrap();
    let mut conn = SqliteConnection::new(&db);

    SqlMergeClause::new(&mut conn, native(), SurveyEntity::entity())
        .keys(&[&Survey::id()])
        .set(&Survey::id(), 5_i64)
        .set(&Survey::homepage(), homepage.clone())
        .execute()
        .unwrap();

    let stored: String = db
        .query_row("SELECT homepage FROM survey WHERE id = 5", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, "https://example.com/survey?id=5");

    let read = SqlQuery::new(&mut conn, native(), SurveyEntity::entity())
        .where_(Survey::id().eq(5))
        .list(&Survey::homepage())
        .unwrap();
    assert_eq!(read, vec![Some(homepage)]);
}

#[test]
fn test_merge_inside_rolled_back_transaction() {
    let mut db = open();
    {
        let tx = db.transaction().unwrap();
        let mut conn = SqliteConnection::new(&tx);
        SqlMergeClause::new(&mut conn, composite(), SurveyEntity::entity())
            .keys(&[&Survey::id()])
            .set(&Survey::id(), 42_i64)
            .execute()
            .unwrap();
        tx.rollback().unwrap();
    }
    assert_eq!(count(&db), 1);
}

#[test]
fn test_backend_error_carries_sql() {
    let db = rusqlite::Connection::open_in_memory().unwrap();
    db.execute_batch("CREATE TABLE loose (id INTEGER, name TEXT);")
        .unwrap();
    let id = oxide_dml_core::Path::<i64>::new("id");
    let mut conn = SqliteConnection::new(&db);

    // no unique constraint to resolve the conflict target against
    let err = SqlMergeClause::new(&mut conn, native(), "loose")
        .keys(&[&id])
        .set(&id, 1_i64)
        .execute()
        .unwrap_err();

    assert!(matches!(err, DmlError::Execution { .. }));
    assert_eq!(
        err.sql(),
        Some(r#"INSERT INTO "loose" ("id") VALUES (?) ON CONFLICT ("id") DO NOTHING"#)
    );
}
