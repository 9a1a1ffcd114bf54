//! Runs the `oxide-dml` binary against a scratch database.

use std::path::Path;
use std::process::{Command, Output};

fn oxide_dml(database: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oxide-dml"))
        .arg("--database")
        .arg(database)
        .args(args)
        .output()
        .unwrap()
}

fn scratch_database() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.sqlite3");
    let db = rusqlite::Connection::open(&path).unwrap();
    db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, homepage TEXT)")
        .unwrap();
    (dir, path)
}

fn names(path: &Path) -> Vec<(i64, Option<String>)> {
    let db = rusqlite::Connection::open(path).unwrap();
    let mut stmt = db.prepare("SELECT id, name FROM users ORDER BY id").unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_merge_inserts_then_updates() {
    let (_dir, path) = scratch_database();

    let first = oxide_dml(
        &path,
        &["merge", "--table", "users", "--key", "id", "--set", "id=int:1", "--set", "name=text:Alice"],
    );
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));

    let second = oxide_dml(
        &path,
        &["merge", "-t", "users", "-k", "id", "-s", "id=int:1", "-s", "name=text:Bob"],
    );
    assert!(second.status.success());
    assert_eq!(String::from_utf8_lossy(&second.stdout).trim(), "1 row(s) affected");
    assert!(String::from_utf8_lossy(&second.stderr).contains("Merged"));

    assert_eq!(names(&path), vec![(1, Some(String::from("Bob")))]);
}

#[test]
fn test_composite_merge_with_null() {
    let (_dir, path) = scratch_database();

    let output = oxide_dml(
        &path,
        &[
            "merge", "--table", "users", "--key", "id", "--set", "id=int:2", "--set", "name=null",
            "--set", "homepage=url:https://example.com/", "--composite",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(names(&path), vec![(2, None)]);
}

#[test]
fn test_dry_run_json_leaves_database_untouched() {
    let (_dir, path) = scratch_database();

    let output = oxide_dml(
        &path,
        &[
            "merge", "--table", "users", "--key", "id", "--set", "id=int:3", "--set",
            "name=text:Carol", "--dry-run", "--json",
        ],
    );
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["strategy"], "native");
    assert!(plan["sql"]
        .as_str()
        .unwrap()
        .starts_with(r#"INSERT INTO "users" ("id", "name") VALUES (?, ?) ON CONFLICT ("id")"#));
    assert_eq!(plan["parameters"][0]["Int"], 3);
    assert!(names(&path).is_empty());
}

#[test]
fn test_malformed_assignment_is_rejected() {
    let (_dir, path) = scratch_database();

    let output = oxide_dml(
        &path,
        &["merge", "--table", "users", "--key", "id", "--set", "id=five"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid assignment 'id=five'"));
}

#[test]
fn test_unassigned_key_is_rejected() {
    let (_dir, path) = scratch_database();

    let output = oxide_dml(
        &path,
        &["merge", "--table", "users", "--key", "email", "--set", "id=int:1"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Key column 'email'"));
}
