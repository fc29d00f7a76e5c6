//! Unit tests for snippet storage operations.

use super::helpers::{next_created_micros, reverse_micros_key};
use super::SnippetDb;
use crate::models::snippet::{NewSnippet, OwnerId, Visibility};
use crate::store::InsertOutcome;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn setup_snippet_db() -> (SnippetDb, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("data.redb");
    let db = Arc::new(redb::Database::create(db_path).expect("open redb"));
    let snippet_db = SnippetDb::new(db).expect("open snippet db");
    (snippet_db, dir)
}

fn new_snippet(identifier: &str, owner: &str, visibility: Visibility) -> NewSnippet {
    NewSnippet {
        identifier: identifier.to_string(),
        content: format!("content of {}", identifier),
        visibility,
        owner_id: OwnerId::new(owner).expect("owner"),
    }
}

fn insert_ok(db: &SnippetDb, identifier: &str, owner: &str) -> crate::models::snippet::Snippet {
    match db
        .insert(&new_snippet(identifier, owner, Visibility::Public), 100)
        .expect("insert")
    {
        InsertOutcome::Inserted(snippet) => snippet,
        other => panic!("expected insert, got {:?}", other),
    }
}

#[test]
fn insert_then_find_by_identifier_returns_stored_row() {
    let (db, _dir) = setup_snippet_db();
    let stored = insert_ok(&db, "abc123", "alice");

    assert!(!stored.storage_key.is_empty());
    assert_ne!(stored.storage_key, stored.identifier);

    let found = db
        .find_by_identifier("abc123")
        .expect("lookup")
        .expect("row exists");
    assert_eq!(found, stored);
    assert_eq!(found.owner_id, "alice");
    assert!(db.find_by_identifier("missing").expect("lookup").is_none());
}

#[test]
fn insert_rejects_taken_identifier_without_overwrite() {
    let (db, _dir) = setup_snippet_db();
    let original = insert_ok(&db, "dup", "alice");

    let mut conflicting = new_snippet("dup", "bob", Visibility::Private);
    conflicting.content = "other".to_string();
    let outcome = db.insert(&conflicting, 100).expect("insert");
    assert_eq!(outcome, InsertOutcome::IdentifierTaken);

    let found = db
        .find_by_identifier("dup")
        .expect("lookup")
        .expect("original kept");
    assert_eq!(found.storage_key, original.storage_key);
    assert_eq!(db.count_by_owner("bob").expect("count"), 0);
}

#[test]
fn insert_reserves_quota_inside_the_write() {
    let (db, _dir) = setup_snippet_db();
    for identifier in ["q1", "q2"] {
        let outcome = db
            .insert(&new_snippet(identifier, "alice", Visibility::Public), 2)
            .expect("insert");
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));
    }

    let outcome = db
        .insert(&new_snippet("q3", "alice", Visibility::Public), 2)
        .expect("insert");
    assert_eq!(outcome, InsertOutcome::QuotaExceeded { used: 2 });
    assert!(db.find_by_identifier("q3").expect("lookup").is_none());

    let other_owner = db
        .insert(&new_snippet("q3", "bob", Visibility::Public), 2)
        .expect("insert");
    assert!(matches!(other_owner, InsertOutcome::Inserted(_)));
}

#[test]
fn find_by_owner_lists_newest_first_and_isolates_owners() {
    let (db, _dir) = setup_snippet_db();
    insert_ok(&db, "a1", "alice");
    insert_ok(&db, "b1", "bob");
    insert_ok(&db, "a2", "alice");
    insert_ok(&db, "a3", "alice");
    // Prefix of another owner id must not leak into the range scan.
    insert_ok(&db, "x1", "alice2");

    let rows = db.find_by_owner("alice").expect("list");
    let identifiers: Vec<&str> = rows.iter().map(|row| row.identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["a3", "a2", "a1"]);
    assert!(rows
        .windows(2)
        .all(|pair| pair[0].created_at > pair[1].created_at));

    assert_eq!(db.count_by_owner("alice").expect("count"), 3);
    assert_eq!(db.count_by_owner("bob").expect("count"), 1);
    assert_eq!(db.count_by_owner("carol").expect("count"), 0);
    assert!(db.find_by_owner("carol").expect("list").is_empty());
}

#[test]
fn created_at_is_strictly_increasing_within_the_store() {
    let (db, _dir) = setup_snippet_db();
    let mut previous = None;
    for index in 0..50 {
        let row = insert_ok(&db, &format!("mono{}", index), "alice");
        if let Some(previous) = previous {
            assert!(row.created_at > previous, "row {} not after previous", index);
        }
        previous = Some(row.created_at);
    }
}

#[test]
fn delete_removes_row_and_indexes_and_is_idempotent() {
    let (db, _dir) = setup_snippet_db();
    let stored = insert_ok(&db, "gone", "alice");

    let deleted = db
        .delete(&stored.storage_key)
        .expect("delete")
        .expect("row existed");
    assert_eq!(deleted.identifier, "gone");

    assert!(db.find_by_identifier("gone").expect("lookup").is_none());
    assert_eq!(db.count_by_owner("alice").expect("count"), 0);
    assert!(db.delete(&stored.storage_key).expect("delete").is_none());

    // The identifier is free again once the row is gone.
    let reused = insert_ok(&db, "gone", "bob");
    assert_ne!(reused.storage_key, stored.storage_key);
}

#[test]
fn concurrent_inserts_with_same_identifier_commit_once() {
    let (db, _dir) = setup_snippet_db();
    let db = Arc::new(db);
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|index| {
            let db = db.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                db.insert(
                    &new_snippet("race", &format!("owner{}", index), Visibility::Public),
                    10,
                )
                .expect("insert")
            })
        })
        .collect();

    let inserted = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .filter(|outcome| matches!(outcome, InsertOutcome::Inserted(_)))
        .count();
    assert_eq!(inserted, 1);
}

#[test]
fn concurrent_inserts_never_exceed_owner_quota() {
    let (db, _dir) = setup_snippet_db();
    let db = Arc::new(db);
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|index| {
            let db = db.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                db.insert(
                    &new_snippet(&format!("slot{}", index), "alice", Visibility::Public),
                    3,
                )
                .expect("insert")
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker");
    }
    assert_eq!(db.count_by_owner("alice").expect("count"), 3);
}

#[test]
fn next_created_micros_never_goes_backwards() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("time");
    let now_micros = now.timestamp_micros() as u64;

    assert_eq!(next_created_micros(now, 0), now_micros);
    assert_eq!(next_created_micros(now, now_micros), now_micros + 1);
    assert_eq!(next_created_micros(now, now_micros + 500), now_micros + 501);
    assert!(reverse_micros_key(now_micros + 1) < reverse_micros_key(now_micros));
}
