//! Tests for bucket cursors
//!
//! These tests verify:
//! - first/last positioning
//! - Forward and backward stepping, including past either end
//! - seek to exact and in-between keys
//! - Empty buckets

use bmarkdb::config::{Config, SyncStrategy};
use bmarkdb::db::Database;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_db_with_keys(keys: &[&[u8]]) -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("cursor.db"))
        .sync_strategy(SyncStrategy::Never)
        .build();
    let db = Database::open(&config).unwrap();

    db.update(|tx| {
        let mut bucket = tx.create_bucket_if_not_exists("b")?;
        for key in keys {
            bucket.put(key, &[key[0]])?;
        }
        Ok(())
    })
    .unwrap();

    (temp_dir, db)
}

fn key_of(entry: Option<(&[u8], &[u8])>) -> Option<Vec<u8>> {
    entry.map(|(k, _)| k.to_vec())
}

// =============================================================================
// Positioning Tests
// =============================================================================

#[test]
fn test_cursor_first_and_last() {
    let (_temp, db) = setup_db_with_keys(&[b"b", b"a", b"c"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    assert_eq!(key_of(cursor.first()), Some(b"a".to_vec()));
    assert_eq!(key_of(cursor.last()), Some(b"c".to_vec()));
}

#[test]
fn test_cursor_returns_values() {
    let (_temp, db) = setup_db_with_keys(&[b"x"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    let (key, value) = cursor.first().unwrap();
    assert_eq!(key, b"x");
    assert_eq!(value, b"x");
}

#[test]
fn test_cursor_walk_forward() {
    let (_temp, db) = setup_db_with_keys(&[b"c", b"a", b"b"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    let mut keys = Vec::new();
    let mut entry = cursor.first();
    while let Some((key, _)) = entry {
        keys.push(key.to_vec());
        entry = cursor.next();
    }

    assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
}

#[test]
fn test_cursor_walk_backward() {
    let (_temp, db) = setup_db_with_keys(&[b"c", b"a", b"b"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    let mut keys = Vec::new();
    let mut entry = cursor.last();
    while let Some((key, _)) = entry {
        keys.push(key.to_vec());
        entry = cursor.prev();
    }

    assert_eq!(keys, vec![b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]);
}

#[test]
fn test_cursor_unpositioned_next_and_prev() {
    let (_temp, db) = setup_db_with_keys(&[b"a", b"z"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();

    assert_eq!(key_of(bucket.cursor().next()), Some(b"a".to_vec()));
    assert_eq!(key_of(bucket.cursor().prev()), Some(b"z".to_vec()));
}

#[test]
fn test_cursor_stays_exhausted() {
    let (_temp, db) = setup_db_with_keys(&[b"a", b"b"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    cursor.last();
    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());
    assert!(cursor.prev().is_none());

    // Repositioning revives it
    assert_eq!(key_of(cursor.first()), Some(b"a".to_vec()));
    assert!(cursor.prev().is_none());
}

// =============================================================================
// Seek Tests
// =============================================================================

#[test]
fn test_cursor_seek_exact_and_between() {
    let (_temp, db) = setup_db_with_keys(&[b"b", b"d", b"f"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    assert_eq!(key_of(cursor.seek(b"d")), Some(b"d".to_vec()));
    assert_eq!(key_of(cursor.seek(b"c")), Some(b"d".to_vec()));
    assert_eq!(key_of(cursor.next()), Some(b"f".to_vec()));
    assert_eq!(key_of(cursor.seek(b"a")), Some(b"b".to_vec()));
    assert!(cursor.seek(b"g").is_none());
}

#[test]
fn test_cursor_seek_then_prev() {
    let (_temp, db) = setup_db_with_keys(&[b"b", b"d", b"f"]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    cursor.seek(b"e");
    assert_eq!(key_of(cursor.prev()), Some(b"d".to_vec()));
}

#[test]
fn test_cursor_big_endian_keys_in_numeric_order() {
    let keys: Vec<[u8; 8]> = [1u64, 255, 256, 70_000].iter().map(|n| n.to_be_bytes()).collect();
    let refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
    let (_temp, db) = setup_db_with_keys(&refs);

    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    let mut ids = Vec::new();
    let mut entry = cursor.last();
    while let Some((key, _)) = entry {
        ids.push(u64::from_be_bytes(key.try_into().unwrap()));
        entry = cursor.prev();
    }

    assert_eq!(ids, vec![70_000, 256, 255, 1]);
}

// =============================================================================
// Empty Bucket Tests
// =============================================================================

#[test]
fn test_cursor_on_empty_bucket() {
    let (_temp, db) = setup_db_with_keys(&[]);
    let tx = db.begin_read();
    let bucket = tx.bucket("b").unwrap();
    let mut cursor = bucket.cursor();

    assert!(bucket.is_empty());
    assert!(cursor.first().is_none());
    assert!(cursor.last().is_none());
    assert!(cursor.next().is_none());
    assert!(cursor.seek(b"a").is_none());
}
