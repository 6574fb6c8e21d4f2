//! Tests for commit log recovery
//!
//! These tests verify:
//! - Recovery from a new (empty) file
//! - Recovery from a clean log
//! - Torn tail truncation (partial final frame)
//! - Corruption detection (bad header, damaged frame mid-log)
//! - Scan mode (report only, file untouched)

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use bmarkdb::log::{encode_file_header, Commit, LogOp, LogRecovery, FILE_HEADER_SIZE};
use bmarkdb::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.db");
    (temp_dir, path)
}

fn commit(txid: u64) -> Commit {
    let mut ops = Vec::new();
    if txid == 1 {
        ops.push(LogOp::CreateBucket {
            name: "bookmarks".to_string(),
        });
    }
    ops.push(LogOp::SetSequence {
        bucket: "bookmarks".to_string(),
        sequence: txid,
    });
    ops.push(LogOp::Put {
        bucket: "bookmarks".to_string(),
        key: txid.to_be_bytes().to_vec(),
        value: format!("value{}", txid).into_bytes(),
    });
    Commit::new(txid, ops)
}

/// Write a well-formed log with `count` commits; returns frame lengths
fn write_log(path: &Path, count: u64) -> Vec<u64> {
    let mut file = File::create(path).unwrap();
    file.write_all(&encode_file_header()).unwrap();

    let mut lens = Vec::new();
    for txid in 1..=count {
        let frame = commit(txid).encode_frame().unwrap();
        file.write_all(&frame).unwrap();
        lens.push(frame.len() as u64);
    }
    file.sync_all().unwrap();
    lens
}

fn append_bytes(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

fn open_rw(path: &Path) -> File {
    OpenOptions::new().read(true).write(true).open(path).unwrap()
}

// =============================================================================
// Recover: Clean Log Tests
// =============================================================================

#[test]
fn test_recover_empty_file() {
    let (_temp, path) = setup_temp_log();
    File::create(&path).unwrap();

    let (commits, report) = LogRecovery::recover(&mut open_rw(&path)).unwrap();

    assert!(commits.is_empty());
    assert!(report.is_new);
    assert_eq!(report.commits_replayed, 0);
    assert_eq!(report.last_txid, 0);
    assert!(!report.was_truncated);
}

#[test]
fn test_recover_header_only() {
    let (_temp, path) = setup_temp_log();
    write_log(&path, 0);

    let (commits, report) = LogRecovery::recover(&mut open_rw(&path)).unwrap();

    assert!(commits.is_empty());
    assert!(!report.is_new);
    assert_eq!(report.valid_len, FILE_HEADER_SIZE);
}

#[test]
fn test_recover_multiple_commits() {
    let (_temp, path) = setup_temp_log();
    let lens = write_log(&path, 10);

    let (commits, report) = LogRecovery::recover(&mut open_rw(&path)).unwrap();

    assert_eq!(commits.len(), 10);
    assert_eq!(report.commits_replayed, 10);
    assert_eq!(report.last_txid, 10);
    assert_eq!(report.valid_len, FILE_HEADER_SIZE + lens.iter().sum::<u64>());
    assert!(!report.was_truncated);

    for (i, c) in commits.iter().enumerate() {
        assert_eq!(*c, commit(i as u64 + 1));
    }
}

// =============================================================================
// Recover: Torn Tail Tests (was_truncated = true)
// =============================================================================

#[test]
fn test_recover_truncates_partial_header() {
    let (_temp, path) = setup_temp_log();
    write_log(&path, 3);
    let clean_len = fs::metadata(&path).unwrap().len();
    append_bytes(&path, &[0xAB; 5]);

    let (commits, report) = LogRecovery::recover(&mut open_rw(&path)).unwrap();

    assert_eq!(commits.len(), 3);
    assert!(report.was_truncated);
    assert_eq!(report.discarded_bytes, 5);
    assert_eq!(report.valid_len, clean_len);
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len);
}

#[test]
fn test_recover_truncates_partial_payload() {
    let (_temp, path) = setup_temp_log();
    let lens = write_log(&path, 4);
    let full_len = fs::metadata(&path).unwrap().len();

    // Cut the last frame in half
    let cut = full_len - lens[3] / 2;
    open_rw(&path).set_len(cut).unwrap();

    let (commits, report) = LogRecovery::recover(&mut open_rw(&path)).unwrap();

    assert_eq!(commits.len(), 3);
    assert_eq!(report.last_txid, 3);
    assert!(report.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), full_len - lens[3]);
}

#[test]
fn test_recover_is_idempotent_after_truncation() {
    let (_temp, path) = setup_temp_log();
    write_log(&path, 2);
    append_bytes(&path, &[0u8; 3]);

    LogRecovery::recover(&mut open_rw(&path)).unwrap();
    let (commits, report) = LogRecovery::recover(&mut open_rw(&path)).unwrap();

    assert_eq!(commits.len(), 2);
    assert!(!report.was_truncated);
    assert!(!report.has_torn_tail());
}

// =============================================================================
// Recover: Corruption Tests
// =============================================================================

#[test]
fn test_recover_rejects_bad_magic() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, b"NOTADATABASEFILE").unwrap();

    let err = LogRecovery::recover(&mut open_rw(&path)).unwrap_err();
    assert!(matches!(err, StoreError::Corruption(_)));
}

#[test]
fn test_recover_rejects_file_shorter_than_header() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, b"BMD").unwrap();

    let err = LogRecovery::recover(&mut open_rw(&path)).unwrap_err();
    assert!(matches!(err, StoreError::Corruption(_)));
}

#[test]
fn test_recover_rejects_damaged_middle_frame() {
    let (_temp, path) = setup_temp_log();
    let lens = write_log(&path, 3);

    // Flip the last payload byte of the first frame
    let mut bytes = fs::read(&path).unwrap();
    let pos = (FILE_HEADER_SIZE + lens[0] - 1) as usize;
    bytes[pos] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let err = LogRecovery::recover(&mut open_rw(&path)).unwrap_err();
    assert!(matches!(err, StoreError::Corruption(_)));

    // Nothing was cut off
    assert_eq!(fs::read(&path).unwrap().len(), bytes.len());
}

#[test]
fn test_recover_rejects_damaged_length_in_first_of_three() {
    let (_temp, path) = setup_temp_log();
    write_log(&path, 3);

    // High byte of the first frame's length: the frame now claims to run
    // past the end of the file
    let mut bytes = fs::read(&path).unwrap();
    bytes[FILE_HEADER_SIZE as usize + 3] = 0xFF;
    fs::write(&path, &bytes).unwrap();

    let err = LogRecovery::scan(&mut File::open(&path).unwrap()).unwrap_err();
    assert!(matches!(err, StoreError::Corruption(_)));

    let err = LogRecovery::recover(&mut open_rw(&path)).unwrap_err();
    assert!(matches!(err, StoreError::Corruption(_)));

    // Every committed frame is still on disk
    assert_eq!(fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_recover_rejects_out_of_order_txids() {
    let (_temp, path) = setup_temp_log();
    let mut file = File::create(&path).unwrap();
    file.write_all(&encode_file_header()).unwrap();
    file.write_all(&commit(2).encode_frame().unwrap()).unwrap();
    file.write_all(&commit(2).encode_frame().unwrap()).unwrap();
    drop(file);

    let err = LogRecovery::recover(&mut open_rw(&path)).unwrap_err();
    assert!(matches!(err, StoreError::Corruption(ref msg) if msg.contains("txid")));
}

// =============================================================================
// Scan Mode Tests
// =============================================================================

#[test]
fn test_scan_reports_without_truncating() {
    let (_temp, path) = setup_temp_log();
    write_log(&path, 2);
    append_bytes(&path, &[0xCD; 6]);
    let len_before = fs::metadata(&path).unwrap().len();

    let mut file = File::open(&path).unwrap();
    let (commits, report) = LogRecovery::scan(&mut file).unwrap();

    assert_eq!(commits.len(), 2);
    assert!(report.has_torn_tail());
    assert_eq!(report.discarded_bytes, 6);
    assert!(!report.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), len_before);
}
