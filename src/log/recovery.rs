//! Log Recovery
//!
//! Rebuilds the committed state from the store file on open.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::error::{Result, StoreError};

use super::{check_file_header, Commit, FrameRead, LogReader, FILE_HEADER_SIZE};

/// Handles replay of the commit log
pub struct LogRecovery;

/// Result of a recovery scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Number of committed transactions replayed
    pub commits_replayed: u64,

    /// Txid of the last valid commit (0 if none)
    pub last_txid: u64,

    /// Length of the file up to the end of the last valid frame
    pub valid_len: u64,

    /// Bytes after `valid_len` belonging to a torn frame
    pub discarded_bytes: u64,

    /// Whether the torn tail was cut off the file
    pub was_truncated: bool,

    /// The file was empty (never initialised)
    pub is_new: bool,
}

impl RecoveryReport {
    /// Whether the file ends with a partially written frame
    pub fn has_torn_tail(&self) -> bool {
        self.discarded_bytes > 0
    }
}

impl LogRecovery {
    /// Recover committed transactions from an exclusively locked store file
    ///
    /// This will:
    /// 1. Validate the file header
    /// 2. Read every complete frame in order
    /// 3. Truncate a torn frame at the end
    /// 4. Return all commits in order
    ///
    /// A damaged frame anywhere before the tail is reported as corruption.
    pub fn recover(file: &mut File) -> Result<(Vec<Commit>, RecoveryReport)> {
        let (commits, mut report) = Self::scan(file)?;

        if report.has_torn_tail() {
            tracing::warn!(
                valid_len = report.valid_len,
                discarded_bytes = report.discarded_bytes,
                "truncating torn frame at end of store file"
            );
            file.set_len(report.valid_len)?;
            file.sync_all()?;
            report.was_truncated = true;
        }

        Ok((commits, report))
    }

    /// Read every committed transaction without modifying the file
    pub fn scan(file: &mut File) -> Result<(Vec<Commit>, RecoveryReport)> {
        let file_len = file.metadata()?.len();
        let mut report = RecoveryReport::default();

        if file_len == 0 {
            report.is_new = true;
            return Ok((Vec::new(), report));
        }
        if file_len < FILE_HEADER_SIZE {
            return Err(StoreError::Corruption(format!(
                "store file shorter than its header ({} bytes)",
                file_len
            )));
        }

        file.seek(SeekFrom::Start(0))?;
        let mut header = [0u8; FILE_HEADER_SIZE as usize];
        file.read_exact(&mut header)?;
        check_file_header(&header)?;

        let mut reader = LogReader::new(BufReader::new(&*file), FILE_HEADER_SIZE, file_len);
        let mut commits = Vec::new();

        while let Some(frame) = reader.next_frame()? {
            match frame {
                FrameRead::Complete { offset, commit } => {
                    if commit.txid <= report.last_txid {
                        return Err(StoreError::Corruption(format!(
                            "txid {} at offset {} does not follow txid {}",
                            commit.txid, offset, report.last_txid
                        )));
                    }
                    report.last_txid = commit.txid;
                    report.commits_replayed += 1;
                    commits.push(commit);
                }
                FrameRead::Torn { offset, reason } => {
                    tracing::debug!(offset, %reason, "torn frame at end of store file");
                    report.discarded_bytes = file_len - offset;
                }
            }
        }
        report.valid_len = reader.offset();

        Ok((commits, report))
    }
}
