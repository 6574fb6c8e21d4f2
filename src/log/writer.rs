//! Log Writer
//!
//! Appends committed transactions to the store file.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use crate::config::SyncStrategy;
use crate::error::Result;

use super::Commit;

/// Appends frames to the store file
pub struct LogWriter {
    file: File,
    /// End of the last complete frame; the next frame goes here
    offset: u64,
    sync_strategy: SyncStrategy,
}

impl LogWriter {
    /// Wrap an open, locked store file whose valid data ends at `offset`
    pub fn new(file: File, offset: u64, sync_strategy: SyncStrategy) -> Self {
        Self {
            file,
            offset,
            sync_strategy,
        }
    }

    /// Append a commit as one frame and return the new end offset
    ///
    /// If the write fails part-way, the file is cut back to the previous
    /// end so the partial frame never becomes part of the log.
    pub fn append(&mut self, commit: &Commit) -> Result<u64> {
        let frame = commit.encode_frame()?;

        if let Err(e) = self.write_frame(&frame) {
            if let Err(trunc_err) = self.file.set_len(self.offset) {
                tracing::warn!(
                    offset = self.offset,
                    error = %trunc_err,
                    "failed to discard partial frame"
                );
            }
            return Err(e);
        }

        self.offset += frame.len() as u64;
        Ok(self.offset)
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(self.offset))?;
        self.file.write_all(frame)?;
        if self.sync_strategy == SyncStrategy::EveryCommit {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    pub fn sync_strategy(&self) -> SyncStrategy {
        self.sync_strategy
    }

    /// End of the last complete frame
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The underlying store file
    pub fn file(&self) -> &File {
        &self.file
    }
}
