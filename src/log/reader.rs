//! Log Reader
//!
//! Walks the frames of a store file in commit order.

use std::io::Read;

use crate::error::{Result, StoreError};

use super::{Commit, FrameHeader, FRAME_HEADER_SIZE, MAX_FRAME_SIZE};

/// Outcome of reading one frame
#[derive(Debug)]
pub enum FrameRead {
    /// A fully written, checksummed frame
    Complete { offset: u64, commit: Commit },

    /// The tail of the file holds a partially written frame starting at
    /// `offset`; everything from there on is discarded by recovery
    Torn { offset: u64, reason: String },
}

/// Reads frames between a start offset and the end of the file
pub struct LogReader<R> {
    reader: R,
    /// Offset of the next frame
    offset: u64,
    /// File length; no frame extends past this
    end: u64,
    /// Set once a torn frame has been reported
    done: bool,
}

impl<R: Read> LogReader<R> {
    /// `reader` must already be positioned at `start`
    pub fn new(reader: R, start: u64, end: u64) -> Self {
        Self {
            reader,
            offset: start,
            end,
            done: false,
        }
    }

    /// Offset just past the last complete frame read so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next frame, `None` at a clean end of file
    pub fn next_frame(&mut self) -> Result<Option<FrameRead>> {
        if self.done || self.offset >= self.end {
            return Ok(None);
        }

        let offset = self.offset;
        let remaining = self.end - offset;

        if remaining < FRAME_HEADER_SIZE as u64 {
            return Ok(Some(self.torn(format!(
                "incomplete frame header ({} of {} bytes)",
                remaining, FRAME_HEADER_SIZE
            ))));
        }

        let mut header_bytes = [0u8; FRAME_HEADER_SIZE];
        self.reader.read_exact(&mut header_bytes)?;
        let header = FrameHeader::parse(&header_bytes);

        if !header.is_intact() {
            // Space the filesystem extended but never wrote reads back as zeros
            if header_bytes.iter().all(|b| *b == 0) && self.rest_is_zeroed(remaining)? {
                return Ok(Some(self.torn("unwritten frame at end of file".to_string())));
            }
            return Err(StoreError::Corruption(format!(
                "damaged frame header at offset {}",
                offset
            )));
        }
        if header.len > MAX_FRAME_SIZE {
            return Err(StoreError::Corruption(format!(
                "frame at offset {} claims {} bytes (max {})",
                offset, header.len, MAX_FRAME_SIZE
            )));
        }

        // The header is intact, so a length past the end can only mean the
        // final append was cut short
        let frame_len = FRAME_HEADER_SIZE as u64 + header.len as u64;
        if frame_len > remaining {
            return Ok(Some(self.torn(format!(
                "payload truncated (expected {} bytes, {} available)",
                header.len,
                remaining - FRAME_HEADER_SIZE as u64
            ))));
        }

        let mut payload = vec![0u8; header.len as usize];
        self.reader.read_exact(&mut payload)?;

        if !header.matches(&payload) {
            // Only the final frame can have been cut short by a crash
            if offset + frame_len == self.end {
                return Ok(Some(self.torn("checksum mismatch in final frame".to_string())));
            }
            return Err(StoreError::Corruption(format!(
                "checksum mismatch in frame at offset {}",
                offset
            )));
        }

        let commit = Commit::decode_payload(&payload)?;
        self.offset += frame_len;

        tracing::trace!(offset, txid = commit.txid, ops = commit.ops.len(), "read frame");

        Ok(Some(FrameRead::Complete { offset, commit }))
    }

    /// Whether every byte after the current frame header up to `end` is zero
    fn rest_is_zeroed(&mut self, remaining: u64) -> Result<bool> {
        let mut rest = Vec::new();
        (&mut self.reader)
            .take(remaining - FRAME_HEADER_SIZE as u64)
            .read_to_end(&mut rest)?;
        Ok(rest.iter().all(|b| *b == 0))
    }

    fn torn(&mut self, reason: String) -> FrameRead {
        self.done = true;
        FrameRead::Torn {
            offset: self.offset,
            reason,
        }
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<FrameRead>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
