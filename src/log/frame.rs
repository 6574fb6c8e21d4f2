//! Log frame definitions
//!
//! A frame wraps one committed transaction:
//! `[len u32][crc u32][header crc u32][payload]`, all little-endian. `crc`
//! covers the payload and `header crc` covers the eight bytes before it, so
//! a damaged length is never mistaken for a frame cut short at the tail.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Magic bytes identifying a bmarkdb store file
pub const MAGIC: &[u8; 4] = b"BMDB";

/// Current file format version
pub const FORMAT_VERSION: u16 = 1;

/// File header size: Magic (4) + Version (2) + Padding (2) = 8 bytes
pub const FILE_HEADER_SIZE: u64 = 8;

/// Frame header size: Len (4) + CRC (4) + Header CRC (4) = 12 bytes
pub const FRAME_HEADER_SIZE: usize = 12;

/// Largest payload a single frame may carry (64 MB)
pub const MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// One committed write transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Transaction id - strictly increasing across the log
    pub txid: u64,

    /// Mutations, in the order they were made
    pub ops: Vec<LogOp>,
}

/// Mutations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOp {
    /// Create a bucket (no-op if it exists)
    CreateBucket { name: String },

    /// Insert or replace a key in a bucket
    Put {
        bucket: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Set a bucket's sequence counter
    SetSequence { bucket: String, sequence: u64 },
}

impl Commit {
    pub fn new(txid: u64, ops: Vec<LogOp>) -> Self {
        Self { txid, ops }
    }

    /// Serialize into a complete frame (header + payload)
    pub fn encode_frame(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)
            .map_err(|e| StoreError::Encode(format!("commit {}: {}", self.txid, e)))?;

        if payload.len() > MAX_FRAME_SIZE as usize {
            return Err(StoreError::Encode(format!(
                "commit {} too large: {} bytes (max {})",
                self.txid,
                payload.len(),
                MAX_FRAME_SIZE
            )));
        }

        let header = FrameHeader::new(payload.len() as u32, crc32fast::hash(&payload));

        let mut frame = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
        frame.put_slice(&header.encode());
        frame.put_slice(&payload);

        Ok(frame.to_vec())
    }

    /// Deserialize a frame payload whose checksum already matched
    pub fn decode_payload(payload: &[u8]) -> Result<Self> {
        bincode::deserialize(payload)
            .map_err(|e| StoreError::Corruption(format!("undecodable commit payload: {}", e)))
    }
}

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Payload length in bytes
    pub len: u32,

    /// CRC32 of the payload
    pub crc: u32,

    /// CRC32 of the `len` and `crc` fields as stored
    pub checksum: u32,
}

impl FrameHeader {
    pub fn new(len: u32, crc: u32) -> Self {
        let mut header = Self { len, crc, checksum: 0 };
        header.checksum = header.computed_checksum();
        header
    }

    pub fn parse(bytes: &[u8; FRAME_HEADER_SIZE]) -> Self {
        let mut buf = &bytes[..];
        let len = buf.get_u32_le();
        let crc = buf.get_u32_le();
        let checksum = buf.get_u32_le();
        Self { len, crc, checksum }
    }

    pub fn encode(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        let mut buf = &mut bytes[..];
        buf.put_u32_le(self.len);
        buf.put_u32_le(self.crc);
        buf.put_u32_le(self.checksum);
        bytes
    }

    /// Whether the stored header checksum agrees with `len` and `crc`
    pub fn is_intact(&self) -> bool {
        self.checksum == self.computed_checksum()
    }

    fn computed_checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.len.to_le_bytes());
        hasher.update(&self.crc.to_le_bytes());
        hasher.finalize()
    }

    /// Check a payload against this header's checksum
    pub fn matches(&self, payload: &[u8]) -> bool {
        crc32fast::hash(payload) == self.crc
    }
}

/// Bytes written at the start of every new store file
pub fn encode_file_header() -> [u8; FILE_HEADER_SIZE as usize] {
    let mut header = [0u8; FILE_HEADER_SIZE as usize];
    header[0..4].copy_from_slice(MAGIC);
    header[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    header
}

/// Validate a file header read from disk
pub fn check_file_header(header: &[u8; FILE_HEADER_SIZE as usize]) -> Result<()> {
    if &header[0..4] != MAGIC {
        return Err(StoreError::Corruption(format!(
            "invalid store magic: expected BMDB, got {:?}",
            &header[0..4]
        )));
    }

    let mut version_bytes = &header[4..6];
    let version = version_bytes.get_u16_le();
    if version != FORMAT_VERSION {
        return Err(StoreError::Corruption(format!(
            "unsupported store version: {}",
            version
        )));
    }

    Ok(())
}
