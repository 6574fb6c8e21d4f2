//! Versioned, checksummed bincode encoding.

use bincode::Options;
use bytes::{Buf, BufMut, BytesMut};

use crate::bookmark::Bookmark;
use crate::error::{Result, StoreError};

use super::RecordCodec;

/// Current value layout version
pub const VALUE_VERSION: u8 = 1;

/// Value header size: Version (1) + CRC32 (4) = 5 bytes
pub const VALUE_HEADER_SIZE: usize = 5;

/// Largest body accepted in either direction (1 MB)
pub const MAX_RECORD_SIZE: u64 = 1024 * 1024;

/// The default [`RecordCodec`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

fn body_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_RECORD_SIZE)
        .reject_trailing_bytes()
}

impl RecordCodec for BincodeCodec {
    fn encode(&self, bookmark: &Bookmark) -> Result<Vec<u8>> {
        let body = body_options()
            .serialize(bookmark)
            .map_err(|e| StoreError::Encode(format!("bookmark {}: {}", bookmark.id, e)))?;

        let mut value = BytesMut::with_capacity(VALUE_HEADER_SIZE + body.len());
        value.put_u8(VALUE_VERSION);
        value.put_u32_le(crc32fast::hash(&body));
        value.put_slice(&body);

        Ok(value.to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Bookmark> {
        if bytes.is_empty() {
            return Err(StoreError::Decode("empty value".to_string()));
        }
        if bytes.len() < VALUE_HEADER_SIZE {
            return Err(StoreError::Decode(format!(
                "value too short: {} bytes",
                bytes.len()
            )));
        }

        let (mut header, body) = bytes.split_at(VALUE_HEADER_SIZE);
        let version = header.get_u8();
        let crc = header.get_u32_le();

        if version != VALUE_VERSION {
            return Err(StoreError::Decode(format!(
                "unsupported value version: {}",
                version
            )));
        }
        if crc32fast::hash(body) != crc {
            return Err(StoreError::Decode("value checksum mismatch".to_string()));
        }

        body_options()
            .deserialize(body)
            .map_err(|e| StoreError::Decode(format!("malformed bookmark: {}", e)))
    }
}
