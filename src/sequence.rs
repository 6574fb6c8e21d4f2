//! Key encoding for sequence-numbered records.
//!
//! Ids are stored as 8-byte big-endian keys, so byte-wise key order is the
//! same as numeric id order and a reverse cursor walk yields newest first.

use crate::error::{Result, StoreError};

/// Size of an encoded key
pub const KEY_SIZE: usize = 8;

/// Encode an id as a store key
pub fn encode_key(id: u64) -> [u8; KEY_SIZE] {
    id.to_be_bytes()
}

/// Decode a store key back into an id
pub fn decode_key(key: &[u8]) -> Result<u64> {
    let bytes: [u8; KEY_SIZE] = key.try_into().map_err(|_| {
        StoreError::Decode(format!(
            "key must be {} bytes, got {}",
            KEY_SIZE,
            key.len()
        ))
    })?;
    Ok(u64::from_be_bytes(bytes))
}
