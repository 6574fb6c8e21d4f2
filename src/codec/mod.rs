//! Record Codec Module
//!
//! Turns bookmarks into stored values and back. Callers go through
//! [`RecordCodec`], so a new value layout only touches this module.
//!
//! ## Value Format (version 1)
//! ```text
//! ┌─────────────┬──────────────┬────────────────────────────────┐
//! │ Version (1) │ CRC32 (4)    │ Body                           │
//! └─────────────┴──────────────┴────────────────────────────────┘
//! Body (bincode, fixed-width little-endian integers):
//!   id: u64 | title | site_name | link | description | image_url
//!   each string = len: u64 + UTF-8 bytes
//! ```

mod binary;

pub use binary::{BincodeCodec, MAX_RECORD_SIZE, VALUE_HEADER_SIZE, VALUE_VERSION};

use crate::bookmark::Bookmark;
use crate::error::Result;

/// Encodes and decodes stored bookmark values
pub trait RecordCodec: Send + Sync {
    /// Serialize a bookmark, id included
    fn encode(&self, bookmark: &Bookmark) -> Result<Vec<u8>>;

    /// Deserialize a stored value
    ///
    /// Truncated or malformed input is a decode error, never a partial record.
    fn decode(&self, bytes: &[u8]) -> Result<Bookmark>;
}
