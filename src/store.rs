//! Bookmark Store
//!
//! The two operations the application layer uses: save a bookmark, list
//! every bookmark newest first.
//!
//! ## Handle Lifecycle
//! Each operation opens the store file, runs one transaction, and closes it
//! again, so the file lock is only held for the duration of that operation
//! and no handle outlives a request. Saves open read-write (exclusive lock);
//! listings open read-only (shared lock) and can run side by side.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::bookmark::{Bookmark, NewBookmark, MAX_CONTENT_LEN};
use crate::codec::{BincodeCodec, RecordCodec};
use crate::config::{Config, CorruptRecordPolicy};
use crate::db::{Database, ReadTx};
use crate::error::{Result, StoreError};
use crate::sequence::{decode_key, encode_key};

/// Name of the bucket holding every bookmark
pub const BOOKMARKS_BUCKET: &str = "bookmarks";

/// Result of a listing, with any records the policy skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Decoded bookmarks, newest first
    pub bookmarks: Vec<Bookmark>,

    /// Keys of records that could not be decoded (only under `Skip`)
    pub skipped_keys: Vec<Vec<u8>>,
}

impl Listing {
    pub fn skipped_count(&self) -> usize {
        self.skipped_keys.len()
    }
}

/// Persists bookmarks in a single store file
pub struct BookmarkStore<C = BincodeCodec> {
    config: Config,
    codec: C,
}

impl BookmarkStore {
    pub fn new(config: Config) -> Self {
        Self::with_codec(config, BincodeCodec)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified file path
    pub fn open_path(path: impl AsRef<Path>) -> Self {
        Self::new(Config::builder().path(path.as_ref()).build())
    }
}

impl<C: RecordCodec> BookmarkStore<C> {
    pub fn with_codec(config: Config, codec: C) -> Self {
        Self { config, codec }
    }

    /// Persist a bookmark and return the id assigned to it
    ///
    /// Steps (one write transaction):
    /// 1. Create the bookmarks bucket if missing
    /// 2. Take the bucket's next sequence number as the id
    /// 3. Encode the record
    /// 4. Put it under the big-endian id
    ///
    /// If any step fails nothing is written and the id is not consumed.
    ///
    /// Once the transaction has committed the id is returned even if closing
    /// the file afterwards fails; the record is already in the log.
    pub fn save(&self, bookmark: NewBookmark) -> Result<u64> {
        if bookmark.link.is_empty() {
            return Err(StoreError::InvalidRecord("link must not be empty".to_string()));
        }
        if bookmark.content_len() > MAX_CONTENT_LEN {
            return Err(StoreError::InvalidRecord(format!(
                "bookmark is {} bytes (max {})",
                bookmark.content_len(),
                MAX_CONTENT_LEN
            )));
        }

        let db = Database::open(&self.config)?;

        let saved = db.update(|tx| {
            let mut bucket = tx.create_bucket_if_not_exists(BOOKMARKS_BUCKET)?;
            let id = bucket.next_sequence()?;
            let value = self.codec.encode(&bookmark.into_bookmark(id))?;
            bucket.put(&encode_key(id), &value)?;
            Ok(id)
        });

        let closed = db.close();
        let id = saved?;
        if let Err(e) = closed {
            tracing::warn!(id, error = %e, "saved bookmark but failed to close store");
        }

        tracing::debug!(id, "saved bookmark");
        Ok(id)
    }

    /// Every bookmark, newest first
    ///
    /// Under the default `Fail` policy a single undecodable record fails the
    /// whole listing.
    pub fn list_newest_first(&self) -> Result<Vec<Bookmark>> {
        self.list_with_report().map(|listing| listing.bookmarks)
    }

    /// Every bookmark, newest first, plus the keys the policy skipped
    pub fn list_with_report(&self) -> Result<Listing> {
        // Nothing has ever been saved; reading must not create the file
        if !self.store_file_exists()? {
            return Ok(Listing::default());
        }

        let config = Config {
            read_only: true,
            ..self.config.clone()
        };
        let db = Database::open(&config)?;

        let listing = db.view(|tx| self.collect(tx));

        let closed = db.close();
        let listing = listing?;
        closed?;

        Ok(listing)
    }

    /// Walk the bucket from its last key back to its first
    fn collect(&self, tx: &ReadTx) -> Result<Listing> {
        let mut listing = Listing::default();

        let Some(bucket) = tx.bucket(BOOKMARKS_BUCKET) else {
            return Ok(listing);
        };
        listing.bookmarks.reserve(bucket.len());

        let mut cursor = bucket.cursor();
        let mut entry = cursor.last();

        while let Some((key, value)) = entry {
            match self.decode_entry(key, value) {
                Ok(bookmark) => listing.bookmarks.push(bookmark),
                Err(e) if self.config.corrupt_records == CorruptRecordPolicy::Skip => {
                    tracing::warn!(
                        bucket = bucket.name(),
                        key = ?key,
                        error = %e,
                        "skipping undecodable bookmark"
                    );
                    listing.skipped_keys.push(key.to_vec());
                }
                Err(e) => return Err(e),
            }
            entry = cursor.prev();
        }

        Ok(listing)
    }

    /// `Ok(false)` only when the file is missing from a directory that
    /// exists; any other stat failure is an open error
    fn store_file_exists(&self) -> Result<bool> {
        let path = &self.config.path;
        let open_error = |source: std::io::Error| StoreError::Open {
            path: path.clone(),
            source,
        };

        match fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let dir = match path.parent() {
                    Some(dir) if !dir.as_os_str().is_empty() => dir,
                    _ => Path::new("."),
                };
                match fs::metadata(dir) {
                    Ok(meta) if meta.is_dir() => Ok(false),
                    Ok(_) => Err(open_error(e)),
                    Err(dir_err) => Err(open_error(dir_err)),
                }
            }
            Err(e) => Err(open_error(e)),
        }
    }

    fn decode_entry(&self, key: &[u8], value: &[u8]) -> Result<Bookmark> {
        let id = decode_key(key)?;
        let bookmark = self.codec.decode(value)?;

        if bookmark.id != id {
            return Err(StoreError::Decode(format!(
                "record under key {} carries id {}",
                id, bookmark.id
            )));
        }

        Ok(bookmark)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }
}
