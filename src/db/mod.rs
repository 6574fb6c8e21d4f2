//! Storage Engine Module
//!
//! A single-file transactional key/value store.
//!
//! ## Responsibilities
//! - Open/lock/close the store file
//! - Named buckets of ordered byte keys, each with a sequence counter
//! - Snapshot read transactions, serialized write transactions
//! - Bidirectional cursors
//!
//! ## Transaction Lifecycle
//! ```text
//!   begin_write ──► create/open bucket ──► next_sequence / put ──► commit
//!        │                                                           │
//!        │                         (drop or error = rollback)        ▼
//!        │                                          append frame, publish snapshot
//!        ▼
//!   begin_read ──► bucket ──► cursor (first/last/next/prev/seek)
//! ```

mod bucket;
mod cursor;
mod database;
mod state;
mod tx;

pub use bucket::{Bucket, BucketMut};
pub use cursor::Cursor;
pub use database::Database;
pub use tx::{ReadTx, WriteTx};
