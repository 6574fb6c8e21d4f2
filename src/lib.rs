//! # bmarkdb
//!
//! Durable storage for bookmarks, with:
//! - A single-file, append-only commit log with crash recovery
//! - Exclusive file locking between writers
//! - Per-bucket sequence counters for unique ascending ids
//! - Listing in reverse insertion order via a backward cursor walk
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     BookmarkStore                            │
//! │          save(NewBookmark)  /  list_newest_first()           │
//! └──────────┬───────────────────────────────┬──────────────────┘
//!            │                               │
//!            ▼                               ▼
//!   ┌─────────────────┐            ┌──────────────────┐
//!   │  Record Codec   │            │   Key Sequencer  │
//!   │ (bincode + CRC) │            │  (u64 big-endian)│
//!   └─────────────────┘            └──────────────────┘
//!            │                               │
//! ┌──────────▼───────────────────────────────▼──────────────────┐
//! │                        Database                              │
//! │     (file lock, snapshot reads, serialized writes)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │  Commit Log  │
//!               │   (Append)   │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod bookmark;
pub mod codec;
pub mod sequence;
pub mod log;
pub mod db;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use bookmark::{Bookmark, NewBookmark, MAX_CONTENT_LEN};
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{BookmarkStore, Listing};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bmarkdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
