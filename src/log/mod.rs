//! Commit Log Module
//!
//! The single store file is an append-only log of committed write
//! transactions. The in-memory index is rebuilt from it on every open.
//!
//! ## Responsibilities
//! - Append one checksummed frame per committed transaction
//! - CRC32 checksums for corruption detection
//! - Transaction ids for ordering
//! - Recovery and replay, truncating a torn tail
//!
//! A frame cut short at the end of the file is a torn tail and is dropped.
//! Any damage before the last frame, or a header whose own checksum fails,
//! is corruption and stops the open.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Header                                      │
//! │ ┌──────────┬─────────────┬──────────┐       │
//! │ │Magic (4) │ Version (2) │ Pad (2)  │       │
//! │ └──────────┴─────────────┴──────────┘       │
//! ├─────────────────────────────────────────────┤
//! │ Frame 1                                     │
//! │ ┌─────────┬─────────┬────────────┬────────┐ │
//! │ │ Len (4) │ CRC (4) │ HdrCRC (4) │ Commit │ │
//! │ └─────────┴─────────┴────────────┴────────┘ │
//! ├─────────────────────────────────────────────┤
//! │ Frame 2 ...                                 │
//! └─────────────────────────────────────────────┘
//! ```

mod frame;
mod reader;
mod recovery;
mod writer;

pub use frame::{
    check_file_header, encode_file_header, Commit, FrameHeader, LogOp, FILE_HEADER_SIZE,
    FORMAT_VERSION, FRAME_HEADER_SIZE, MAGIC, MAX_FRAME_SIZE,
};
pub use reader::{FrameRead, LogReader};
pub use recovery::{LogRecovery, RecoveryReport};
pub use writer::LogWriter;
