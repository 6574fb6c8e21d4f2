//! Configuration for bmarkdb
//!
//! Built once at startup and passed by reference to every store operation.

use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a bookmark store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Path of the single store file
    pub path: PathBuf,

    /// Permission bits for a newly created store file (Unix only)
    pub file_mode: u32,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: whether commits are fsynced
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Locking Configuration
    // -------------------------------------------------------------------------
    /// How long to wait for the file lock. `None` waits forever.
    pub lock_timeout: Option<Duration>,

    /// Open with a shared lock and reject write transactions
    pub read_only: bool,

    // -------------------------------------------------------------------------
    // Read Path Configuration
    // -------------------------------------------------------------------------
    /// What a listing does when a stored record cannot be decoded
    pub corrupt_records: CorruptRecordPolicy,
}

/// Commit sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every commit (safest, slowest)
    EveryCommit,

    /// Leave flushing to the OS (tests and benchmarks)
    Never,
}

/// Policy for undecodable records during a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptRecordPolicy {
    /// Abort the whole listing with a decode error
    Fail,

    /// Leave the record out and report its key
    Skip,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./bookmarks.db"),
            file_mode: 0o600,
            sync_strategy: SyncStrategy::EveryCommit,
            lock_timeout: None,
            read_only: false,
            corrupt_records: CorruptRecordPolicy::Fail,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the permission bits for a new store file
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.config.file_mode = mode;
        self
    }

    /// Set the commit sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Bound the wait for the file lock
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = Some(timeout);
        self
    }

    /// Open handles read-only
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Set the policy for undecodable records
    pub fn corrupt_records(mut self, policy: CorruptRecordPolicy) -> Self {
        self.config.corrupt_records = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
