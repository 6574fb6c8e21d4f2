//! Store Handle
//!
//! Owns the open store file, its OS lock, and the published snapshot.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use parking_lot::{Mutex, RwLock};

use crate::config::{Config, SyncStrategy};
use crate::error::{Result, StoreError};
use crate::log::{encode_file_header, LogRecovery, LogWriter, RecoveryReport, FILE_HEADER_SIZE};

use super::state::Snapshot;
use super::tx::{ReadTx, WriteTx};

/// How often a bounded lock wait retries
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// An open store file
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Across handles and processes**: a read-write handle holds an
///   exclusive OS lock on the file for its whole lifetime; read-only
///   handles share a shared lock. A second read-write open blocks until
///   the first handle is closed (or `lock_timeout` expires).
///
/// - **Within a handle**: write transactions are serialized by `writer`.
///   Read transactions clone the published `Arc<Snapshot>` and never
///   block on writers.
pub struct Database {
    path: PathBuf,

    read_only: bool,

    /// Latest committed state, swapped on every commit
    state: RwLock<Arc<Snapshot>>,

    /// Appends commit frames (exclusive access needed)
    writer: Mutex<LogWriter>,

    /// What recovery found when the handle was opened
    recovery: RecoveryReport,
}

impl Database {
    /// Open or create the store file named by `config.path`
    ///
    /// On open:
    /// 1. Open/create the file
    /// 2. Acquire the file lock (exclusive, or shared if read-only)
    /// 3. Replay the commit log, truncating a torn tail
    /// 4. Write the header if the file is new
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.path.clone();

        let mut file = open_file(config).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;

        acquire_lock(&file, &path, config.read_only, config.lock_timeout)?;

        // Read-only handles may not modify the file, so a torn tail is skipped
        // in memory and left for the next writer to truncate
        let (commits, recovery) = if config.read_only {
            LogRecovery::scan(&mut file)?
        } else {
            LogRecovery::recover(&mut file)?
        };

        let mut snapshot = Snapshot::default();
        for commit in &commits {
            for op in &commit.ops {
                snapshot.apply(op).map_err(|e| {
                    StoreError::Corruption(format!("replaying txid {}: {}", commit.txid, e))
                })?;
            }
            snapshot.txid = commit.txid;
        }

        let end = if recovery.is_new {
            if !config.read_only {
                file.write_all(&encode_file_header())?;
                file.sync_all()?;
            }
            FILE_HEADER_SIZE
        } else {
            recovery.valid_len
        };

        tracing::debug!(
            path = %path.display(),
            read_only = config.read_only,
            commits = recovery.commits_replayed,
            txid = snapshot.txid,
            "opened store"
        );

        Ok(Self {
            path,
            read_only: config.read_only,
            state: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(LogWriter::new(file, end, config.sync_strategy)),
            recovery,
        })
    }

    /// Scan a store file without modifying it, under a shared lock
    pub fn verify(path: &Path) -> Result<RecoveryReport> {
        let mut file = File::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        acquire_lock(&file, path, true, None)?;
        let (_, report) = LogRecovery::scan(&mut file)?;
        FileExt::unlock(&file)?;
        Ok(report)
    }

    /// Begin a read transaction on the latest committed snapshot
    pub fn begin_read(&self) -> ReadTx {
        ReadTx::new(Arc::clone(&*self.state.read()))
    }

    /// Begin a write transaction, waiting for any other writer on this handle
    pub fn begin_write(&self) -> Result<WriteTx<'_>> {
        if self.read_only {
            return Err(StoreError::Transaction(
                "store is opened read-only".to_string(),
            ));
        }

        let writer = self.writer.lock();
        // Taken under the writer lock, so no commit can land in between
        let snapshot = Snapshot::clone(&self.state.read());
        Ok(WriteTx::new(self, writer, snapshot))
    }

    /// Run `f` in a write transaction, committing if it returns `Ok`
    ///
    /// Any error from `f` rolls the transaction back.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTx<'_>) -> Result<T>,
    {
        let mut tx = self.begin_write()?;
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    /// Run `f` in a read transaction
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx) -> Result<T>,
    {
        let tx = self.begin_read();
        f(&tx)
    }

    /// Close the handle, syncing the file (unless syncing is off) and
    /// releasing its lock
    pub fn close(self) -> Result<()> {
        let mut writer = self.writer.into_inner();

        if !self.read_only && writer.sync_strategy() == SyncStrategy::EveryCommit {
            writer.sync()?;
        }
        FileExt::unlock(writer.file())?;

        tracing::debug!(path = %self.path.display(), "closed store");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Txid of the latest commit
    pub fn last_txid(&self) -> u64 {
        self.state.read().txid
    }

    /// What recovery found when this handle was opened
    pub fn recovery_report(&self) -> &RecoveryReport {
        &self.recovery
    }

    pub(crate) fn publish(&self, snapshot: Snapshot) {
        *self.state.write() = Arc::new(snapshot);
    }
}

fn open_file(config: &Config) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);

    if !config.read_only {
        options.write(true).create(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(config.file_mode);
        }
    }

    options.open(&config.path)
}

/// Lock the store file, waiting up to `timeout` (forever if `None`)
fn acquire_lock(file: &File, path: &Path, shared: bool, timeout: Option<Duration>) -> Result<()> {
    let open_error = |source: std::io::Error| StoreError::Open {
        path: path.to_path_buf(),
        source,
    };

    let Some(timeout) = timeout else {
        let locked = if shared {
            FileExt::lock_shared(file)
        } else {
            FileExt::lock_exclusive(file)
        };
        return locked.map_err(open_error);
    };

    let deadline = Instant::now() + timeout;
    loop {
        let attempt = if shared {
            FileExt::try_lock_shared(file)
        } else {
            FileExt::try_lock_exclusive(file)
        };

        match attempt {
            Ok(()) => return Ok(()),
            Err(e) if is_contended(&e) => {}
            Err(e) => return Err(open_error(e)),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(StoreError::LockTimeout {
                path: path.to_path_buf(),
                timeout,
            });
        }
        thread::sleep(LOCK_RETRY_INTERVAL.min(deadline - now));
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
