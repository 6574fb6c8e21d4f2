//! Read and write transactions.

use std::sync::Arc;

use parking_lot::MutexGuard;

use crate::error::{Result, StoreError};
use crate::log::{Commit, LogOp, LogWriter};

use super::bucket::{Bucket, BucketMut};
use super::database::Database;
use super::state::Snapshot;

/// A consistent, read-only view of the store as of the last commit
///
/// Holding one never blocks writers; commits made after it began are
/// not visible through it.
pub struct ReadTx {
    snapshot: Arc<Snapshot>,
}

impl ReadTx {
    pub(crate) fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    /// Txid of the commit this view reflects
    pub fn txid(&self) -> u64 {
        self.snapshot.txid
    }

    pub fn bucket(&self, name: &str) -> Option<Bucket<'_>> {
        self.snapshot
            .buckets
            .get_key_value(name)
            .map(|(name, state)| Bucket::new(name, state))
    }

    /// Names of all buckets, sorted
    pub fn bucket_names(&self) -> Vec<String> {
        self.snapshot.buckets.keys().cloned().collect()
    }
}

/// An exclusive write transaction
///
/// Holds the handle's writer lock until committed or dropped. Dropping
/// without `commit` discards every change, including sequence bumps.
pub struct WriteTx<'db> {
    db: &'db Database,
    writer: MutexGuard<'db, LogWriter>,
    snapshot: Snapshot,
    ops: Vec<LogOp>,
}

impl<'db> WriteTx<'db> {
    pub(crate) fn new(
        db: &'db Database,
        writer: MutexGuard<'db, LogWriter>,
        snapshot: Snapshot,
    ) -> Self {
        Self {
            db,
            writer,
            snapshot,
            ops: Vec::new(),
        }
    }

    /// Txid this transaction will commit as
    pub fn txid(&self) -> u64 {
        self.snapshot.txid + 1
    }

    pub fn bucket(&self, name: &str) -> Option<Bucket<'_>> {
        self.snapshot
            .buckets
            .get_key_value(name)
            .map(|(name, state)| Bucket::new(name, state))
    }

    /// Open an existing bucket for writing
    pub fn bucket_mut(&mut self, name: &str) -> Result<BucketMut<'_, 'db>> {
        if self.snapshot.bucket(name).is_none() {
            return Err(StoreError::BucketNotFound(name.to_string()));
        }
        Ok(BucketMut::new(self, name.to_string()))
    }

    /// Open a bucket for writing, creating it first if needed
    pub fn create_bucket_if_not_exists(&mut self, name: &str) -> Result<BucketMut<'_, 'db>> {
        if name.is_empty() {
            return Err(StoreError::Transaction("bucket name required".to_string()));
        }
        if self.snapshot.bucket(name).is_none() {
            self.record(LogOp::CreateBucket {
                name: name.to_string(),
            })?;
        }
        Ok(BucketMut::new(self, name.to_string()))
    }

    /// Number of mutations waiting to be committed
    pub fn pending_ops(&self) -> usize {
        self.ops.len()
    }

    /// Write all changes as one frame and publish them to new readers
    ///
    /// A transaction without changes commits without touching the file.
    pub fn commit(self) -> Result<()> {
        let WriteTx {
            db,
            mut writer,
            mut snapshot,
            ops,
        } = self;

        if ops.is_empty() {
            tracing::trace!("empty write transaction, nothing to commit");
            return Ok(());
        }

        let txid = snapshot.txid + 1;
        let op_count = ops.len();
        let commit = Commit::new(txid, ops);

        writer
            .append(&commit)
            .map_err(|e| StoreError::Transaction(format!("commit {} failed: {}", txid, e)))?;

        snapshot.txid = txid;
        db.publish(snapshot);

        tracing::debug!(txid, ops = op_count, "committed write transaction");
        Ok(())
    }

    /// Discard all changes
    pub fn rollback(self) {
        tracing::trace!(ops = self.ops.len(), "rolled back write transaction");
    }

    pub(crate) fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub(crate) fn record(&mut self, op: LogOp) -> Result<()> {
        self.snapshot.apply(&op)?;
        self.ops.push(op);
        Ok(())
    }
}
