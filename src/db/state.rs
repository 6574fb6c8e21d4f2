//! In-memory index rebuilt from the commit log.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::log::LogOp;

/// Ordered key/value pairs plus the sequence counter of one bucket
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketState {
    pub(crate) sequence: u64,
    pub(crate) entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// Immutable view of every bucket as of one commit
///
/// Buckets are shared between snapshots and copied only when a write
/// transaction touches them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub(crate) txid: u64,
    pub(crate) buckets: BTreeMap<String, Arc<BucketState>>,
}

impl Snapshot {
    pub(crate) fn bucket(&self, name: &str) -> Option<&BucketState> {
        self.buckets.get(name).map(|b| b.as_ref())
    }

    pub(crate) fn apply(&mut self, op: &LogOp) -> Result<()> {
        match op {
            LogOp::CreateBucket { name } => {
                self.buckets.entry(name.clone()).or_default();
            }
            LogOp::Put { bucket, key, value } => {
                self.bucket_mut(bucket)?
                    .entries
                    .insert(key.clone(), value.clone());
            }
            LogOp::SetSequence { bucket, sequence } => {
                self.bucket_mut(bucket)?.sequence = *sequence;
            }
        }
        Ok(())
    }

    fn bucket_mut(&mut self, name: &str) -> Result<&mut BucketState> {
        self.buckets
            .get_mut(name)
            .map(Arc::make_mut)
            .ok_or_else(|| StoreError::BucketNotFound(name.to_string()))
    }
}
