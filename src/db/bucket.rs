//! Named key/value collections inside a store file.

use crate::error::{Result, StoreError};
use crate::log::LogOp;

use super::cursor::Cursor;
use super::state::BucketState;
use super::tx::WriteTx;

/// Read-only view of a bucket within a transaction
pub struct Bucket<'a> {
    name: &'a str,
    state: &'a BucketState,
}

impl<'a> Bucket<'a> {
    pub(crate) fn new(name: &'a str, state: &'a BucketState) -> Self {
        Self { name, state }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &[u8]) -> Option<&'a [u8]> {
        self.state.entries.get(key).map(|v| v.as_slice())
    }

    /// Current value of the sequence counter (0 if never bumped)
    pub fn sequence(&self) -> u64 {
        self.state.sequence
    }

    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }

    /// Create an unpositioned cursor over this bucket
    pub fn cursor(&self) -> Cursor<'a> {
        Cursor::new(&self.state.entries)
    }
}

/// Writable handle to a bucket inside a write transaction
///
/// Every mutation is applied to the transaction's private snapshot and
/// recorded for the commit frame.
pub struct BucketMut<'tx, 'db> {
    tx: &'tx mut WriteTx<'db>,
    name: String,
}

impl<'tx, 'db> BucketMut<'tx, 'db> {
    pub(crate) fn new(tx: &'tx mut WriteTx<'db>, name: String) -> Self {
        Self { tx, name }
    }

    /// Insert or replace `key`
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::Transaction("key required".to_string()));
        }
        self.tx.record(LogOp::Put {
            bucket: self.name.clone(),
            key: key.to_vec(),
            value: value.to_vec(),
        })
    }

    /// Bump the bucket's sequence counter and return the new value
    ///
    /// The bump only becomes durable if the transaction commits.
    pub fn next_sequence(&mut self) -> Result<u64> {
        let next = self
            .sequence()
            .checked_add(1)
            .ok_or_else(|| StoreError::Transaction(format!("sequence overflow in {}", self.name)))?;
        self.tx.record(LogOp::SetSequence {
            bucket: self.name.clone(),
            sequence: next,
        })?;
        Ok(next)
    }

    /// Get the value stored under `key`, including uncommitted writes
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.state()
            .and_then(|b| b.entries.get(key))
            .map(|v| v.as_slice())
    }

    pub fn sequence(&self) -> u64 {
        self.state().map_or(0, |b| b.sequence)
    }

    pub fn len(&self) -> usize {
        self.state().map_or(0, |b| b.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view including uncommitted writes
    pub fn as_bucket(&self) -> Result<Bucket<'_>> {
        self.state()
            .map(|state| Bucket::new(&self.name, state))
            .ok_or_else(|| StoreError::BucketNotFound(self.name.clone()))
    }

    fn state(&self) -> Option<&BucketState> {
        self.tx.snapshot().bucket(&self.name)
    }
}
