//! Bidirectional cursor over a bucket's keys.

use std::collections::BTreeMap;
use std::ops::Bound;

/// Positional iterator over a bucket, in byte-lexicographic key order
///
/// Every move returns the key/value it lands on, or `None` once it walks
/// off either end. An unpositioned cursor treats `next` as `first` and
/// `prev` as `last`.
pub struct Cursor<'a> {
    entries: &'a BTreeMap<Vec<u8>, Vec<u8>>,
    position: Position<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Position<'a> {
    Unpositioned,
    At(&'a [u8]),
    Exhausted,
}

type Entry<'a> = (&'a [u8], &'a [u8]);

#[allow(clippy::should_implement_trait)]
impl<'a> Cursor<'a> {
    pub(crate) fn new(entries: &'a BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self {
            entries,
            position: Position::Unpositioned,
        }
    }

    /// Move to the smallest key
    pub fn first(&mut self) -> Option<Entry<'a>> {
        let entry = self.entries.iter().next();
        self.land(entry)
    }

    /// Move to the largest key
    pub fn last(&mut self) -> Option<Entry<'a>> {
        let entry = self.entries.iter().next_back();
        self.land(entry)
    }

    /// Move to the next larger key
    pub fn next(&mut self) -> Option<Entry<'a>> {
        match self.position {
            Position::Unpositioned => self.first(),
            Position::At(key) => {
                let entry = self
                    .entries
                    .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
                    .next();
                self.land(entry)
            }
            Position::Exhausted => None,
        }
    }

    /// Move to the next smaller key
    pub fn prev(&mut self) -> Option<Entry<'a>> {
        match self.position {
            Position::Unpositioned => self.last(),
            Position::At(key) => {
                let entry = self
                    .entries
                    .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key)))
                    .next_back();
                self.land(entry)
            }
            Position::Exhausted => None,
        }
    }

    /// Move to the first key greater than or equal to `target`
    pub fn seek(&mut self, target: &[u8]) -> Option<Entry<'a>> {
        let entry = self
            .entries
            .range::<[u8], _>((Bound::Included(target), Bound::Unbounded))
            .next();
        self.land(entry)
    }

    fn land(&mut self, entry: Option<(&'a Vec<u8>, &'a Vec<u8>)>) -> Option<Entry<'a>> {
        match entry {
            Some((key, value)) => {
                self.position = Position::At(key.as_slice());
                Some((key.as_slice(), value.as_slice()))
            }
            None => {
                self.position = Position::Exhausted;
                None
            }
        }
    }
}
