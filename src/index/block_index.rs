//! Per-block-position key tables for candidate generation.

use ahash::AHashSet;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::config::validate_blocking;
use crate::core::errors::{NeardupError, Result};
use crate::simhash::fingerprint::Fingerprint;

use super::blocks::BlockLayout;

/// Insertion ordinal of an indexed fingerprint.
pub type EntryId = usize;

/// Block key -> entries sharing that key, in insertion order.
pub(crate) type KeyTable = IndexMap<u128, Vec<EntryId>>;

/// Block-partitioned index over fingerprints.
///
/// For each block position the index maps the fingerprint's bits in that block
/// to every entry carrying the same bits. Any fingerprint within
/// `max_distance` of a query agrees with it on at least one whole block, so
/// the union of the query's buckets is a superset of its near-duplicates.
///
/// The width is fixed either explicitly via [`BlockIndex::with_hashbits`] or
/// by the first fingerprint added. Entries are never removed.
#[derive(Debug, Clone)]
pub struct BlockIndex {
    block_count: usize,
    max_distance: u32,
    layout: Option<BlockLayout>,
    entries: Vec<Fingerprint>,
    tables: Vec<KeyTable>,
}

impl BlockIndex {
    /// Empty index whose width is inferred from the first insertion.
    pub fn new(block_count: usize, max_distance: u32) -> Result<Self> {
        validate_blocking(block_count, max_distance)?;
        Ok(Self {
            block_count,
            max_distance,
            layout: None,
            entries: Vec::new(),
            tables: Vec::new(),
        })
    }

    /// Empty index with an explicit width.
    pub fn with_hashbits(hashbits: u32, block_count: usize, max_distance: u32) -> Result<Self> {
        let mut index = Self::new(block_count, max_distance)?;
        index.establish(hashbits)?;
        Ok(index)
    }

    fn establish(&mut self, hashbits: u32) -> Result<()> {
        let layout = BlockLayout::new(hashbits, self.block_count, self.max_distance)?;
        debug!(
            "Block index established at {} bits with {} blocks",
            hashbits, self.block_count
        );
        self.tables = vec![KeyTable::new(); self.block_count];
        self.layout = Some(layout);
        Ok(())
    }

    /// Number of block positions.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Distance threshold the layout was validated against.
    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Established width, if any fingerprint or explicit width fixed it.
    pub fn hashbits(&self) -> Option<u32> {
        self.layout.as_ref().map(BlockLayout::hashbits)
    }

    /// Block layout, once the width is established.
    pub fn layout(&self) -> Option<&BlockLayout> {
        self.layout.as_ref()
    }

    /// Number of entries (duplicates counted separately).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprint stored under `entry`.
    pub fn get(&self, entry: EntryId) -> Option<&Fingerprint> {
        self.entries.get(entry)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[Fingerprint] {
        &self.entries
    }

    /// Fail with `SizeMismatch` if `fingerprint` does not match the
    /// established width. Passes trivially before the width is known.
    pub fn check_width(&self, fingerprint: &Fingerprint, operation: &'static str) -> Result<()> {
        match self.hashbits() {
            Some(hashbits) if hashbits != fingerprint.hashbits() => Err(
                NeardupError::size_mismatch(hashbits, fingerprint.hashbits(), operation),
            ),
            _ => Ok(()),
        }
    }

    /// Insert `fingerprint` under its key at every block position.
    pub fn add(&mut self, fingerprint: Fingerprint) -> Result<EntryId> {
        self.check_width(&fingerprint, "add")?;
        if self.layout.is_none() {
            self.establish(fingerprint.hashbits())?;
        }

        let entry = self.entries.len();
        if let Some(layout) = &self.layout {
            for (table, key) in self.tables.iter_mut().zip(layout.keys(&fingerprint)) {
                table.entry(key).or_default().push(entry);
            }
        }
        self.entries.push(fingerprint);
        trace!("Indexed entry {} ({})", entry, fingerprint.to_hex());
        Ok(entry)
    }

    /// Entries stored under `key` at block `position`.
    pub fn bucket(&self, position: usize, key: u128) -> &[EntryId] {
        self.tables
            .get(position)
            .and_then(|table| table.get(&key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn tables(&self) -> &[KeyTable] {
        &self.tables
    }

    /// Entries sharing at least one block key with `fingerprint`.
    ///
    /// Each entry is yielded once, ordered by block position and then
    /// insertion order within the bucket. The result may contain false
    /// positives; callers verify with an exact distance check.
    pub fn candidates(&self, fingerprint: &Fingerprint) -> Result<Candidates<'_>> {
        self.check_width(fingerprint, "candidates")?;
        Ok(Candidates::new(self, *fingerprint, None))
    }

    /// Candidates of an indexed entry, excluding the entry itself.
    pub fn candidates_of(&self, entry: EntryId) -> Option<Candidates<'_>> {
        let fingerprint = *self.entries.get(entry)?;
        Some(Candidates::new(self, fingerprint, Some(entry)))
    }
}

/// Lazy, de-duplicated candidate walk over a query's buckets.
#[derive(Debug)]
pub struct Candidates<'a> {
    index: &'a BlockIndex,
    query: Fingerprint,
    position: usize,
    bucket: std::slice::Iter<'a, EntryId>,
    seen: AHashSet<EntryId>,
}

impl<'a> Candidates<'a> {
    fn new(index: &'a BlockIndex, query: Fingerprint, exclude: Option<EntryId>) -> Self {
        Self {
            index,
            query,
            position: 0,
            bucket: (&[] as &[EntryId]).iter(),
            seen: exclude.into_iter().collect(),
        }
    }

    /// The query fingerprint.
    pub fn query(&self) -> &Fingerprint {
        &self.query
    }

    pub(crate) fn index(&self) -> &'a BlockIndex {
        self.index
    }
}

impl Iterator for Candidates<'_> {
    type Item = EntryId;

    fn next(&mut self) -> Option<EntryId> {
        loop {
            for &entry in self.bucket.by_ref() {
                if self.seen.insert(entry) {
                    return Some(entry);
                }
            }

            let layout = self.index.layout.as_ref()?;
            if self.position >= layout.block_count() {
                return None;
            }
            let key = layout.key(self.position, &self.query);
            self.bucket = self.index.bucket(self.position, key).iter();
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(value: u128) -> Fingerprint {
        Fingerprint::from_raw(value, 16).unwrap()
    }

    #[test]
    fn test_width_inferred_from_first_add() {
        let mut index = BlockIndex::new(4, 1).unwrap();
        assert_eq!(index.hashbits(), None);
        index.add(fp(0x1234)).unwrap();
        assert_eq!(index.hashbits(), Some(16));

        let wide = Fingerprint::from_raw(1, 64).unwrap();
        assert!(index.add(wide).unwrap_err().is_size_mismatch());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_rejects_unsafe_configuration() {
        assert!(BlockIndex::new(2, 2).unwrap_err().is_config());
        assert!(BlockIndex::with_hashbits(8, 6, 2).unwrap_err().is_config());
    }

    #[test]
    fn test_first_add_checks_block_ceiling() {
        let mut index = BlockIndex::new(6, 2).unwrap();
        let narrow = Fingerprint::from_raw(1, 8).unwrap();
        assert!(index.add(narrow).unwrap_err().is_config());
        assert!(index.is_empty());
    }

    #[test]
    fn test_buckets_hold_every_position() {
        let mut index = BlockIndex::new(4, 1).unwrap();
        let id = index.add(fp(0xabcd)).unwrap();
        assert_eq!(index.bucket(0, 0xd), &[id]);
        assert_eq!(index.bucket(3, 0xa), &[id]);
        assert!(index.bucket(3, 0xb).is_empty());
        assert!(index.bucket(9, 0xa).is_empty());
    }

    #[test]
    fn test_candidates_are_unique_and_ordered() {
        let mut index = BlockIndex::new(4, 1).unwrap();
        let a = index.add(fp(0xabcd)).unwrap();
        let b = index.add(fp(0xabc0)).unwrap();
        let c = index.add(fp(0x0bcd)).unwrap();
        let _far = index.add(fp(0x1111)).unwrap();

        let found: Vec<EntryId> = index.candidates(&fp(0xabcd)).unwrap().collect();
        assert_eq!(found, vec![a, c, b]);

        let of_a: Vec<EntryId> = index.candidates_of(a).unwrap().collect();
        assert_eq!(of_a, vec![c, b]);
    }

    #[test]
    fn test_duplicate_values_are_distinct_entries() {
        let mut index = BlockIndex::new(4, 1).unwrap();
        let a = index.add(fp(0x4242)).unwrap();
        let b = index.add(fp(0x4242)).unwrap();
        assert_ne!(a, b);
        let found: Vec<EntryId> = index.candidates(&fp(0x4242)).unwrap().collect();
        assert_eq!(found, vec![a, b]);
    }

    #[test]
    fn test_empty_index_has_no_candidates() {
        let index = BlockIndex::new(6, 2).unwrap();
        let query = Fingerprint::from_raw(7, 64).unwrap();
        assert_eq!(index.candidates(&query).unwrap().count(), 0);
    }
}
