//! Near-duplicate search over a [`BlockIndex`].
//!
//! Candidates from the block tables are verified with an exact hamming
//! distance check, so results contain no false positives; the pigeonhole
//! layout guarantees no false negatives.
//!
//! Result sequences are lazy and borrow the index immutably, so an index
//! cannot be mutated while one of its sequences is alive. Each call starts an
//! independent traversal; dropping the iterator cancels the search.

use ahash::AHashSet;
use indexmap::map::Values;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::SimhashConfig;
use crate::core::errors::Result;
use crate::simhash::distance::{raw_distance, similarity_from_distance};
use crate::simhash::fingerprint::Fingerprint;

use super::block_index::{BlockIndex, Candidates, EntryId};
use super::metrics::IndexStatistics;

/// Fingerprint collection with block-partitioned near-duplicate lookup.
///
/// # Self-matches
///
/// [`SimhashIndex::find_dupes`] reports every indexed entry within
/// `max_distance` of the query, including entries equal in value to it and
/// the query itself if it was inserted. Whether those count as duplicates is
/// left to the caller; [`SimhashIndex::find_dupe_entries`] exposes entry ids
/// to filter on.
#[derive(Debug, Clone)]
pub struct SimhashIndex {
    index: BlockIndex,
}

impl SimhashIndex {
    /// Build an index from an initial batch, inferring the width from the
    /// first fingerprint.
    pub fn new<I>(initial: I, block_count: usize, max_distance: u32) -> Result<Self>
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        Self::populate(BlockIndex::new(block_count, max_distance)?, initial)
    }

    /// Build an index with the width and blocking taken from `config`.
    pub fn with_config<I>(config: &SimhashConfig, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        config.validate()?;
        let index = BlockIndex::with_hashbits(
            config.hashbits,
            config.block_count,
            config.max_distance,
        )?;
        Self::populate(index, initial)
    }

    fn populate<I>(index: BlockIndex, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        let mut this = Self { index };
        for fingerprint in initial {
            this.add(fingerprint)?;
        }
        info!(
            "Built simhash index: {} entries, {} blocks, max distance {}",
            this.len(),
            this.index.block_count(),
            this.index.max_distance()
        );
        Ok(this)
    }

    /// Insert a fingerprint. Performs no search.
    ///
    /// Fails with `SizeMismatch` when the width differs from the index's.
    pub fn add(&mut self, fingerprint: Fingerprint) -> Result<EntryId> {
        self.index.add(fingerprint)
    }

    /// Underlying block tables.
    pub fn block_index(&self) -> &BlockIndex {
        &self.index
    }

    /// Distance threshold for near-duplicates.
    pub fn max_distance(&self) -> u32 {
        self.index.max_distance()
    }

    /// Number of block positions.
    pub fn block_count(&self) -> usize {
        self.index.block_count()
    }

    /// Established width, if any.
    pub fn hashbits(&self) -> Option<u32> {
        self.index.hashbits()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Fingerprint stored under `entry`.
    pub fn get(&self, entry: EntryId) -> Option<&Fingerprint> {
        self.index.get(entry)
    }

    /// Number of distinct (block position, key) buckets.
    pub fn bucket_count(&self) -> usize {
        self.index.tables().iter().map(|table| table.len()).sum()
    }

    /// Bucket occupancy summary.
    pub fn statistics(&self) -> IndexStatistics {
        IndexStatistics::collect(&self.index)
    }

    /// Unverified candidate entries sharing at least one block key with
    /// `query`, each entry once.
    pub fn candidates(&self, query: &Fingerprint) -> Result<Candidates<'_>> {
        self.index.candidates(query)
    }

    /// Indexed fingerprints within `max_distance` of `query`, each entry once.
    pub fn find_dupes(
        &self,
        query: &Fingerprint,
    ) -> Result<impl Iterator<Item = &Fingerprint> + '_> {
        Ok(self.find_dupe_entries(query)?.map(|dupe| dupe.fingerprint))
    }

    /// Like [`SimhashIndex::find_dupes`], with entry ids and distances.
    pub fn find_dupe_entries(&self, query: &Fingerprint) -> Result<DupeMatches<'_>> {
        let candidates = self.index.candidates(query)?;
        debug!("Searching duplicates of {}", query.to_hex());
        Ok(DupeMatches {
            candidates,
            max_distance: self.index.max_distance(),
        })
    }

    /// Near-duplicates of an indexed entry, excluding the entry itself.
    pub fn find_dupes_of(&self, entry: EntryId) -> Option<DupeMatches<'_>> {
        Some(DupeMatches {
            candidates: self.index.candidates_of(entry)?,
            max_distance: self.index.max_distance(),
        })
    }

    /// Every unordered pair of distinct entries within `max_distance`,
    /// each pair once.
    ///
    /// Cost is the sum of squared bucket sizes, which degrades when many
    /// fingerprints share a block key.
    pub fn find_all_dupes(&self) -> AllDupes<'_> {
        AllDupes {
            index: &self.index,
            position: 0,
            buckets: None,
            bucket: &[],
            i: 0,
            j: 0,
            seen: AHashSet::new(),
        }
    }
}

/// A verified match for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DupeMatch<'a> {
    /// Entry id of the match
    pub entry: EntryId,
    /// Matched fingerprint
    pub fingerprint: &'a Fingerprint,
    /// Hamming distance to the query
    pub distance: u32,
}

/// Lazy sequence of verified matches for one query.
#[derive(Debug)]
pub struct DupeMatches<'a> {
    candidates: Candidates<'a>,
    max_distance: u32,
}

impl<'a> Iterator for DupeMatches<'a> {
    type Item = DupeMatch<'a>;

    fn next(&mut self) -> Option<DupeMatch<'a>> {
        let index = self.candidates.index();
        let query = *self.candidates.query();
        for entry in self.candidates.by_ref() {
            let Some(fingerprint) = index.get(entry) else {
                continue;
            };
            let distance = raw_distance(fingerprint, &query);
            if distance <= self.max_distance {
                return Some(DupeMatch {
                    entry,
                    fingerprint,
                    distance,
                });
            }
        }
        None
    }
}

/// A near-duplicate pair, ordered so that `left` has the smaller value
/// (ties broken by entry id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DupePair {
    /// Entry id of the smaller fingerprint
    pub left: EntryId,
    /// Entry id of the larger fingerprint
    pub right: EntryId,
    /// Fingerprint stored under `left`
    pub left_fingerprint: Fingerprint,
    /// Fingerprint stored under `right`
    pub right_fingerprint: Fingerprint,
    /// Hamming distance between the two
    pub distance: u32,
}

impl DupePair {
    /// `1 - distance / hashbits`.
    pub fn similarity(&self) -> f64 {
        similarity_from_distance(self.distance, self.left_fingerprint.hashbits())
    }

    /// The two fingerprints, smaller value first.
    pub fn fingerprints(&self) -> (Fingerprint, Fingerprint) {
        (self.left_fingerprint, self.right_fingerprint)
    }
}

/// Lazy all-pairs walk over every bucket holding two or more entries.
#[derive(Debug)]
pub struct AllDupes<'a> {
    index: &'a BlockIndex,
    position: usize,
    buckets: Option<Values<'a, u128, Vec<EntryId>>>,
    bucket: &'a [EntryId],
    i: usize,
    j: usize,
    seen: AHashSet<(EntryId, EntryId)>,
}

impl AllDupes<'_> {
    fn next_pair_in_bucket(&mut self) -> Option<(EntryId, EntryId)> {
        while self.i < self.bucket.len() {
            if self.j < self.bucket.len() {
                let pair = (self.bucket[self.i], self.bucket[self.j]);
                self.j += 1;
                return Some(pair);
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }

    fn advance_bucket(&mut self) -> bool {
        loop {
            if let Some(buckets) = self.buckets.as_mut() {
                for bucket in buckets.by_ref() {
                    if bucket.len() >= 2 {
                        self.bucket = bucket.as_slice();
                        self.i = 0;
                        self.j = 1;
                        return true;
                    }
                }
            }
            let tables = self.index.tables();
            if self.position >= tables.len() {
                return false;
            }
            self.buckets = Some(tables[self.position].values());
            self.position += 1;
        }
    }

    fn verify(&mut self, a: EntryId, b: EntryId) -> Option<DupePair> {
        let fa = *self.index.get(a)?;
        let fb = *self.index.get(b)?;
        let distance = raw_distance(&fa, &fb);
        if distance > self.index.max_distance() {
            return None;
        }
        let canonical = (a.min(b), a.max(b));
        if !self.seen.insert(canonical) {
            return None;
        }
        let (left, right) = if (fa.value(), a) <= (fb.value(), b) {
            ((a, fa), (b, fb))
        } else {
            ((b, fb), (a, fa))
        };
        Some(DupePair {
            left: left.0,
            right: right.0,
            left_fingerprint: left.1,
            right_fingerprint: right.1,
            distance,
        })
    }
}

impl Iterator for AllDupes<'_> {
    type Item = DupePair;

    fn next(&mut self) -> Option<DupePair> {
        loop {
            while let Some((a, b)) = self.next_pair_in_bucket() {
                if let Some(pair) = self.verify(a, b) {
                    return Some(pair);
                }
            }
            if !self.advance_bucket() {
                return None;
            }
        }
    }
}
