//! Bucket occupancy statistics for a block index.

use serde::Serialize;
use tracing::info;

use super::block_index::BlockIndex;

/// Snapshot of how entries spread across block buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStatistics {
    /// Number of indexed entries
    pub entries: usize,
    /// Number of block positions
    pub block_count: usize,
    /// Near-duplicate distance threshold
    pub max_distance: u32,
    /// Established width, if any
    pub hashbits: Option<u32>,
    /// Distinct keys at each block position
    pub buckets_per_position: Vec<usize>,
    /// Size of the fullest bucket
    pub largest_bucket: usize,
    /// Pair comparisons an all-pairs search performs (sum of n(n-1)/2)
    pub pairwise_comparisons: usize,
}

impl IndexStatistics {
    /// Walk every bucket of `index`.
    pub fn collect(index: &BlockIndex) -> Self {
        let mut stats = Self {
            entries: index.len(),
            block_count: index.block_count(),
            max_distance: index.max_distance(),
            hashbits: index.hashbits(),
            ..Self::default()
        };

        for table in index.tables() {
            stats.buckets_per_position.push(table.len());
            for bucket in table.values() {
                let n = bucket.len();
                stats.largest_bucket = stats.largest_bucket.max(n);
                stats.pairwise_comparisons += n * n.saturating_sub(1) / 2;
            }
        }
        stats
    }

    /// Total distinct buckets across positions.
    pub fn total_buckets(&self) -> usize {
        self.buckets_per_position.iter().sum()
    }

    /// Comparisons saved relative to brute force, as a fraction of
    /// `entries * (entries - 1) / 2`.
    pub fn pruning_ratio(&self) -> f64 {
        let brute_force = self.entries * self.entries.saturating_sub(1) / 2;
        if brute_force == 0 {
            return 0.0;
        }
        1.0 - self.pairwise_comparisons as f64 / brute_force as f64
    }

    /// Log a summary at info level
    pub fn log_summary(&self) {
        info!("Simhash index summary:");
        info!("  Entries: {}", self.entries);
        info!(
            "  Blocks: {} (max distance {})",
            self.block_count, self.max_distance
        );
        if let Some(bits) = self.hashbits {
            info!("  Width: {} bits", bits);
        }
        info!("  Buckets: {}", self.total_buckets());
        info!("  Largest bucket: {}", self.largest_bucket);
        info!("  Pairwise comparisons: {}", self.pairwise_comparisons);
        if self.entries > 1 {
            info!("  Pruned vs brute force: {:.2}%", self.pruning_ratio() * 100.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simhash::fingerprint::Fingerprint;

    #[test]
    fn test_collect_counts_buckets() {
        let mut index = BlockIndex::new(4, 1).unwrap();
        for value in [0xabcd, 0xabcc, 0x1111] {
            index.add(Fingerprint::from_raw(value, 16).unwrap()).unwrap();
        }
        let stats = IndexStatistics::collect(&index);
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.hashbits, Some(16));
        // position 0 keys: d, c, 1; positions 1..3: shared key plus 1
        assert_eq!(stats.buckets_per_position, vec![3, 2, 2, 2]);
        assert_eq!(stats.total_buckets(), 9);
        assert_eq!(stats.largest_bucket, 2);
        assert_eq!(stats.pairwise_comparisons, 3);
    }

    #[test]
    fn test_empty_statistics() {
        let index = BlockIndex::new(6, 2).unwrap();
        let stats = IndexStatistics::collect(&index);
        assert_eq!(stats.entries, 0);
        assert!(stats.buckets_per_position.is_empty());
        assert_eq!(stats.pruning_ratio(), 0.0);
    }
}
