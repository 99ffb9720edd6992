//! Block-partitioned near-duplicate index.
//!
//! This module contains:
//! - the bit layout splitting fingerprints into blocks
//! - per-position key tables and candidate generation
//! - verified single-query and all-pairs duplicate search
//! - bucket occupancy statistics

pub mod block_index;
pub mod blocks;
pub mod metrics;
pub mod search;

pub use block_index::{BlockIndex, Candidates, EntryId};
pub use blocks::BlockLayout;
pub use metrics::IndexStatistics;
pub use search::{AllDupes, DupeMatch, DupeMatches, DupePair, SimhashIndex};
