//! # neardup-rs: SimHash fingerprints and near-duplicate search
//!
//! Compact, fixed-width fingerprints of weighted token collections such that
//! similar inputs produce fingerprints differing in few bits, plus a
//! block-partitioned index that finds near-duplicate fingerprints without
//! exhaustive pairwise comparison.
//!
//! - **Fingerprinting**: Charikar SimHash over any `(token, weight)` sequence,
//!   with pluggable token hashing and tokenization
//! - **Distance**: hamming distance and similarity over equal-width fingerprints
//! - **Indexing**: pigeonhole banding that guarantees no false negatives
//!   within `max_distance` while bounding candidate sets
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                    SimhashIndex                       │
//! │   find_dupes · find_all_dupes · statistics            │
//! ├──────────────────────────┬────────────────────────────┤
//! │  FingerprintEngine       │  BlockIndex                │
//! │  • TokenHasher           │  • BlockLayout             │
//! │  • Tokenizer             │  • per-position key tables │
//! │  • hamming / similarity  │  • candidate generation    │
//! └──────────────────────────┴────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use neardup_rs::{Fingerprint, SimhashIndex};
//!
//! # fn main() -> neardup_rs::Result<()> {
//! let docs = [
//!     "How are you? I Am fine. blar blar blar blar blar Thanks.",
//!     "How are you i am fine. blar blar blar blar blar than",
//!     "This is simhash test.",
//! ];
//! let fingerprints = docs
//!     .iter()
//!     .map(|doc| Fingerprint::from_text(doc, 64))
//!     .collect::<neardup_rs::Result<Vec<_>>>()?;
//!
//! let index = SimhashIndex::new(fingerprints.clone(), 6, 2)?;
//! let query = Fingerprint::from_text("How are you im fine. blar blar blar blar thank", 64)?;
//! assert!(index.find_dupes(&query)?.any(|dupe| *dupe == fingerprints[0]));
//! # Ok(())
//! # }
//! ```
//!
//! Ordering on [`Fingerprint`] compares integer values only; it is useful for
//! sorting and deduplication and is unrelated to similarity.

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Errors and configuration
pub mod core {
    //! Error types and configuration.

    pub mod config;
    pub mod errors;
}

pub mod index;
pub mod simhash;

pub use crate::core::config::SimhashConfig;
pub use crate::core::errors::{NeardupError, Result, ResultExt};
pub use index::{BlockIndex, DupePair, EntryId, IndexStatistics, SimhashIndex};
pub use simhash::{
    hamming_distance, similarity, Fingerprint, FingerprintEngine, HasherKind, PolynomialHasher,
    ShingleTokenizer, TokenHasher, Tokenizer, TokenizerKind, WordTokenizer, Xxh3Hasher,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build-time feature detection
pub mod features {
    //! Runtime feature detection.

    /// Check if batch fingerprinting runs on the rayon pool
    pub const fn has_parallel() -> bool {
        cfg!(feature = "parallel")
    }
}
