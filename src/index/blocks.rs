//! Partitioning of fingerprint bits into fixed blocks.

use crate::core::config::{validate_block_ceiling, validate_blocking};
use crate::core::errors::Result;
use crate::simhash::fingerprint::{low_mask, Fingerprint};

/// Contiguous bit ranges covering all `hashbits` bits.
///
/// Block `p` starts at bit `p * (hashbits / block_count)`; the last block
/// absorbs the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    hashbits: u32,
    offsets: Vec<u32>,
    widths: Vec<u32>,
}

impl BlockLayout {
    /// Build a layout; fails with a configuration error when the block count
    /// cannot guarantee `max_distance` or exceeds the width's block ceiling.
    pub fn new(hashbits: u32, block_count: usize, max_distance: u32) -> Result<Self> {
        validate_blocking(block_count, max_distance)?;
        validate_block_ceiling(block_count, hashbits)?;

        let step = hashbits / block_count as u32;
        let offsets: Vec<u32> = (0..block_count as u32).map(|p| p * step).collect();
        let widths = offsets
            .iter()
            .enumerate()
            .map(|(p, &start)| {
                let end = offsets.get(p + 1).copied().unwrap_or(hashbits);
                end - start
            })
            .collect();

        Ok(Self {
            hashbits,
            offsets,
            widths,
        })
    }

    /// Width the layout was built for.
    pub fn hashbits(&self) -> u32 {
        self.hashbits
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.offsets.len()
    }

    /// First bit of block `position`.
    pub fn offset(&self, position: usize) -> u32 {
        self.offsets[position]
    }

    /// Number of bits in block `position`.
    pub fn width(&self, position: usize) -> u32 {
        self.widths[position]
    }

    /// Bit mask selecting block `position` in place.
    pub fn mask(&self, position: usize) -> u128 {
        low_mask(self.widths[position]) << self.offsets[position]
    }

    /// Bits of `fingerprint` in block `position`, shifted down to bit 0.
    #[inline]
    pub fn key(&self, position: usize, fingerprint: &Fingerprint) -> u128 {
        (fingerprint.value() >> self.offsets[position]) & low_mask(self.widths[position])
    }

    /// Block keys for every position, in position order.
    pub fn keys<'a>(&'a self, fingerprint: &'a Fingerprint) -> impl Iterator<Item = u128> + 'a {
        (0..self.block_count()).map(move |position| self.key(position, fingerprint))
    }
}
