//! Bit-distance and similarity over equal-width fingerprints.

use crate::core::errors::Result;

use super::fingerprint::Fingerprint;

/// Number of differing bits between two fingerprints (XOR + popcount).
///
/// Fails with [`SizeMismatch`](crate::NeardupError::SizeMismatch) when the
/// widths differ.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32> {
    a.ensure_same_width(b, "hamming_distance")?;
    Ok(raw_distance(a, b))
}

/// `1 - hamming_distance / hashbits`, in `[0, 1]`.
pub fn similarity(a: &Fingerprint, b: &Fingerprint) -> Result<f64> {
    a.ensure_same_width(b, "similarity")?;
    Ok(similarity_from_distance(raw_distance(a, b), a.hashbits()))
}

/// Distance for fingerprints whose widths are already known to agree.
#[inline]
pub(crate) fn raw_distance(a: &Fingerprint, b: &Fingerprint) -> u32 {
    (a.value() ^ b.value()).count_ones()
}

#[inline]
pub(crate) fn similarity_from_distance(distance: u32, hashbits: u32) -> f64 {
    1.0 - f64::from(distance) / f64::from(hashbits)
}

impl Fingerprint {
    /// See [`hamming_distance`].
    pub fn hamming_distance(&self, other: &Self) -> Result<u32> {
        hamming_distance(self, other)
    }

    /// See [`similarity`].
    pub fn similarity(&self, other: &Self) -> Result<f64> {
        similarity(self, other)
    }
}
