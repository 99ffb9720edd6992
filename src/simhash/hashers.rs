//! Token hash functions feeding the SimHash accumulator.
//!
//! Any non-cryptographic hash that produces at least `hashbits` well-mixed
//! bits works; collision behavior is otherwise unconstrained.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;

use super::fingerprint::low_mask;

/// Strategy for hashing one token into a `hashbits`-wide integer.
pub trait TokenHasher {
    /// Hash `token`; the result must fit in `hashbits` bits.
    fn hash_token(&self, token: &str, hashbits: u32) -> u128;
}

/// Variable-width multiplicative string hash.
///
/// Width-agnostic: the multiply/xor chain runs modulo `2^hashbits`, so the
/// same token hashes consistently at any width up to 128 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolynomialHasher;

impl PolynomialHasher {
    const MULTIPLIER: u128 = 1_000_003;
}

impl TokenHasher for PolynomialHasher {
    fn hash_token(&self, token: &str, hashbits: u32) -> u128 {
        let mask = low_mask(hashbits);
        let mut chars = token.chars();
        let raw = match chars.next() {
            None => 0,
            Some(first) => {
                let mut x = (u128::from(first) << 7) & mask;
                let mut len: u128 = 0;
                for c in token.chars() {
                    x = (x.wrapping_mul(Self::MULTIPLIER) ^ u128::from(c)) & mask;
                    len += 1;
                }
                x ^ len
            }
        };
        // Complemented so that a zero accumulator (ties) lands on 0 bits while
        // distances stay identical to the uncomplemented layout.
        !raw & mask
    }
}

/// XXH3-128 token hash, truncated to `hashbits`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh3Hasher;

impl TokenHasher for Xxh3Hasher {
    fn hash_token(&self, token: &str, hashbits: u32) -> u128 {
        xxh3_128(token.as_bytes()) & low_mask(hashbits)
    }
}

/// Serializable selector over the built-in hashers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    /// [`PolynomialHasher`]
    #[default]
    Polynomial,
    /// [`Xxh3Hasher`]
    Xxh3,
}

impl TokenHasher for HasherKind {
    fn hash_token(&self, token: &str, hashbits: u32) -> u128 {
        match self {
            Self::Polynomial => PolynomialHasher.hash_token(token, hashbits),
            Self::Xxh3 => Xxh3Hasher.hash_token(token, hashbits),
        }
    }
}

impl<T: TokenHasher + ?Sized> TokenHasher for &T {
    fn hash_token(&self, token: &str, hashbits: u32) -> u128 {
        (**self).hash_token(token, hashbits)
    }
}
