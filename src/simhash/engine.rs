//! Charikar SimHash fingerprint computation.
//!
//! Each token is hashed to a `hashbits`-wide integer; a signed accumulator per
//! bit adds the token weight where the hash bit is 1 and subtracts it where it
//! is 0. Output bit `i` is set iff `accumulator[i] > 0`, so ties resolve to 0
//! and an empty token set yields the all-zero fingerprint.

use std::borrow::Borrow;

use tracing::debug;

use crate::core::config::SimhashConfig;
use crate::core::errors::Result;

use super::fingerprint::{validate_hashbits, Fingerprint, DEFAULT_HASHBITS, MAX_HASHBITS};
use super::hashers::{HasherKind, PolynomialHasher, TokenHasher};
use super::tokenizers::{Tokenizer, WordTokenizer};

/// Turns weighted token sets into fingerprints of a fixed width.
#[derive(Debug, Clone)]
pub struct FingerprintEngine<H = PolynomialHasher> {
    hashbits: u32,
    hasher: H,
}

impl Default for FingerprintEngine {
    fn default() -> Self {
        Self {
            hashbits: DEFAULT_HASHBITS,
            hasher: PolynomialHasher,
        }
    }
}

impl FingerprintEngine<HasherKind> {
    /// Engine matching a validated configuration.
    pub fn from_config(config: &SimhashConfig) -> Result<Self> {
        Self::new(config.hashbits, config.hasher)
    }
}

impl<H: TokenHasher> FingerprintEngine<H> {
    /// Create an engine; fails with a configuration error on an
    /// unsupported width.
    pub fn new(hashbits: u32, hasher: H) -> Result<Self> {
        validate_hashbits(hashbits)?;
        Ok(Self { hashbits, hasher })
    }

    /// Output width in bits.
    pub fn hashbits(&self) -> u32 {
        self.hashbits
    }

    /// Token hasher in use.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Fingerprint any finite sequence of `(token, weight)` pairs.
    ///
    /// Repeated tokens simply contribute again, so passing every occurrence
    /// with weight 1 is equivalent to passing each distinct token once with
    /// its count.
    pub fn compute<I, T>(&self, tokens: I) -> Fingerprint
    where
        I: IntoIterator<Item = (T, f64)>,
        T: Borrow<str>,
    {
        let bits = self.hashbits as usize;
        let mut acc = [0f64; MAX_HASHBITS as usize];
        let acc = &mut acc[..bits];

        for (token, weight) in tokens {
            let hash = self.hasher.hash_token(token.borrow(), self.hashbits);
            for (i, slot) in acc.iter_mut().enumerate() {
                if (hash >> i) & 1 == 1 {
                    *slot += weight;
                } else {
                    *slot -= weight;
                }
            }
        }

        let mut out = 0u128;
        for (i, slot) in acc.iter().enumerate() {
            if *slot > 0.0 {
                out |= 1u128 << i;
            }
        }
        Fingerprint::from_masked(out, self.hashbits)
    }

    /// Tokenize `text` and fingerprint the result.
    pub fn fingerprint_text<T>(&self, text: &str, tokenizer: &T) -> Fingerprint
    where
        T: Tokenizer + ?Sized,
    {
        self.compute(tokenizer.tokenize(text))
    }

    /// Fingerprint many texts, preserving input order.
    #[cfg(feature = "parallel")]
    pub fn fingerprint_batch<S, T>(&self, texts: &[S], tokenizer: &T) -> Vec<Fingerprint>
    where
        S: AsRef<str> + Sync,
        T: Tokenizer + Sync + ?Sized,
        H: Sync,
    {
        use rayon::prelude::*;

        debug!("Fingerprinting {} texts in parallel", texts.len());
        texts
            .par_iter()
            .map(|text| self.fingerprint_text(text.as_ref(), tokenizer))
            .collect()
    }

    /// Fingerprint many texts, preserving input order.
    #[cfg(not(feature = "parallel"))]
    pub fn fingerprint_batch<S, T>(&self, texts: &[S], tokenizer: &T) -> Vec<Fingerprint>
    where
        S: AsRef<str> + Sync,
        T: Tokenizer + Sync + ?Sized,
        H: Sync,
    {
        debug!("Fingerprinting {} texts sequentially", texts.len());
        texts
            .iter()
            .map(|text| self.fingerprint_text(text.as_ref(), tokenizer))
            .collect()
    }
}

impl Fingerprint {
    /// Fingerprint weighted tokens with the default hasher.
    pub fn from_tokens<I, T>(tokens: I, hashbits: u32) -> Result<Self>
    where
        I: IntoIterator<Item = (T, f64)>,
        T: Borrow<str>,
    {
        Ok(FingerprintEngine::new(hashbits, PolynomialHasher)?.compute(tokens))
    }

    /// Fingerprint whitespace-separated words, weighted by occurrence count.
    pub fn from_text(text: &str, hashbits: u32) -> Result<Self> {
        let engine = FingerprintEngine::new(hashbits, PolynomialHasher)?;
        Ok(engine.fingerprint_text(text, &WordTokenizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simhash::tokenizers::ShingleTokenizer;

    /// Hasher returning a fixed value per token, for hand-checkable sums.
    struct TableHasher;

    impl TokenHasher for TableHasher {
        fn hash_token(&self, token: &str, _hashbits: u32) -> u128 {
            match token {
                "a" => 0b0011,
                "b" => 0b0101,
                _ => 0b0000,
            }
        }
    }

    #[test]
    fn test_empty_input_is_zero() {
        let fp = Fingerprint::from_tokens(Vec::<(&str, f64)>::new(), 64).unwrap();
        assert_eq!(fp.value(), 0);
        assert_eq!(fp.hashbits(), 64);
    }

    #[test]
    fn test_accumulator_sign_rule() {
        let engine = FingerprintEngine::new(4, TableHasher).unwrap();
        // bit0: +1 +1 = 2 -> 1; bit1: +1 -1 = 0 -> 0 (tie); bit2: -1 +1 = 0 -> 0; bit3: -2 -> 0
        assert_eq!(engine.compute([("a", 1.0), ("b", 1.0)]).value(), 0b0001);
        // bit1: +2 -1 = 1 -> 1; bit2: -2 +1 -> 0
        assert_eq!(engine.compute([("a", 2.0), ("b", 1.0)]).value(), 0b0011);
    }

    #[test]
    fn test_weights_equal_repetition() {
        let engine: FingerprintEngine = FingerprintEngine::default();
        let repeated = engine.compute([("x", 1.0), ("y", 1.0), ("x", 1.0)]);
        let weighted = engine.compute([("x", 2.0), ("y", 1.0)]);
        assert_eq!(repeated, weighted);
    }

    #[test]
    fn test_single_token_is_its_hash() {
        let engine = FingerprintEngine::new(64, PolynomialHasher).unwrap();
        let fp = engine.compute([("hello", 1.0)]);
        assert_eq!(fp.value(), PolynomialHasher.hash_token("hello", 64));
    }

    #[test]
    fn test_rejects_bad_width() {
        assert!(FingerprintEngine::new(0, PolynomialHasher).is_err());
        assert!(Fingerprint::from_text("x", 129).is_err());
    }

    #[test]
    fn test_wide_fingerprint() {
        let fp = Fingerprint::from_text("extremely long hash bitlength", 128).unwrap();
        assert_eq!(fp.hashbits(), 128);
        assert_eq!(fp.to_hex().len(), 34);
    }

    #[test]
    fn test_batch_preserves_order() {
        let engine: FingerprintEngine = FingerprintEngine::default();
        let texts = ["alpha beta", "gamma delta", "alpha beta"];
        let batch = engine.fingerprint_batch(&texts, &ShingleTokenizer::new(2));
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], batch[2]);
        assert_eq!(
            batch[1],
            engine.fingerprint_text("gamma delta", &ShingleTokenizer::new(2))
        );
    }
}
