//! SimHash fingerprinting: token hashing, tokenization, the fingerprint
//! engine and bit-distance operations.

pub mod distance;
pub mod engine;
pub mod fingerprint;
pub mod hashers;
pub mod tokenizers;

pub use distance::{hamming_distance, similarity};
pub use engine::FingerprintEngine;
pub use fingerprint::{Fingerprint, DEFAULT_HASHBITS, MAX_HASHBITS};
pub use hashers::{HasherKind, PolynomialHasher, TokenHasher, Xxh3Hasher};
pub use tokenizers::{count_tokens, ShingleTokenizer, Tokenizer, TokenizerKind, WordTokenizer};
