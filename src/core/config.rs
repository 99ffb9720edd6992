//! Configuration for fingerprinting and the near-duplicate index.
//!
//! [`SimhashConfig`] is a plain value passed at construction time; nothing in
//! the crate keeps configuration in process-wide state. Once validated it is
//! never mutated by the library.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{NeardupError, Result, ResultExt};
use crate::simhash::fingerprint::{validate_hashbits, DEFAULT_HASHBITS};
use crate::simhash::hashers::HasherKind;
use crate::simhash::tokenizers::TokenizerKind;

/// Default number of blocks the fingerprint is partitioned into.
pub const DEFAULT_BLOCK_COUNT: usize = 6;

/// Default maximum hamming distance for a near-duplicate.
pub const DEFAULT_MAX_DISTANCE: u32 = 2;

/// Fingerprinting and indexing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimhashConfig {
    /// Fingerprint width in bits (1..=128)
    pub hashbits: u32,

    /// Number of blocks the fingerprint bits are partitioned into
    pub block_count: usize,

    /// Largest hamming distance still reported as a near-duplicate
    pub max_distance: u32,

    /// Tokenizer applied to raw text
    pub tokenizer: TokenizerKind,

    /// Token hash function
    pub hasher: HasherKind,
}

impl Default for SimhashConfig {
    fn default() -> Self {
        Self {
            hashbits: DEFAULT_HASHBITS,
            block_count: DEFAULT_BLOCK_COUNT,
            max_distance: DEFAULT_MAX_DISTANCE,
            tokenizer: TokenizerKind::default(),
            hasher: HasherKind::default(),
        }
    }
}

impl SimhashConfig {
    /// Set the fingerprint width
    pub fn with_hashbits(mut self, hashbits: u32) -> Self {
        self.hashbits = hashbits;
        self
    }

    /// Set the block count
    pub fn with_block_count(mut self, block_count: usize) -> Self {
        self.block_count = block_count;
        self
    }

    /// Set the near-duplicate distance threshold
    pub fn with_max_distance(mut self, max_distance: u32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the tokenizer
    pub fn with_tokenizer(mut self, tokenizer: TokenizerKind) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Set the token hasher
    pub fn with_hasher(mut self, hasher: HasherKind) -> Self {
        self.hasher = hasher;
        self
    }

    /// Validate every field, including the block layout for `hashbits`.
    pub fn validate(&self) -> Result<()> {
        validate_hashbits(self.hashbits)?;
        validate_blocking(self.block_count, self.max_distance)?;
        validate_block_ceiling(self.block_count, self.hashbits)?;
        if let TokenizerKind::Shingles { size: 0 } = self.tokenizer {
            return Err(NeardupError::config_field(
                "shingle size must be greater than 0",
                "tokenizer.size",
            ));
        }
        Ok(())
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Render as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// `block_count > max_distance` is what guarantees no false negatives: with at
/// most `max_distance` differing bits spread over `block_count` blocks, some
/// block is untouched.
pub(crate) fn validate_blocking(block_count: usize, max_distance: u32) -> Result<()> {
    if block_count == 0 {
        return Err(NeardupError::config_field(
            "block_count must be greater than 0",
            "block_count",
        ));
    }
    if block_count as u64 <= u64::from(max_distance) {
        return Err(NeardupError::config_field(
            format!(
                "block_count ({block_count}) must be greater than max_distance ({max_distance})"
            ),
            "block_count",
        ));
    }
    Ok(())
}

/// Largest block count usable at a width; every block keeps at least two bits.
pub fn max_block_count(hashbits: u32) -> usize {
    (hashbits as usize / 2).max(1)
}

pub(crate) fn validate_block_ceiling(block_count: usize, hashbits: u32) -> Result<()> {
    let ceiling = max_block_count(hashbits);
    if block_count > ceiling {
        return Err(NeardupError::config_field(
            format!("block_count must not exceed {ceiling} for {hashbits}-bit fingerprints"),
            "block_count",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_config_error(config: SimhashConfig, needle: &str) {
        let message = config
            .validate()
            .expect_err("expected validation failure")
            .to_string();
        assert!(
            message.contains(needle),
            "expected message containing '{needle}', got '{message}'"
        );
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SimhashConfig::default();
        assert_eq!(config.hashbits, 64);
        assert_eq!(config.block_count, 6);
        assert_eq!(config.max_distance, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rules() {
        expect_config_error(SimhashConfig::default().with_hashbits(0), "hashbits");
        expect_config_error(SimhashConfig::default().with_hashbits(256), "hashbits");
        expect_config_error(SimhashConfig::default().with_block_count(0), "block_count");
        expect_config_error(
            SimhashConfig::default()
                .with_block_count(2)
                .with_max_distance(2),
            "greater than max_distance",
        );
        expect_config_error(
            SimhashConfig::default()
                .with_hashbits(8)
                .with_block_count(5)
                .with_max_distance(1),
            "must not exceed 4",
        );
        expect_config_error(
            SimhashConfig::default().with_tokenizer(TokenizerKind::Shingles { size: 0 }),
            "shingle size",
        );
    }

    #[test]
    fn test_block_ceiling_for_tiny_widths() {
        assert_eq!(max_block_count(1), 1);
        assert_eq!(max_block_count(64), 32);
        let config = SimhashConfig::default()
            .with_hashbits(1)
            .with_block_count(1)
            .with_max_distance(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_document_uses_defaults() {
        let config = SimhashConfig::from_yaml_str("max_distance: 3\nblock_count: 8\n").unwrap();
        assert_eq!(config.hashbits, 64);
        assert_eq!(config.block_count, 8);
        assert_eq!(config.max_distance, 3);
        assert_eq!(config.hasher, HasherKind::Polynomial);
    }

    #[test]
    fn test_yaml_rejects_invalid_blocking() {
        let err = SimhashConfig::from_yaml_str("block_count: 2\nmax_distance: 2\n").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = SimhashConfig::default()
            .with_hasher(HasherKind::Xxh3)
            .with_tokenizer(TokenizerKind::Shingles { size: 3 });
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(SimhashConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
