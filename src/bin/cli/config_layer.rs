//! Configuration Layer Management
//!
//! Layers, lowest priority first: built-in defaults, the YAML configuration
//! file, then command-line flags. The merged result is validated once.

use anyhow::Context;

use crate::cli::args::SettingsArgs;
use neardup_rs::core::config::SimhashConfig;

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

impl ConfigMerge<&SettingsArgs> for SimhashConfig {
    fn merge_with(&mut self, args: &SettingsArgs) {
        if let Some(hashbits) = args.hashbits {
            self.hashbits = hashbits;
        }
        if let Some(block_count) = args.block_count {
            self.block_count = block_count;
        }
        if let Some(max_distance) = args.max_distance {
            self.max_distance = max_distance;
        }
        if let Some(tokenizer) = args.tokenizer {
            self.tokenizer = tokenizer.resolve(args.shingle_size, self.tokenizer);
        } else if let (Some(size), neardup_rs::TokenizerKind::Shingles { .. }) =
            (args.shingle_size, self.tokenizer)
        {
            self.tokenizer = neardup_rs::TokenizerKind::Shingles { size };
        }
        if let Some(hasher) = args.hasher {
            self.hasher = hasher.into();
        }
    }
}

/// Load the configuration file (if any), apply flag overrides and validate.
pub fn load_configuration(args: &SettingsArgs) -> anyhow::Result<SimhashConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_yaml::from_str::<SimhashConfig>(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => SimhashConfig::default(),
    };

    config.merge_with(args);
    config.validate().context("Invalid configuration")?;
    tracing::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{HasherArg, TokenizerArg};
    use neardup_rs::{HasherKind, TokenizerKind};

    #[test]
    fn flags_override_defaults() {
        let args = SettingsArgs {
            max_distance: Some(3),
            block_count: Some(8),
            hasher: Some(HasherArg::Xxh3),
            tokenizer: Some(TokenizerArg::Shingles),
            ..SettingsArgs::default()
        };
        let config = load_configuration(&args).unwrap();
        assert_eq!(config.max_distance, 3);
        assert_eq!(config.block_count, 8);
        assert_eq!(config.hasher, HasherKind::Xxh3);
        assert_eq!(config.tokenizer, TokenizerKind::Shingles { size: 3 });
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let args = SettingsArgs {
            max_distance: Some(6),
            ..SettingsArgs::default()
        };
        assert!(load_configuration(&args).is_err());
    }

    #[test]
    fn file_layer_sits_below_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neardup.yml");
        std::fs::write(
            &path,
            "hashbits: 32\ntokenizer:\n  kind: shingles\n  size: 2\n",
        )
        .unwrap();

        let args = SettingsArgs {
            config: Some(path),
            shingle_size: Some(4),
            ..SettingsArgs::default()
        };
        let config = load_configuration(&args).unwrap();
        assert_eq!(config.hashbits, 32);
        assert_eq!(config.tokenizer, TokenizerKind::Shingles { size: 4 });
    }
}
