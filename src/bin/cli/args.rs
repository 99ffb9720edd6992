//! CLI Argument Structures and Configuration
//!
//! This module contains all CLI argument definitions, command structures,
//! and value enums used by the neardup binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use neardup_rs::{HasherKind, TokenizerKind};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SimHash fingerprinting and near-duplicate detection for line-oriented text
#[derive(Parser)]
#[command(name = "neardup")]
#[command(version = VERSION)]
#[command(about = "Find near-duplicate lines with SimHash fingerprints")]
#[command(long_about = "
Fingerprint each line of a text file with SimHash and find near-duplicates
through a block-partitioned index.

Common Usage:

  # Print a fingerprint for every line
  neardup fingerprint corpus.txt

  # List near-duplicate line pairs as JSON
  neardup dupes --format json corpus.txt

  # Allow up to 3 differing bits (needs more than 3 blocks)
  neardup dupes --max-distance 3 --block-count 8 corpus.txt

  # Lines similar to a given text, read from stdin
  cat corpus.txt | neardup query --text \"how are you\" -

  # Start from a configuration file
  neardup print-default-config > neardup.yml
  neardup dupes --config neardup.yml corpus.txt
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the fingerprint of every input line
    Fingerprint(InputArgs),

    /// List every pair of near-duplicate lines
    Dupes(DupesArgs),

    /// List the lines that are near-duplicates of a given text
    Query(QueryArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a neardup configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Overrides layered on top of the configuration file
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// YAML configuration file
    #[arg(long, global = true, env = "NEARDUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fingerprint width in bits (1-128)
    #[arg(long, global = true)]
    pub hashbits: Option<u32>,

    /// Number of blocks the fingerprint is split into
    #[arg(long, global = true)]
    pub block_count: Option<usize>,

    /// Largest hamming distance reported as a near-duplicate
    #[arg(long, global = true)]
    pub max_distance: Option<u32>,

    /// Tokenizer applied to each line
    #[arg(long, global = true, value_enum)]
    pub tokenizer: Option<TokenizerArg>,

    /// Words per shingle when --tokenizer=shingles
    #[arg(long, global = true)]
    pub shingle_size: Option<usize>,

    /// Token hash function
    #[arg(long, global = true, value_enum)]
    pub hasher: Option<HasherArg>,
}

/// Input file argument shared by the search commands
#[derive(Args)]
pub struct InputArgs {
    /// Input file, one document per line ("-" for stdin)
    pub input: PathBuf,
}

#[derive(Args)]
pub struct DupesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log index bucket statistics
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Text to search for
    #[arg(long)]
    pub text: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated lines
    Text,
    /// JSON array
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TokenizerArg {
    /// Whitespace-separated words
    Words,
    /// Overlapping word k-grams
    Shingles,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HasherArg {
    /// Multiplicative string hash
    Polynomial,
    /// XXH3-128
    Xxh3,
}

impl From<HasherArg> for HasherKind {
    fn from(arg: HasherArg) -> Self {
        match arg {
            HasherArg::Polynomial => HasherKind::Polynomial,
            HasherArg::Xxh3 => HasherKind::Xxh3,
        }
    }
}

/// Default shingle size when only `--tokenizer shingles` is given.
pub const DEFAULT_SHINGLE_SIZE: usize = 3;

impl TokenizerArg {
    /// Resolve into a library tokenizer, keeping an existing shingle size.
    pub fn resolve(self, shingle_size: Option<usize>, current: TokenizerKind) -> TokenizerKind {
        match self {
            TokenizerArg::Words => TokenizerKind::Words,
            TokenizerArg::Shingles => {
                let existing = match current {
                    TokenizerKind::Shingles { size } => Some(size),
                    TokenizerKind::Words => None,
                };
                TokenizerKind::Shingles {
                    size: shingle_size.or(existing).unwrap_or(DEFAULT_SHINGLE_SIZE),
                }
            }
        }
    }
}
