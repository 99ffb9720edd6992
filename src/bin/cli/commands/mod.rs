//! Command implementations for the neardup CLI.

pub mod config;
pub mod search;

pub use config::{print_default_config, validate_config};
pub use search::{dupes_command, fingerprint_command, query_command};
