//! CLI Module Organization
//!
//! - args: CLI argument structures and value enums
//! - config_layer: configuration file loading and flag overrides
//! - commands: command execution
//! - output: result records and formatting

pub mod args;
pub mod commands;
pub mod config_layer;
pub mod output;

pub use args::*;
pub use commands::*;
