//! neardup CLI - SimHash fingerprinting and near-duplicate detection
//!
//! Fingerprints each line of a text input and reports near-duplicates through
//! the block-partitioned index.

use clap::Parser;

mod cli;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Fingerprint(args) => {
            let config = cli::config_layer::load_configuration(&cli.settings)?;
            cli::fingerprint_command(args, &config)?;
        }
        Commands::Dupes(args) => {
            let config = cli::config_layer::load_configuration(&cli.settings)?;
            cli::dupes_command(args, &config)?;
        }
        Commands::Query(args) => {
            let config = cli::config_layer::load_configuration(&cli.settings)?;
            cli::query_command(args, &config)?;
        }
        Commands::PrintDefaultConfig => {
            cli::print_default_config()?;
        }
        Commands::ValidateConfig(args) => {
            cli::validate_config(args)?;
        }
    }

    Ok(())
}
