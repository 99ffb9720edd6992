//! Configuration commands.

use owo_colors::OwoColorize;

use crate::cli::args::ValidateConfigArgs;
use neardup_rs::core::config::SimhashConfig;

/// Print the default configuration as YAML.
pub fn print_default_config() -> anyhow::Result<()> {
    eprintln!("{}", "# Default neardup configuration".dimmed());
    eprintln!(
        "{}",
        "# Usage: neardup dupes --config your-config.yml corpus.txt".dimmed()
    );

    let yaml_output = SimhashConfig::default().to_yaml_string()?;
    print!("{yaml_output}");
    Ok(())
}

/// Validate a configuration file and report the effective settings.
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    let config = SimhashConfig::from_file(&args.config)?;

    println!(
        "{} {}",
        "✅ Configuration is valid:".green(),
        args.config.display()
    );
    println!(
        "   hashbits={} block_count={} max_distance={}",
        config.hashbits, config.block_count, config.max_distance
    );
    Ok(())
}
