//! Grimorio CLI binary.
//!
//! Resolves cards from a TOML card file against a JSON context, and lints
//! card files for reference cycles and unrecognized references.

use clap::Parser;
use grimorio::observability::{ObservabilityConfig, init_observability_with_config};

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, lint_cards, resolve};

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    init_observability_with_config(
        ObservabilityConfig::new("grimorio")
            .with_log_level(log_level)
            .with_json_logs(cli.json_logs),
    )?;

    match cli.command {
        Commands::Resolve(args) => resolve(args, cli.config.as_deref(), cli.verbose)?,
        Commands::Lint { cards, json } => lint_cards(&cards, json)?,
    }

    Ok(())
}
