//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Grimorio - template variable resolution for LLM prompts
#[derive(Parser, Debug)]
#[command(name = "grimorio")]
#[command(about = "Template variable resolution for LLM prompts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to bundled, ~/.config/grimorio, ./grimorio.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a card or an ad-hoc template against a context
    Resolve(ResolveArgs),

    /// Check a card file for reference cycles and unrecognized references
    Lint {
        /// Path to the card TOML file
        #[arg(long)]
        cards: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for `grimorio resolve`
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the card TOML file
    #[arg(long)]
    pub cards: PathBuf,

    /// Path to the context JSON file
    #[arg(long)]
    pub context: PathBuf,

    /// Key of the card to resolve
    #[arg(long, conflicts_with = "template", required_unless_present = "template")]
    pub card: Option<String>,

    /// Ad-hoc template body to resolve
    #[arg(long)]
    pub template: Option<String>,

    /// Skip the resolution cache
    #[arg(long)]
    pub no_cache: bool,

    /// Print the result and stats as JSON
    #[arg(long)]
    pub json: bool,
}
