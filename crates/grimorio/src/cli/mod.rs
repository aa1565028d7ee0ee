//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the grimorio binary.

mod commands;
mod lint;
mod resolve;

pub use commands::{Cli, Commands};
pub use lint::lint_cards;
pub use resolve::resolve;
