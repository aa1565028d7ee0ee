//! Error types for the Grimorio template engine.
//!
//! Resolution itself never fails on data conditions: unknown variables,
//! reference cycles and malformed tokens degrade to empty substitutions and
//! are reported through resolution statistics. The types in this crate cover
//! the remaining failures: caller-side programming errors (an entry card that
//! is not in the card set), card set construction, configuration and input
//! file handling.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use grimorio_error::{CardError, CardErrorKind, GrimorioResult};
//!
//! fn find_card(key: &str) -> GrimorioResult<()> {
//!     Err(CardError::new(CardErrorKind::NotFound(key.to_string())))?
//! }
//!
//! match find_card("saludo") {
//!     Ok(()) => println!("found"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod card;
mod config;
mod error;
mod json;
mod resolve;

pub use card::{CardError, CardErrorKind};
pub use config::ConfigError;
pub use error::{GrimorioError, GrimorioErrorKind, GrimorioResult};
pub use json::JsonError;
pub use resolve::{ResolveError, ResolveErrorKind};
