//! Core data types for the Grimorio template engine.
//!
//! This crate holds everything a resolution reads:
//!
//! - [`Card`] and [`CardSet`]: named templates and the immutable, indexed
//!   snapshot a resolution walks
//! - [`TemplateStore`]: the live card collection, handing out copy-on-write
//!   snapshots
//! - [`VariableContext`] and [`lookup`]: the per-request game-state snapshot
//!   and the primary variable accessor over it
//! - [`ResolutionStats`] and [`VariableOutcome`]: per-resolution counters

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod card;
mod card_set;
mod context;
mod stats;
mod store;

pub use card::{Card, CardFile, CardId, CardKind};
pub use card_set::CardSet;
pub use context::{ContextSlice, VariableContext, lookup};
pub use stats::{ResolutionStats, VariableOutcome, VariableRecord};
pub use store::TemplateStore;
