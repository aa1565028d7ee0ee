//! Grimorio - template variable resolution and caching
//!
//! Grimorio expands named, nestable prompt templates (*cards*) into the text
//! sent to an LLM. Cards reference live game state (`{{npc.nombre}}`,
//! `{{jugador.nivel}}`) and each other (`{{saludo}}`); expansion is
//! recursive, cycle-aware and depth-bounded, and it never fails on bad data.
//! Results are memoized per card and context fingerprint, and every
//! resolution is recorded for inspection.
//!
//! # Quick Start
//!
//! ```
//! use grimorio::{Grimorio, GrimorioConfig, ResolveOptions};
//! use grimorio::{Card, CardId, VariableContext};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grimorio = Grimorio::with_cards(
//!     GrimorioConfig::default(),
//!     vec![Card::template(
//!         "c-saludo",
//!         "saludo",
//!         "Hola {{npc.nombre}}, hoy es {{player.hora}}",
//!     )],
//! )?;
//!
//! let ctx = VariableContext::default()
//!     .with_npc(json!({"nombre": "Gareth"}))
//!     .with_player(json!({"hora": "10:30pm"}));
//!
//! let resolution =
//!     grimorio.resolve_card(&CardId::new("c-saludo"), &ctx, &ResolveOptions::default())?;
//! assert_eq!(resolution.result(), "Hola Gareth, hoy es 10:30pm");
//! assert_eq!(resolution.stats().counts(), (2, 0, 0));
//! # Ok(())
//! # }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - Export tracing spans through OpenTelemetry (stdout)
//!
//! # Architecture
//!
//! - `grimorio_error` - Error types
//! - `grimorio_core` - Cards, contexts, the template store and stats types
//! - `grimorio_resolver` - Tokenizer, recursive expansion and card analysis
//! - `grimorio_cache` - Fingerprinted TTL cache
//! - `grimorio_stats` - Resolution logs and aggregate counters
//!
//! This crate ties them into the [`Grimorio`] service and re-exports the
//! types callers need.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
pub mod observability;

pub use config::GrimorioConfig;
pub use engine::{Grimorio, Resolution, ResolveOptions};

pub use grimorio_cache::{
    CacheStats, Fingerprint, FingerprintScope, ResolutionCache, ResolutionCacheConfig,
};
pub use grimorio_core::{
    Card, CardFile, CardId, CardKind, CardSet, ContextSlice, ResolutionStats, TemplateStore,
    VariableContext, VariableOutcome, VariableRecord, lookup,
};
pub use grimorio_error::*;
pub use grimorio_resolver::{LintReport, ResolverConfig, lint, resolve};
pub use grimorio_stats::{ResolutionLog, StatsCollector, StatsConfig, StatsSummary, VariableUsage};
