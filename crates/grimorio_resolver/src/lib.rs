//! Template expansion for Grimorio.
//!
//! Expands `{{reference}}` tokens in card bodies into prompt text. A
//! reference names either a context path (`npc.nombre`, `jugador.nivel`) or
//! another card's key. Expansion is recursive, cycle-aware and
//! depth-bounded, and it never fails: anything it cannot resolve becomes an
//! empty string, and the [`ResolutionStats`](grimorio_core::ResolutionStats)
//! it returns say what happened.
//!
//! Static helpers in [`analysis`] report which cards and context slices an
//! expansion can reach, and lint card sets for cycles and suspicious
//! references.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analysis;
mod config;
mod resolver;
mod token;

pub use analysis::{LintReport, find_cycles, lint, reachable_cards, reachable_slices};
pub use config::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT, ResolverConfig, ResolverConfigBuilder};
pub use resolver::{Resolver, resolve};
pub use token::{Segment, references, tokenize};
