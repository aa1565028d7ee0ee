//! Resolution caching with TTL support.
//!
//! This crate memoizes resolved template text keyed by card id and a
//! fingerprint of the context the resolution read, so repeated prompt
//! assembly against unchanged game state skips the expansion entirely.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod fingerprint;

pub use cache::{
    CacheEntry, CacheStats, ResolutionCache, ResolutionCacheConfig, ResolutionCacheConfigBuilder,
};
pub use fingerprint::{Fingerprint, FingerprintScope};
