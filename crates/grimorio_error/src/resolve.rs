//! Resolution request error types.
//!
//! These only describe misuse of the entry point by the caller. Data
//! problems inside templates never produce an error.

/// Specific error conditions for a resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ResolveErrorKind {
    /// The entry card id is not part of the supplied card set
    #[display("Entry card '{}' is not in the card set", _0)]
    UnknownEntryCard(String),
    /// The requested card key is not part of the supplied card set
    #[display("No card with key '{}'", _0)]
    UnknownEntryKey(String),
}

/// Error type for resolution requests.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Resolve Error: {} at line {} in {}", kind, line, file)]
pub struct ResolveError {
    /// The specific error condition
    pub kind: ResolveErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ResolveError {
    /// Create a new ResolveError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ResolveErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
