//! Card set error types.

/// Specific error conditions for card sets and card files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CardErrorKind {
    /// Two cards share the same reference key
    #[display("Duplicate card key '{}'", _0)]
    DuplicateKey(String),
    /// Two cards share the same id
    #[display("Duplicate card id '{}'", _0)]
    DuplicateId(String),
    /// A card key is empty or contains only whitespace
    #[display("Card '{}' has an empty key", _0)]
    EmptyKey(String),
    /// No card with the given id or key
    #[display("Card not found: {}", _0)]
    NotFound(String),
    /// Failed to read a card file
    #[display("Failed to read card file: {}", _0)]
    FileRead(String),
    /// Failed to parse card file contents
    #[display("Failed to parse card file: {}", _0)]
    Parse(String),
}

/// Error type for card set operations.
///
/// # Examples
///
/// ```
/// use grimorio_error::{CardError, CardErrorKind};
///
/// let err = CardError::new(CardErrorKind::DuplicateKey("saludo".to_string()));
/// assert!(format!("{}", err).contains("saludo"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Card Error: {} at line {} in {}", kind, line, file)]
pub struct CardError {
    /// The specific error condition
    pub kind: CardErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl CardError {
    /// Create a new CardError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CardErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
