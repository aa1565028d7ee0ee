//! Top-level error wrapper types.

use crate::{CardError, ConfigError, JsonError, ResolveError};

/// Every error condition surfaced by the Grimorio crates.
///
/// # Examples
///
/// ```
/// use grimorio_error::{ConfigError, GrimorioError};
///
/// let err: GrimorioError = ConfigError::new("max_depth must be positive").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GrimorioErrorKind {
    /// Card set or card file error
    #[from(CardError)]
    Card(CardError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Caller-side resolution request error
    #[from(ResolveError)]
    Resolve(ResolveError),
}

/// Grimorio error with kind discrimination.
///
/// # Examples
///
/// ```
/// use grimorio_error::{GrimorioErrorKind, GrimorioResult, ResolveError, ResolveErrorKind};
///
/// fn resolve() -> GrimorioResult<String> {
///     Err(ResolveError::new(ResolveErrorKind::UnknownEntryCard("card-9".to_string())))?
/// }
///
/// let err = resolve().unwrap_err();
/// assert!(matches!(err.kind(), GrimorioErrorKind::Resolve(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Grimorio Error: {}", _0)]
pub struct GrimorioError(Box<GrimorioErrorKind>);

impl GrimorioError {
    /// Create a new error from a kind.
    pub fn new(kind: GrimorioErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GrimorioErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to GrimorioErrorKind
impl<T> From<T> for GrimorioError
where
    T: Into<GrimorioErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Grimorio operations.
pub type GrimorioResult<T> = std::result::Result<T, GrimorioError>;
