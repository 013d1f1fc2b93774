//! Top-level error wrapper types.

use crate::{ConfigError, PlatformError, RelayError, StoreError};
#[cfg(feature = "database")]
use crate::DatabaseError;

/// Every error a Herald crate can surface.
///
/// # Examples
///
/// ```
/// use herald_error::{ConfigError, HeraldError};
///
/// let err: HeraldError = ConfigError::new("missing [relay] section").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HeraldErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Config store error
    #[from(StoreError)]
    Store(StoreError),
    /// Chat platform error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Alert relay error
    #[from(RelayError)]
    Relay(RelayError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Herald error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Herald Error: {}", _0)]
pub struct HeraldError(Box<HeraldErrorKind>);

impl HeraldError {
    /// Create a new error from a kind.
    pub fn new(kind: HeraldErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HeraldErrorKind {
        &self.0
    }
}

impl<T> From<T> for HeraldError
where
    T: Into<HeraldErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Herald operations.
pub type HeraldResult<T> = std::result::Result<T, HeraldError>;
