//! Config store error types.

/// Kinds of config store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// A row for this guild already exists.
    ///
    /// Raised by inserts racing another initializer; callers materializing
    /// defaults treat it as success.
    #[display("Duplicate key for guild {}", _0)]
    DuplicateKey(u64),
    /// The backing store could not be reached.
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
    /// A query against the store failed.
    #[display("Store query failed: {}", _0)]
    Query(String),
    /// A stored row could not be converted into a configuration.
    #[display("Corrupt row: {}", _0)]
    Corrupt(String),
}

/// Config store error with location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::DuplicateKey(42));
/// assert!(err.is_duplicate_key());
/// assert!(format!("{}", err).contains("Duplicate key"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error reports an insert that lost a race to another writer.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self.kind, StoreErrorKind::DuplicateKey(_))
    }
}

/// Result type for config store operations.
pub type StoreResult<T> = Result<T, StoreError>;
