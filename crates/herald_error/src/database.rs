//! Database error types.

use crate::{StoreError, StoreErrorKind};

/// Database error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// Connection failed
    #[display("Database connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Database query error: {}", _0)]
    Query(String),
    /// Insert violated a unique constraint
    #[display("Unique constraint violated: {}", _0)]
    UniqueViolation(String),
    /// Migration error
    #[display("Migration error: {}", _0)]
    Migration(String),
}

/// Database error with source location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::Migration("bad sql".into()));
/// assert!(format!("{}", err).contains("Migration error"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The kind of error that occurred
    pub kind: DatabaseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Convert into a store error, mapping unique violations for `guild_id`
    /// to [`StoreErrorKind::DuplicateKey`].
    #[track_caller]
    pub fn into_store_error(self, guild_id: u64) -> StoreError {
        let kind = match self.kind {
            DatabaseErrorKind::UniqueViolation(_) => StoreErrorKind::DuplicateKey(guild_id),
            DatabaseErrorKind::Connection(msg) => StoreErrorKind::Unavailable(msg),
            DatabaseErrorKind::Query(msg) | DatabaseErrorKind::Migration(msg) => {
                StoreErrorKind::Query(msg)
            }
        };
        StoreError::new(kind)
    }
}

impl From<diesel::result::Error> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind as DieselKind, Error};
        match err {
            Error::DatabaseError(DieselKind::UniqueViolation, info) => DatabaseError::new(
                DatabaseErrorKind::UniqueViolation(info.message().to_string()),
            ),
            Error::DatabaseError(DieselKind::ClosedConnection, info) => {
                DatabaseError::new(DatabaseErrorKind::Connection(info.message().to_string()))
            }
            _ => DatabaseError::new(DatabaseErrorKind::Query(err.to_string())),
        }
    }
}

impl From<diesel::ConnectionError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}
