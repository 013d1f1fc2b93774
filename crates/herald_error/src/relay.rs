//! Alert relay error types.
//!
//! Every variant is contained to the single event or single guild being
//! processed; the engine logs them and carries on.

use crate::{PlatformError, StoreError};

/// Alert relay failure conditions.
#[derive(Debug, Clone, derive_more::Display)]
pub enum RelayErrorKind {
    /// Config store could not be read; in-memory defaults were used.
    #[display("Config read failed for guild {guild_id}: {source}")]
    ConfigRead {
        /// Guild whose configuration was requested
        guild_id: u64,
        /// Underlying store error
        source: StoreError,
    },

    /// Config store rejected a write for one guild.
    #[display("Config write failed for guild {guild_id}: {source}")]
    ConfigWrite {
        /// Guild whose configuration was being persisted
        guild_id: u64,
        /// Underlying store error
        source: StoreError,
    },

    /// Destination channel, voice room or thread could not be resolved.
    #[display("Could not resolve channel {channel_id}: {source}")]
    ChannelResolution {
        /// Channel that failed to resolve
        channel_id: u64,
        /// Underlying platform error
        source: PlatformError,
    },

    /// Private thread could not be created for a voice room.
    #[display("Thread creation failed for room {room_id}: {source}")]
    ThreadCreation {
        /// Voice room the thread was for
        room_id: u64,
        /// Underlying platform error
        source: PlatformError,
    },

    /// Some members could not be added to a thread.
    #[display("Membership sync for thread {thread_id} left {failed} of {attempted} members out")]
    MembershipSync {
        /// Thread being synchronized
        thread_id: u64,
        /// Add attempts made
        attempted: usize,
        /// Attempts that failed unexpectedly
        failed: usize,
    },

    /// Alert message could not be sent.
    #[display("Message send to {channel_id} failed: {source}")]
    MessageSend {
        /// Destination channel or thread
        channel_id: u64,
        /// Underlying platform error
        source: PlatformError,
    },
}

/// Alert relay error with location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{RelayError, RelayErrorKind};
///
/// let err = RelayError::new(RelayErrorKind::MembershipSync {
///     thread_id: 9,
///     attempted: 4,
///     failed: 1,
/// });
/// assert!(format!("{}", err).contains("1 of 4"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Relay Error: {} at line {} in {}", kind, line, file)]
pub struct RelayError {
    /// The kind of error that occurred
    pub kind: RelayErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RelayError {
    /// Create a new relay error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RelayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
