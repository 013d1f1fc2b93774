//! Chat platform error types.
//!
//! Returned by platform adapters (Discord) for channel, thread and message
//! operations. Some kinds are expected outcomes rather than failures, see
//! [`PlatformError::is_expected_member_outcome`].

/// Chat platform error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum PlatformErrorKind {
    /// Channel does not exist or is not visible to the bot.
    #[display("Channel not found: {_0}")]
    ChannelNotFound(u64),

    /// Channel exists but cannot carry text messages.
    #[display("Channel {_0} is not a text channel")]
    NotTextChannel(u64),

    /// Member is unknown to the guild (left, or never joined).
    #[display("Unknown member: {_0}")]
    UnknownMember(u64),

    /// Member already belongs to the thread.
    #[display("Member {_0} is already in the thread")]
    AlreadyMember(u64),

    /// Bot lacks required permissions for an operation.
    #[display("Missing permissions: {_0}")]
    MissingPermissions(String),

    /// Request was rate limited by the platform.
    #[display("Rate limited: {_0}")]
    RateLimited(String),

    /// Any other API or transport failure.
    #[display("Platform API error: {_0}")]
    Api(String),
}

/// Chat platform error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", kind, line, file)]
pub struct PlatformError {
    /// The kind of error that occurred
    pub kind: PlatformErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new PlatformError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use herald_error::{PlatformError, PlatformErrorKind};
    ///
    /// let err = PlatformError::new(PlatformErrorKind::ChannelNotFound(7));
    /// assert!(format!("{}", err).contains("Channel not found: 7"));
    /// ```
    #[track_caller]
    pub fn new(kind: PlatformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether a failed add-member call is one membership sync tolerates silently.
    pub fn is_expected_member_outcome(&self) -> bool {
        matches!(
            self.kind,
            PlatformErrorKind::AlreadyMember(_) | PlatformErrorKind::UnknownMember(_)
        )
    }
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
