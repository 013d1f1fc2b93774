//! Mapping serenity failures onto platform error kinds.
//!
//! Discord reports most failures as an HTTP status plus a JSON error code.
//! The codes the relay cares about are classified; everything else becomes
//! [`PlatformErrorKind::Api`].

use herald_error::{PlatformError, PlatformErrorKind, PlatformResult};
use serenity::http::HttpError;

const UNKNOWN_CHANNEL: isize = 10003;
const UNKNOWN_MEMBER: isize = 10007;
const UNKNOWN_USER: isize = 10013;
const MISSING_ACCESS: isize = 50001;
const MISSING_PERMISSIONS: isize = 50013;
const TOO_MANY_REQUESTS: u16 = 429;

/// Classify an unsuccessful Discord response.
///
/// `subject` is the id the request was about (channel, thread or user),
/// reported in the not-found kinds.
///
/// # Example
/// ```
/// use herald_error::PlatformErrorKind;
/// use herald_social::kind_for_response;
///
/// let kind = kind_for_response(404, 10007, 42, "Unknown Member");
/// assert_eq!(kind, PlatformErrorKind::UnknownMember(42));
/// ```
pub fn kind_for_response(
    status: u16,
    code: isize,
    subject: u64,
    message: &str,
) -> PlatformErrorKind {
    match (status, code) {
        (TOO_MANY_REQUESTS, _) => PlatformErrorKind::RateLimited(message.to_string()),
        (_, UNKNOWN_CHANNEL) => PlatformErrorKind::ChannelNotFound(subject),
        (_, UNKNOWN_MEMBER | UNKNOWN_USER) => PlatformErrorKind::UnknownMember(subject),
        (_, MISSING_ACCESS | MISSING_PERMISSIONS) => {
            PlatformErrorKind::MissingPermissions(message.to_string())
        }
        _ => PlatformErrorKind::Api(format!("{status} ({code}): {message}")),
    }
}

/// Convert a serenity error into a located [`PlatformError`].
#[track_caller]
pub fn platform_error(err: &serenity::Error, subject: u64) -> PlatformError {
    let kind = match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => kind_for_response(
            response.status_code.as_u16(),
            response.error.code,
            subject,
            &response.error.message,
        ),
        other => PlatformErrorKind::Api(other.to_string()),
    };
    PlatformError::new(kind)
}

/// Attach a subject id while converting serenity results.
pub(crate) trait SerenityResultExt<T> {
    fn or_platform(self, subject: u64) -> PlatformResult<T>;
}

impl<T> SerenityResultExt<T> for serenity::Result<T> {
    #[track_caller]
    fn or_platform(self, subject: u64) -> PlatformResult<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(platform_error(&e, subject)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_wins_over_code() {
        let kind = kind_for_response(429, 0, 1, "You are being rate limited.");
        assert!(matches!(kind, PlatformErrorKind::RateLimited(_)));
    }

    #[test]
    fn test_not_found_codes_carry_subject() {
        assert_eq!(
            kind_for_response(404, UNKNOWN_CHANNEL, 9, "Unknown Channel"),
            PlatformErrorKind::ChannelNotFound(9)
        );
        assert_eq!(
            kind_for_response(404, UNKNOWN_USER, 3, "Unknown User"),
            PlatformErrorKind::UnknownMember(3)
        );
    }

    #[test]
    fn test_permission_codes() {
        for code in [MISSING_ACCESS, MISSING_PERMISSIONS] {
            assert!(matches!(
                kind_for_response(403, code, 1, "Missing Permissions"),
                PlatformErrorKind::MissingPermissions(_)
            ));
        }
    }

    #[test]
    fn test_other_failures_are_api_errors() {
        let kind = kind_for_response(500, 0, 1, "Internal Server Error");
        assert_eq!(
            kind,
            PlatformErrorKind::Api("500 (0): Internal Server Error".to_string())
        );
    }
}
