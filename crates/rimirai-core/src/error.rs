//! Server status-code classifier — maps the numeric `code` field of every
//! API envelope to a semantic error.
//!
//! The Mirai HTTP plugin reports logical failures inside a 200 response, so
//! this table is consulted on every call, not just on HTTP errors. The
//! mapping is fixed by the server; codes outside the table are preserved
//! verbatim in [`ApiError::Unknown`] for diagnostics.

use thiserror::Error;

/// A logical failure reported by the service in its response envelope.
///
/// One variant per documented status code. Classification is total over
/// the `u32` domain: every nonzero code maps to exactly one variant.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Code 1 — the verify/auth key was rejected.
    #[error("invalid auth key")]
    InvalidAuthKey,

    /// Code 2 — the target bot identity is not logged in on the server.
    #[error("the specified bot does not exist")]
    UnknownBot,

    /// Code 3 — the session key is invalid or has expired server-side.
    #[error("session is invalid or expired")]
    InvalidSession,

    /// Code 4 — the session exists but was never activated via bind.
    #[error("session is not activated")]
    SessionNotActivated,

    /// Code 5 — the message target (friend/group/member) does not exist.
    #[error("message target does not exist")]
    TargetNotFound,

    /// Code 6 — a referenced local file was not found (e.g. local image).
    #[error("referenced file not found")]
    FileNotFound,

    /// Code 10 — the bot lacks permission for the requested operation.
    #[error("bot has no permission for this operation")]
    PermissionDenied,

    /// Code 20 — the bot is muted and cannot send to the target group.
    #[error("bot is muted in the target group")]
    BotMuted,

    /// Code 30 — the message exceeds the server's length limit.
    #[error("message too long")]
    MessageTooLong,

    /// Code 400 — malformed request (bad parameters, wrong shape).
    #[error("malformed request")]
    BadRequest,

    /// Any other nonzero code, preserved for diagnostics.
    #[error("unknown api error (code {0})")]
    Unknown(u32),
}

impl ApiError {
    /// Classify a raw envelope code. `0` means success and yields `None`;
    /// every nonzero code yields `Some`.
    ///
    /// Pure and deterministic — no I/O, no side effects.
    pub fn from_code(code: u32) -> Option<ApiError> {
        match code {
            0 => None,
            1 => Some(ApiError::InvalidAuthKey),
            2 => Some(ApiError::UnknownBot),
            3 => Some(ApiError::InvalidSession),
            4 => Some(ApiError::SessionNotActivated),
            5 => Some(ApiError::TargetNotFound),
            6 => Some(ApiError::FileNotFound),
            10 => Some(ApiError::PermissionDenied),
            20 => Some(ApiError::BotMuted),
            30 => Some(ApiError::MessageTooLong),
            400 => Some(ApiError::BadRequest),
            other => Some(ApiError::Unknown(other)),
        }
    }

    /// The numeric code this error was classified from.
    pub fn code(&self) -> u32 {
        match self {
            ApiError::InvalidAuthKey => 1,
            ApiError::UnknownBot => 2,
            ApiError::InvalidSession => 3,
            ApiError::SessionNotActivated => 4,
            ApiError::TargetNotFound => 5,
            ApiError::FileNotFound => 6,
            ApiError::PermissionDenied => 10,
            ApiError::BotMuted => 20,
            ApiError::MessageTooLong => 30,
            ApiError::BadRequest => 400,
            ApiError::Unknown(code) => *code,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_success() {
        assert_eq!(ApiError::from_code(0), None);
    }

    #[test]
    fn test_table_codes_map_to_distinct_variants() {
        let cases = [
            (1, ApiError::InvalidAuthKey),
            (2, ApiError::UnknownBot),
            (3, ApiError::InvalidSession),
            (4, ApiError::SessionNotActivated),
            (5, ApiError::TargetNotFound),
            (6, ApiError::FileNotFound),
            (10, ApiError::PermissionDenied),
            (20, ApiError::BotMuted),
            (30, ApiError::MessageTooLong),
            (400, ApiError::BadRequest),
        ];
        for (code, expected) in cases {
            assert_eq!(ApiError::from_code(code), Some(expected));
        }
    }

    #[test]
    fn test_unmapped_code_preserved() {
        assert_eq!(ApiError::from_code(7), Some(ApiError::Unknown(7)));
        assert_eq!(ApiError::from_code(500), Some(ApiError::Unknown(500)));
        assert_eq!(
            ApiError::from_code(u32::MAX),
            Some(ApiError::Unknown(u32::MAX))
        );
    }

    #[test]
    fn test_code_round_trips() {
        for code in [1u32, 2, 3, 4, 5, 6, 10, 20, 30, 400, 7, 999] {
            let err = ApiError::from_code(code).unwrap();
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_display_mentions_unknown_code() {
        let err = ApiError::Unknown(1234);
        assert!(err.to_string().contains("1234"));
    }
}
