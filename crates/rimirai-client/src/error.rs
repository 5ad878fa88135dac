//! Client failure taxonomy.
//!
//! Every I/O operation returns one of these; the crate never panics on a
//! failed call and never retries internally — retry policy belongs to the
//! caller, since the server gives no idempotency guarantees for bind or
//! release.
//!
//! The variants mirror the three-tier routing of the request pipeline:
//! transport failure first, then HTTP status, then the envelope's logical
//! code. `NotFound` is the one purely local failure.

use reqwest::StatusCode;
use rimirai_core::ApiError;
use thiserror::Error;

/// Everything that can go wrong on a client call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (connect, DNS, timeout). Surfaced before the
    /// response body is ever inspected.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP response. The raw body is retained for diagnostics;
    /// its `code` field, if any, is deliberately not consulted.
    #[error("http {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// Logical failure reported by the service envelope, classified per
    /// the fixed code table, with the raw body for debugging.
    #[error("{source} (body: {body})")]
    Api {
        #[source]
        source: ApiError,
        body: String,
    },

    /// A 2xx response whose body could not be decoded as an envelope.
    #[error("malformed response envelope: {0}")]
    Protocol(String),

    /// No active session is registered for this bot identity.
    #[error("no active session for bot {qq}")]
    NotFound { qq: u64 },
}

impl ClientError {
    /// The classified API error, if this is a logical service failure.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_accessor() {
        let err = ClientError::Api {
            source: ApiError::UnknownBot,
            body: r#"{"code":2}"#.to_string(),
        };
        assert_eq!(err.api_error(), Some(&ApiError::UnknownBot));
        assert!(err.to_string().contains("does not exist"));

        let err = ClientError::NotFound { qq: 42 };
        assert_eq!(err.api_error(), None);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_http_error_carries_body() {
        let err = ClientError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "upstream exploded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("upstream exploded"));
    }
}
