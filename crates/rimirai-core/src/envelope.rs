//! The response envelope — the decoded shape of every JSON body the
//! service returns.
//!
//! Every call comes back as `{"code": int, "msg": ..., "session": ...,
//! "data": ...}` with fields present or absent per endpoint. The `code`
//! field is authoritative over the HTTP status: a 200 response with a
//! nonzero `code` is a logical failure, and that is the common failure
//! mode for this API family.

use serde::Deserialize;
use serde_json::Value;

/// Decoded response envelope.
///
/// A missing `code` field means success — some meta endpoints (e.g.
/// `/about` on older plugin versions) omit it entirely.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiEnvelope {
    /// Logical status code; 0 (or absent) is success.
    #[serde(default)]
    pub code: u32,
    /// Human-readable status message, when the server sends one.
    #[serde(default)]
    pub msg: Option<String>,
    /// Session key — only present on `/verify` responses.
    #[serde(default)]
    pub session: Option<String>,
    /// Endpoint-specific payload.
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Parse an envelope from a raw response body.
    pub fn parse(body: &str) -> Result<ApiEnvelope, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Whether the envelope reports logical success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Extract a string field from the `data` payload by key.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_envelope() {
        let env = ApiEnvelope::parse(r#"{"code":0,"msg":"ok","session":"abc123"}"#).unwrap();
        assert!(env.is_success());
        assert_eq!(env.msg.as_deref(), Some("ok"));
        assert_eq!(env.session.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_code_defaults_to_success() {
        let env = ApiEnvelope::parse(r#"{"data":{"version":"2.0"}}"#).unwrap();
        assert!(env.is_success());
        assert_eq!(env.data_str("version"), Some("2.0"));
    }

    #[test]
    fn test_nonzero_code() {
        let env = ApiEnvelope::parse(r#"{"code":2}"#).unwrap();
        assert!(!env.is_success());
        assert_eq!(env.code, 2);
    }

    #[test]
    fn test_data_str_absent() {
        let env = ApiEnvelope::parse(r#"{"code":0}"#).unwrap();
        assert_eq!(env.data_str("version"), None);
    }

    #[test]
    fn test_garbage_body_is_an_error() {
        assert!(ApiEnvelope::parse("<html>502 Bad Gateway</html>").is_err());
    }
}
