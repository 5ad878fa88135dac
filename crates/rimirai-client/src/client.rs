//! The session-manager client for the Mirai HTTP API.
//!
//! `Client` owns the connection configuration (base URL + auth key), the
//! shared request pipeline, and the registry of active bound sessions.
//! The intended call sequence is:
//!
//! ```text
//! Client::new → verify() → bind(qq, session) → bot ops → release(qq)
//! ```
//!
//! Every call is routed through the same three-tier failure check:
//! transport error first, then HTTP status, then the envelope's logical
//! `code`. A 200 response with a nonzero `code` is the common failure mode
//! for this API family, which is why the tiers must never be reordered.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info, trace, warn};

use rimirai_core::inbox::{DEFAULT_CAPACITY, DEFAULT_FLUSH_INTERVAL};
use rimirai_core::{ApiEnvelope, ApiError, EventInbox};

use crate::bot::Bot;
use crate::error::ClientError;

/// Default request timeout for the built-in transport.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────
// FormField
// ─────────────────────────────────────────────

/// One field of a multipart form: either plain text or a file part.
///
/// Resolved at the call site instead of inspecting value types at
/// runtime — file-bearing endpoints build a `Vec<FormField>` explicitly.
#[derive(Clone, Debug)]
pub enum FormField {
    /// A text form field.
    Text { name: String, value: String },
    /// A file part, sent under `name` with the given filename.
    File {
        name: String,
        filename: String,
        bytes: Vec<u8>,
    },
}

impl FormField {
    /// Create a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a file part.
    pub fn file(name: impl Into<String>, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        FormField::File {
            name: name.into(),
            filename: filename.into(),
            bytes,
        }
    }
}

/// Assemble a reqwest multipart form from tagged fields.
fn build_form(fields: Vec<FormField>) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File {
                name,
                filename,
                bytes,
            } => form.part(
                name,
                reqwest::multipart::Part::bytes(bytes).file_name(filename),
            ),
        };
    }
    form
}

// ─────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────

/// Client for one Mirai HTTP API endpoint.
///
/// Cheap to clone — clones share the connection pool and the session
/// registry. The registry maps bot identity → active session key, one
/// entry per identity, guarded by a `RwLock` so concurrent bind/release
/// from multiple tasks stays consistent.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Client name, attached to every log line.
    name: String,
    /// Base URL without trailing slash.
    base_url: String,
    /// Long-lived credential exchanged for sessions via `verify`.
    auth_key: String,
    /// HTTP client (shared, connection-pooled).
    http: reqwest::Client,
    /// Active sessions: bot identity → session key.
    sessions: RwLock<HashMap<u64, String>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.inner.name)
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl Client {
    /// Create a client with the built-in transport (30 s request timeout).
    ///
    /// No I/O happens here; the endpoint is contacted on the first call.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        auth_key: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self::with_http(name, base_url, auth_key, http)
    }

    /// Create a client with a caller-configured transport.
    ///
    /// Deadlines, proxies, and TLS settings live on the `reqwest::Client`;
    /// this crate adds no timeout or retry semantics of its own.
    pub fn with_http(
        name: impl Into<String>,
        base_url: impl Into<String>,
        auth_key: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Client {
            inner: Arc::new(ClientInner {
                name: name.into(),
                base_url,
                auth_key: auth_key.into(),
                http,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Client name given at construction.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The session key currently registered for a bot identity.
    pub fn session_for(&self, qq: u64) -> Option<String> {
        self.inner.sessions.read().unwrap().get(&qq).cloned()
    }

    /// Bot identities with an active registered session.
    pub fn active_bots(&self) -> Vec<u64> {
        self.inner.sessions.read().unwrap().keys().copied().collect()
    }

    // ── API-HTTP plugin meta ──

    /// Fetch the plugin version via GET `/about`.
    pub async fn about(&self) -> Result<String, ClientError> {
        let envelope = self.get("/about", &[]).await?;
        let version = envelope.data_str("version").ok_or_else(|| {
            ClientError::Protocol("missing data.version in /about response".to_string())
        })?;
        Ok(version.to_string())
    }

    // ── Session lifecycle ──

    /// Exchange the auth key for a new session key via POST `/verify`.
    ///
    /// The returned session is inactive until [`Client::bind`] ties it to
    /// a logged-in bot.
    pub async fn verify(&self) -> Result<String, ClientError> {
        let body = json!({ "verifyKey": self.inner.auth_key });
        let envelope = self.post("/verify", &body).await?;
        let session = envelope.session.ok_or_else(|| {
            ClientError::Protocol("missing session in /verify response".to_string())
        })?;
        info!(client = %self.inner.name, "session verified");
        Ok(session)
    }

    /// Activate a session for a bot identity via POST `/bind` and return
    /// the bound handle.
    ///
    /// The registry entry for `qq` is overwritten — last bind wins. The
    /// bot's inbox uses the default capacity (10) and flush interval (1 s);
    /// see [`Client::bind_with_inbox`] to tune them. On a classified
    /// failure nothing is registered.
    pub async fn bind(&self, qq: u64, session_key: &str) -> Result<Bot, ClientError> {
        self.bind_with_inbox(qq, session_key, DEFAULT_FLUSH_INTERVAL, DEFAULT_CAPACITY)
            .await
    }

    /// [`Client::bind`] with explicit inbox tuning.
    pub async fn bind_with_inbox(
        &self,
        qq: u64,
        session_key: &str,
        flush_interval: Duration,
        capacity: usize,
    ) -> Result<Bot, ClientError> {
        let body = json!({ "sessionKey": session_key, "qq": qq });
        self.post("/bind", &body).await?;

        {
            let mut sessions = self.inner.sessions.write().unwrap();
            sessions.insert(qq, session_key.to_string());
        }
        info!(client = %self.inner.name, qq, "session bound");

        Ok(Bot::new(
            self.clone(),
            qq,
            session_key.to_string(),
            EventInbox::new(flush_interval, capacity),
        ))
    }

    /// Release the session registered for a bot identity via POST
    /// `/release`, then drop it from the registry.
    ///
    /// Unused sessions must be released: the server keeps buffering the
    /// bot's received messages for an unreleased session. The server also
    /// auto-expires sessions idle for ~30 minutes — the client cannot
    /// observe that, so releasing a stale entry fails with a classified
    /// error (typically [`ApiError::InvalidSession`]); callers should
    /// treat that as non-fatal. Outstanding [`Bot`] handles are not
    /// invalidated; the caller must stop using them after release.
    pub async fn release(&self, qq: u64) -> Result<(), ClientError> {
        let session_key = self.session_for(qq).ok_or(ClientError::NotFound { qq })?;

        let body = json!({ "sessionKey": session_key, "qq": qq });
        self.post("/release", &body).await?;

        self.inner.sessions.write().unwrap().remove(&qq);
        info!(client = %self.inner.name, qq, "session released");
        Ok(())
    }

    // ── Request pipeline ──

    /// Build the full URL for an API path, normalizing slashes.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiEnvelope, ClientError> {
        trace!(client = %self.inner.name, path, "GET");
        let response = self
            .inner
            .http
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await?;
        self.read_envelope(path, response).await
    }

    pub(crate) async fn post(&self, path: &str, body: &Value) -> Result<ApiEnvelope, ClientError> {
        trace!(client = %self.inner.name, path, "POST");
        let response = self
            .inner
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;
        self.read_envelope(path, response).await
    }

    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        fields: Vec<FormField>,
    ) -> Result<ApiEnvelope, ClientError> {
        trace!(client = %self.inner.name, path, fields = fields.len(), "POST multipart");
        let response = self
            .inner
            .http
            .post(self.endpoint(path))
            .multipart(build_form(fields))
            .send()
            .await?;
        self.read_envelope(path, response).await
    }

    /// Shared tail of every request: HTTP status check, then envelope
    /// decode, then logical-code classification. A transport failure never
    /// reaches here — `send()` already surfaced it.
    async fn read_envelope(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(client = %self.inner.name, path, status = %status, "http error");
            return Err(ClientError::Http { status, body });
        }

        let envelope = ApiEnvelope::parse(&body)
            .map_err(|e| ClientError::Protocol(format!("{e} (body: {body})")))?;

        if let Some(api_error) = ApiError::from_code(envelope.code) {
            debug!(
                client = %self.inner.name,
                path,
                code = envelope.code,
                "api error"
            );
            return Err(ClientError::Api {
                source: api_error,
                body,
            });
        }

        Ok(envelope)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
