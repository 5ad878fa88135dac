//! A bound session — one authenticated, bot-bound handle.
//!
//! Created only by a successful [`Client::bind`]; holds the session key,
//! the bot identity, and the session's event inbox. A handle that outlives
//! its release keeps working locally but every remote call will come back
//! with a classified session error — the client cannot invalidate
//! outstanding handles.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use rimirai_core::EventInbox;

use crate::client::{Client, FormField};
use crate::error::ClientError;

/// An active session bound to one logged-in bot.
///
/// Cheap to clone; clones share the inbox and the owning client's
/// connection pool.
#[derive(Clone)]
pub struct Bot {
    qq: u64,
    session_key: String,
    /// Owning client, used for lookups and the request pipeline only.
    client: Client,
    inbox: Arc<EventInbox>,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("qq", &self.qq)
            .field("client", &self.client.name())
            .finish()
    }
}

impl Bot {
    pub(crate) fn new(client: Client, qq: u64, session_key: String, inbox: EventInbox) -> Self {
        Bot {
            qq,
            session_key,
            client,
            inbox: Arc::new(inbox),
        }
    }

    /// The bot identity this session is bound to.
    pub fn qq(&self) -> u64 {
        self.qq
    }

    /// The session key this handle was bound with.
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// The session's bounded event inbox.
    pub fn inbox(&self) -> &Arc<EventInbox> {
        &self.inbox
    }

    /// Release this session on the server and drop it from the owning
    /// client's registry. Consumes the handle.
    ///
    /// See [`Client::release`] for the stale-session caveats.
    pub async fn release(self) -> Result<(), ClientError> {
        self.client.release(self.qq).await
    }

    /// Upload an image for later sending, via multipart POST
    /// `/uploadImage`.
    ///
    /// `kind` is the upload target type the server expects (`"friend"`,
    /// `"group"` or `"temp"`). Returns the `data` payload of the response
    /// envelope (image id and URL).
    pub async fn upload_image(
        &self,
        kind: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, ClientError> {
        debug!(qq = self.qq, kind, size = bytes.len(), "uploading image");
        let fields = vec![
            FormField::text("sessionKey", self.session_key.clone()),
            FormField::text("type", kind),
            FormField::file("img", filename, bytes),
        ];
        let envelope = self.client.post_multipart("/uploadImage", fields).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
