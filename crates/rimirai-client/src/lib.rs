//! Rimirai client — session lifecycle over the Mirai HTTP API.
//!
//! # Usage
//!
//! ```no_run
//! use rimirai_client::Client;
//!
//! # async fn run() -> Result<(), rimirai_client::ClientError> {
//! let client = Client::new("my-bot", "http://localhost:8080", "auth-key");
//! let session = client.verify().await?;
//! let bot = client.bind(123456789, &session).await?;
//! // ... bot operations ...
//! bot.release().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every call goes through one failure-routing pipeline: transport errors
//! first, then HTTP status, then the logical `code` the server embeds in
//! its JSON envelope. See [`ClientError`] for the full taxonomy.

pub mod bot;
pub mod client;
pub mod error;

// Re-export main types for convenience
pub use bot::Bot;
pub use client::{Client, FormField};
pub use error::ClientError;
pub use rimirai_core::{ApiEnvelope, ApiError};
