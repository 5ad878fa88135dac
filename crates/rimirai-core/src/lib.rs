//! Rimirai core — transport-free building blocks for the Mirai HTTP API
//! client.
//!
//! This crate has no HTTP dependency. It provides:
//! - [`error::ApiError`] — the server status-code → semantic error table
//! - [`envelope::ApiEnvelope`] — the decoded JSON response envelope
//! - [`inbox::EventInbox`] — bounded, periodically-flushed event buffer
//!   owned by each bound session

pub mod envelope;
pub mod error;
pub mod inbox;

// Re-export main types for convenience
pub use envelope::ApiEnvelope;
pub use error::ApiError;
pub use inbox::{EventInbox, InboundEvent, DEFAULT_CAPACITY, DEFAULT_FLUSH_INTERVAL};
