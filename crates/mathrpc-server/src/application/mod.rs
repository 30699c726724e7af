//! Application layer for mathrpc-server.
//!
//! The application layer holds the request dispatch pipeline: everything
//! between "a frame payload arrived" and "here is the response to write
//! back".  It performs no I/O and never suspends, which is what guarantees
//! the one-request-one-response-in-order invariant per connection.
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or listening for connections (that is infrastructure)
//! - Tokio task spawning (that happens in the infrastructure layer)
//! - WebSocket framing (handled by tokio-tungstenite)

pub mod dispatch;

// Re-export so callers can write `application::dispatch_text` directly.
pub use dispatch::{dispatch_bytes, dispatch_text};
