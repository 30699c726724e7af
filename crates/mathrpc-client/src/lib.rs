//! mathrpc-client library crate.
//!
//! This crate implements the MathRPC client: a one-shot caller that opens a
//! WebSocket connection, sends exactly one JSON request, awaits exactly one
//! JSON response, and closes the connection.  Every call is a fresh
//! connection: there is no pooling, no reuse, and no retrying.
//!
//! # Architecture
//!
//! ```text
//! [mathrpc-client]
//!   ├── domain/           Pure types: ClientConfig
//!   └── infrastructure/
//!         └── rpc_client/ WebSocket call path (tokio-tungstenite) + ClientError
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `infrastructure` depends on `domain`, `mathrpc-core`, `tokio`, and
//!   `tungstenite`.
//!
//! # Error taxonomy
//!
//! The caller can always distinguish *how* a call failed:
//!
//! - transport faults (refused, reset, closed early, timed out): the server
//!   never answered;
//! - remote-reported business errors ([`ClientError::Remote`]): the server
//!   answered with `{"status":"error",...}` and the message text says why.

/// Domain layer: pure configuration types (no I/O).
pub mod domain;

/// Infrastructure layer: the WebSocket call path.
pub mod infrastructure;

// Re-export the public surface at the crate root so callers can write
// `mathrpc_client::RpcClient` directly.
pub use domain::ClientConfig;
pub use infrastructure::rpc_client::{ClientError, RpcClient};
