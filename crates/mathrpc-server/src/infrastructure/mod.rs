//! Infrastructure layer for mathrpc-server.
//!
//! The infrastructure layer handles all I/O:
//!
//! - Binding the TCP listener for client WebSocket connections
//! - Performing the WebSocket HTTP upgrade handshake
//! - Running the per-connection read/dispatch/write loop
//! - Keep-alive pings and the idle timeout
//! - Spawning per-connection Tokio tasks
//! - Handling the graceful shutdown signal
//!
//! # What does NOT belong here?
//!
//! - Request dispatch logic (that is the application layer)
//! - Wire message definitions (those live in `mathrpc-core`)
//! - Configuration parsing (that is done in `main.rs`)

pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use ws_server::{run_server, RpcServer};
