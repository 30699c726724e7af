//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or
//! from sensible defaults (useful for local development and tests).
//!
//! # Design rationale
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the domain) makes the server easy to embed in tests:
//! an end-to-end test builds a `ServerConfig` with port 0 and gets a private
//! listener on an ephemeral port.  The surrounding CLI layer is responsible
//! for populating the struct from arguments or environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// All runtime configuration for the MathRPC server.
///
/// Build this struct once at startup and hand it to
/// [`RpcServer::bind`](crate::infrastructure::ws_server::RpcServer::bind);
/// the server wraps it in an `Arc` so every connection task shares it
/// cheaply.
///
/// # Example
///
/// ```rust
/// use mathrpc_server::domain::ServerConfig;
///
/// // Defaults are suitable for local development:
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8765);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// The default is loopback-only; bind `0.0.0.0` to accept connections
    /// from other machines.  Port 0 requests an ephemeral port from the OS,
    /// which tests use to avoid collisions.
    pub bind_addr: SocketAddr,

    /// How often to send a WebSocket protocol-level Ping on each idle
    /// connection.
    ///
    /// This is the keep-alive probe: a conforming peer answers with a Pong,
    /// which also counts as traffic for the idle timeout below, so a live
    /// but quiet connection is never reaped.
    pub ping_interval: Duration,

    /// How long a connection may go without any inbound frame before the
    /// server closes it.
    ///
    /// This replaces the reference design's reliance on implicit OS
    /// transport defaults with an explicit, configurable contract.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    /// Returns a `ServerConfig` suitable for local development without any
    /// external configuration.
    ///
    /// | Field          | Default           |
    /// |----------------|-------------------|
    /// | bind_addr      | `127.0.0.1:8765`  |
    /// | ping_interval  | 20 seconds        |
    /// | idle_timeout   | 30 seconds        |
    fn default() -> Self {
        Self {
            // Safe to unwrap: a compile-time-known valid socket address string.
            bind_addr: "127.0.0.1:8765".parse().unwrap(),
            ping_interval: Duration::from_secs(20),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
