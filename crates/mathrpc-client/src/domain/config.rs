//! Client configuration types.
//!
//! [`ClientConfig`] carries the endpoint and the two explicit timeouts the
//! client enforces.  The reference design left timeouts to the transport's
//! OS defaults; that is not a reproducible contract, so both are explicit
//! and configurable here.

use std::time::Duration;

/// All runtime configuration for the MathRPC client.
///
/// # Example
///
/// ```rust
/// use mathrpc_client::domain::ClientConfig;
///
/// let cfg = ClientConfig::default();
/// assert_eq!(cfg.endpoint, "ws://127.0.0.1:8765");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint URI of the server, e.g. `ws://127.0.0.1:8765`.
    pub endpoint: String,

    /// Maximum time to wait for the connection to be fully established,
    /// including the WebSocket upgrade handshake.
    pub connect_timeout: Duration,

    /// Maximum time to wait for the response after the request was sent.
    pub response_timeout: Duration,
}

impl ClientConfig {
    /// Builds a config pointing at `ws://{host}:{port}` with default timeouts.
    pub fn for_host_port(host: &str, port: u16) -> Self {
        Self {
            endpoint: format!("ws://{host}:{port}"),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    /// Returns a `ClientConfig` suitable for local development.
    ///
    /// | Field            | Default               |
    /// |------------------|-----------------------|
    /// | endpoint         | `ws://127.0.0.1:8765` |
    /// | connect_timeout  | 10 seconds            |
    /// | response_timeout | 30 seconds            |
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:8765".to_string(),
            connect_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(30),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
