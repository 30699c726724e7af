//! MathRPC server: entry point.
//!
//! This binary accepts WebSocket connections and answers JSON-encoded RPC
//! requests on them.  Each connection is persistent: a client may send any
//! number of sequential requests and receives exactly one response per
//! request, in order.
//!
//! # Usage
//!
//! ```text
//! mathrpc-server [OPTIONS]
//!
//! Options:
//!   --host <HOST>            Address to bind [default: 127.0.0.1]
//!   --port <PORT>            Port to listen on [default: 8765]
//!   --ping-interval <SECS>   Keep-alive ping interval in seconds [default: 20]
//!   --idle-timeout <SECS>    Per-connection idle timeout in seconds [default: 30]
//! ```
//!
//! # Environment variable overrides
//!
//! The CLI defaults can also be overridden with environment variables.
//! CLI args take precedence when both are present.
//!
//! | Variable                 | Default     | Description                      |
//! |--------------------------|-------------|----------------------------------|
//! | `MATHRPC_HOST`           | `127.0.0.1` | Bind address                     |
//! | `MATHRPC_PORT`           | `8765`      | Listener port                    |
//! | `MATHRPC_PING_INTERVAL`  | `20`        | Keep-alive ping interval (secs)  |
//! | `MATHRPC_IDLE_TIMEOUT`   | `30`        | Per-connection idle timeout (secs)|
//!
//! Log verbosity is controlled by `RUST_LOG` (e.g., `RUST_LOG=debug`).

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mathrpc_server::domain::ServerConfig;
use mathrpc_server::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// MathRPC server.
///
/// Accepts WebSocket connections and answers JSON-encoded RPC requests
/// (`{"action":"add","params":{"a":…,"b":…}}`) with JSON responses.
#[derive(Debug, Parser)]
#[command(
    name = "mathrpc-server",
    about = "Persistent-connection JSON-over-WebSocket RPC server",
    version
)]
struct Cli {
    /// IP address to bind the WebSocket listener to.
    ///
    /// Use `0.0.0.0` to accept connections from any network interface, or
    /// `127.0.0.1` to accept only local connections.
    #[arg(long, default_value = "127.0.0.1", env = "MATHRPC_HOST")]
    host: String,

    /// TCP port for the WebSocket listener.
    #[arg(long, default_value_t = 8765, env = "MATHRPC_PORT")]
    port: u16,

    /// Keep-alive ping interval in seconds.
    ///
    /// A WebSocket Ping is sent on each connection every this many seconds;
    /// the peer's Pong counts as traffic for the idle timeout.
    #[arg(long, default_value_t = 20, env = "MATHRPC_PING_INTERVAL")]
    ping_interval: u64,

    /// Per-connection idle timeout in seconds.
    ///
    /// A connection that produces no inbound frame for this long is closed.
    #[arg(long, default_value_t = 30, env = "MATHRPC_IDLE_TIMEOUT")]
    idle_timeout: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--host` is not a valid IP address.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let bind_addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address: '{}:{}'", self.host, self.port))?;

        Ok(ServerConfig {
            bind_addr,
            ping_interval: Duration::from_secs(self.ping_interval),
            idle_timeout: Duration::from_secs(self.idle_timeout),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. `tracing_subscriber` is initialised; the log level is controlled by
///    the `RUST_LOG` environment variable (default `info`).
/// 2. CLI arguments are parsed with `clap` into a [`Cli`] struct.
/// 3. A [`ServerConfig`] is constructed from the CLI arguments.
/// 4. A Ctrl+C handler is spawned; it clears a shared `AtomicBool` when the
///    user interrupts the process.
/// 5. [`run_server`] binds the listener and accepts connections until the
///    shutdown flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_server_config()?;

    info!(
        "MathRPC server starting: bind={}, ping-interval={:?}, idle-timeout={:?}",
        config.bind_addr, config.ping_interval, config.idle_timeout
    );

    // Graceful shutdown flag, cleared by the Ctrl+C handler below.  The
    // accept loop polls this flag every 200 ms and exits cleanly.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("MathRPC server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
