//! MathRPC client: demonstration entry point.
//!
//! Performs a handful of remote `add` calls against a running MathRPC server
//! and prints each result.  Every call opens its own connection, sends one
//! request, awaits the one response, and closes, exercising the full
//! one-shot call path end to end.
//!
//! # Usage
//!
//! ```text
//! mathrpc-client [OPTIONS]
//!
//! Options:
//!   --host <HOST>   Server hostname or IP [default: 127.0.0.1]
//!   --port <PORT>   Server port [default: 8765]
//! ```
//!
//! Environment variable overrides: `MATHRPC_SERVER_HOST`,
//! `MATHRPC_SERVER_PORT`.  Log verbosity is controlled by `RUST_LOG`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mathrpc_client::{ClientConfig, RpcClient};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// MathRPC demonstration client.
///
/// Calls the remote `add` operation a few times with different operands and
/// prints the results.
#[derive(Debug, Parser)]
#[command(
    name = "mathrpc-client",
    about = "One-shot JSON-over-WebSocket RPC demonstration client",
    version
)]
struct Cli {
    /// Hostname or IP address of the MathRPC server.
    #[arg(long, default_value = "127.0.0.1", env = "MATHRPC_SERVER_HOST")]
    host: String,

    /// Port of the MathRPC server.
    #[arg(long, default_value_t = 8765, env = "MATHRPC_SERVER_PORT")]
    port: u16,
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Calls `add` for a fixed set of operand pairs, printing each outcome.
///
/// A failed call does not abort the demonstration: the remaining calls
/// still run, so a partially working setup is still informative.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let client = RpcClient::new(ClientConfig::for_host_port(&cli.host, cli.port));

    // Standard addition, floating point, and negative operands.
    let cases = [(10.0, 20.0), (5.5, 2.5), (-100.0, 100.0)];

    for (a, b) in cases {
        match client.call_add(a, b).await {
            Ok(result) => println!("Result of {a} + {b} = {result}"),
            Err(e) => eprintln!("add({a}, {b}) failed: {e}"),
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
