//! WebSocket server: accept loop and per-connection task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections from clients.
//! 3. Upgrading each connection to a WebSocket session.
//! 4. Running the per-connection loop: read a frame, dispatch it, write the
//!    response back on the same connection, strictly one response per
//!    request, in arrival order.
//! 5. Sending keep-alive pings and enforcing the idle timeout.
//! 6. Gracefully shutting down when the `running` flag is cleared.
//!
//! # Concurrency model
//!
//! Each connection runs in its own Tokio task, and each task owns its
//! connection exclusively: there is no shared mutable state across
//! connections, so no locking is needed.  Within a task, dispatch is
//! synchronous (it never suspends), so responses cannot reorder.  The accept
//! loop never blocks on a session: it accepts a connection and immediately
//! spawns a task for it before accepting the next one.
//!
//! # Error policy
//!
//! A request-level failure (bad JSON, unknown action, bad params) produces an
//! error *response*; the connection stays open for further requests.  Only a
//! peer disconnect, a transport error, or the idle timeout ends a connection
//! task, and a peer disconnect is logged as a normal event, not an error.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, sleep, timeout, Instant};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    WebSocketStream,
};
use tracing::{debug, info, warn};

use mathrpc_core::Response;

use crate::application::dispatch_bytes;
use crate::domain::config::ServerConfig;

// ── Public API ────────────────────────────────────────────────────────────────

/// A bound MathRPC server, ready to serve.
///
/// Binding and serving are split so that callers (tests in particular) can
/// bind port 0, read the ephemeral port back with [`RpcServer::local_addr`],
/// and only then start the accept loop.
pub struct RpcServer {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl RpcServer {
    /// Binds the TCP listener on `config.bind_addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound (e.g., the port is
    /// already in use or the process lacks permission to bind).
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind listener on {}", config.bind_addr))?;

        info!("MathRPC server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    /// The address the listener actually bound (resolves port 0).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read listener local address")
    }

    /// Runs the accept loop until `running` is set to `false`.
    ///
    /// Each accepted connection is handed off to a dedicated Tokio task so
    /// that one slow client never blocks others.
    pub async fn serve(self, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        loop {
            // Check the shutdown flag before each accept attempt.
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            // Use a short timeout on `accept()` so the loop can periodically
            // check the `running` flag even when no clients are connecting.
            let accept_result = timeout(Duration::from_millis(200), self.listener.accept()).await;

            match accept_result {
                Ok(Ok((stream, peer_addr))) => {
                    info!("new connection from {peer_addr}");
                    let cfg = Arc::clone(&self.config);

                    tokio::spawn(async move {
                        handle_connection(stream, peer_addr, cfg).await;
                    });
                }
                Ok(Err(e)) => {
                    // Transient accept error (e.g., too many open file
                    // descriptors).  Log it and continue rather than crashing
                    // the whole server.
                    warn!("accept error: {e}");
                }
                Err(_) => {
                    // Timeout: no new connection in the last 200 ms.
                    // Loop back to check the `running` flag.
                }
            }
        }

        Ok(())
    }
}

/// Binds and serves in one call; the entry point used by `main.rs`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound.
pub async fn run_server(config: ServerConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    RpcServer::bind(config).await?.serve(running).await
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Top-level handler for a single client connection.
///
/// Wraps [`run_connection`] and logs the outcome.  Using a separate
/// outer/inner function pair lets us use `?` for clean error propagation
/// inside `run_connection` while logging errors in this outer function.
async fn handle_connection(raw_stream: TcpStream, peer_addr: SocketAddr, config: Arc<ServerConfig>) {
    match run_connection(raw_stream, peer_addr, config).await {
        Ok(()) => info!("session {peer_addr} closed"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of a single client connection.
///
/// 1. Completes the WebSocket upgrade handshake.
/// 2. Loops over: inbound frame / keep-alive tick / idle deadline.
/// 3. For each data frame, dispatches the payload and writes the response
///    back before reading the next frame.
///
/// # Errors
///
/// Returns an error if the WebSocket handshake fails or a response cannot be
/// serialized.  Peer disconnects are a normal return, not an error.
async fn run_connection(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<ServerConfig>,
) -> anyhow::Result<()> {
    // `accept_async` reads the client's HTTP Upgrade request and sends the
    // "101 Switching Protocols" response.  After this, `ws_stream` speaks
    // WebSocket frames instead of raw HTTP.
    let mut ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    info!("client connected: {peer_addr}");

    // Keep-alive ticker.  The first `tick()` resolves immediately (at t=0),
    // so it is consumed here to avoid pinging a connection that just opened.
    let mut ticker = interval(config.ping_interval);
    ticker.tick().await;

    // Idle deadline: reset on every inbound frame (pongs included).  If it
    // fires, the connection has been silent for the whole window and is
    // closed server-side.
    let idle = sleep(config.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            maybe_msg = ws_stream.next() => {
                let msg = match maybe_msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                        info!("client disconnected: {peer_addr}");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("session {peer_addr}: transport error: {e}");
                        break;
                    }
                    None => {
                        info!("client disconnected: {peer_addr}");
                        break;
                    }
                };

                idle.as_mut().reset(Instant::now() + config.idle_timeout);

                let payload: Vec<u8> = match msg {
                    WsMessage::Text(text) => text.into_bytes(),
                    // The original message loop treated text and bytes
                    // payloads identically, so binary frames carrying JSON
                    // are accepted too.
                    WsMessage::Binary(bytes) => bytes,

                    WsMessage::Ping(data) => {
                        // Protocol-level ping; tokio-tungstenite queues the
                        // Pong reply automatically when writing to the sink.
                        debug!("session {peer_addr}: ping ({} bytes)", data.len());
                        continue;
                    }
                    WsMessage::Pong(_) => {
                        debug!("session {peer_addr}: pong received");
                        continue;
                    }
                    WsMessage::Close(_) => {
                        info!("client disconnected: {peer_addr}");
                        break;
                    }
                    WsMessage::Frame(_) => {
                        debug!("session {peer_addr}: raw frame (ignored)");
                        continue;
                    }
                };

                info!(
                    "session {peer_addr}: request: {}",
                    payload_preview(&payload)
                );

                // Dispatch is synchronous and catches its own panics; it
                // always yields exactly one response for this frame.
                let response = dispatch_bytes(&payload);

                match &response {
                    Response::Success { result, .. } => {
                        info!("session {peer_addr}: result: {result}");
                    }
                    Response::Error { message, .. } => {
                        warn!("session {peer_addr}: error response: {message}");
                    }
                }

                let json = serde_json::to_string(&response)
                    .context("failed to serialize response")?;

                // Write the response before processing the next frame;
                // this is what keeps responses in request order.
                if let Err(e) = ws_stream.send(WsMessage::Text(json)).await {
                    debug!("session {peer_addr}: send failed (client disconnected): {e}");
                    break;
                }
            }

            _ = ticker.tick() => {
                if let Err(e) = ws_stream.send(WsMessage::Ping(Vec::new())).await {
                    debug!("session {peer_addr}: keep-alive ping failed: {e}");
                    break;
                }
                debug!("session {peer_addr}: sent keep-alive ping");
            }

            _ = &mut idle => {
                info!(
                    "session {peer_addr}: idle for {:?}, closing connection",
                    config.idle_timeout
                );
                close_quietly(&mut ws_stream).await;
                break;
            }
        }
    }

    Ok(())
}

/// Sends a Close frame, ignoring failures; the peer may already be gone.
async fn close_quietly(ws_stream: &mut WebSocketStream<TcpStream>) {
    if let Err(e) = ws_stream.close(None).await {
        debug!("close failed: {e}");
    }
}

// ── Helper ────────────────────────────────────────────────────────────────────

/// Renders a frame payload for log output: lossy UTF-8, truncated.
///
/// Request payloads are client-controlled, so logging them verbatim could
/// flood the log with a single oversized frame.
fn payload_preview(payload: &[u8]) -> String {
    const MAX: usize = 256;
    let text = String::from_utf8_lossy(payload);
    if text.len() <= MAX {
        text.into_owned()
    } else {
        // Truncate on a character boundary; lossy decoding may have produced
        // multi-byte replacement characters.
        let truncated: String = text.chars().take(MAX).collect();
        format!("{truncated}… ({} bytes)", payload.len())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
