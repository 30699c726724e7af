//! The WebSocket call path: one connection, one request, one response.
//!
//! [`RpcClient`] performs a synchronous-from-the-caller's-perspective remote
//! call.  Each invocation:
//!
//! 1. Opens a fresh WebSocket connection to the configured endpoint
//!    (bounded by `connect_timeout`; establishment includes the upgrade
//!    handshake).
//! 2. Sends the request as one JSON text frame.
//! 3. Suspends until exactly one data frame arrives (bounded by
//!    `response_timeout`; control frames are skipped).
//! 4. Interprets the response: success → the numeric result, error → a
//!    [`ClientError::Remote`] carrying the server's message.
//! 5. Closes the connection on every path, including failures.
//!
//! The only suspension points are connect, send, and receive; response
//! interpretation is synchronous.  The client never retries and never reuses
//! a connection.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info};

use mathrpc_core::{Request, Response};

use crate::domain::config::ClientConfig;

/// The stream type produced by `connect_async` for a `ws://` endpoint.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur during a remote call.
///
/// Transport-level failures (the server never answered) are distinct from
/// [`ClientError::Remote`], the remote-reported business error (the server
/// answered, but with `{"status":"error",...}`).  Use
/// [`ClientError::is_transport`] to tell the two classes apart without
/// matching every variant.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The WebSocket connection could not be established.
    ///
    /// Covers connection refused, address resolution failure, and a failed
    /// upgrade handshake.
    #[error("failed to connect to {endpoint}: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: WsError,
    },

    /// An I/O or framing error occurred on the established connection.
    #[error("connection error: {0}")]
    Connection(#[from] WsError),

    /// The connection was closed before a response arrived.
    #[error("connection closed before a response arrived")]
    Closed,

    /// A configured deadline elapsed.
    #[error("timed out after {timeout:?} waiting for {phase}")]
    Timeout {
        phase: &'static str,
        timeout: Duration,
    },

    /// The server's reply could not be understood as a protocol response.
    #[error("malformed response from server: {0}")]
    Protocol(String),

    /// The server answered with an error response.
    ///
    /// `message` is the server's own text, e.g. `Unknown action: 'multiply'`.
    #[error("server reported error: {message}")]
    Remote { message: String },
}

impl ClientError {
    /// `true` for every transport-level failure; `false` when the server
    /// actually produced a reply (well-formed or not).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectFailed { .. }
                | ClientError::Connection(_)
                | ClientError::Closed
                | ClientError::Timeout { .. }
        )
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// A one-shot MathRPC caller.
///
/// Holds only configuration; all connection state is per-call.  Cloning is
/// cheap and the client can be shared freely; concurrent calls simply open
/// independent connections.
#[derive(Debug, Clone)]
pub struct RpcClient {
    config: ClientConfig,
}

impl RpcClient {
    /// Creates a client for the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// The endpoint this client calls.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Calls the remote `add` operation and returns `a + b` as computed by
    /// the server.
    ///
    /// # Errors
    ///
    /// - Transport faults ([`ClientError::ConnectFailed`],
    ///   [`ClientError::Connection`], [`ClientError::Closed`],
    ///   [`ClientError::Timeout`]) when the server never answered.
    /// - [`ClientError::Remote`] when the server answered with an error
    ///   response; the variant carries the server's message text.
    /// - [`ClientError::Protocol`] when the reply was not a valid protocol
    ///   response.
    ///
    /// Every failure is logged before it is returned to the caller.
    pub async fn call_add(&self, a: f64, b: f64) -> Result<f64, ClientError> {
        let result = self.call_add_inner(a, b).await;
        if let Err(e) = &result {
            error!("add({a}, {b}) call to {} failed: {e}", self.config.endpoint);
        }
        result
    }

    async fn call_add_inner(&self, a: f64, b: f64) -> Result<f64, ClientError> {
        let request = Request::add(a, b);
        let payload = serde_json::to_string(&request)
            .map_err(|e| ClientError::Protocol(format!("failed to encode request: {e}")))?;

        info!("sending request to {}: {payload}", self.config.endpoint);

        // Establish the connection, handshake included.  `connect_async`
        // resolves the address, opens the TCP stream, and completes the
        // WebSocket upgrade before returning.
        let (mut ws_stream, _handshake_response) =
            timeout(
                self.config.connect_timeout,
                connect_async(self.config.endpoint.as_str()),
            )
                .await
                .map_err(|_| ClientError::Timeout {
                    phase: "connection",
                    timeout: self.config.connect_timeout,
                })?
                .map_err(|source| ClientError::ConnectFailed {
                    endpoint: self.config.endpoint.clone(),
                    source,
                })?;

        let outcome = self.exchange(&mut ws_stream, payload).await;

        // Close on every path, success or failure.  Best effort: the peer
        // may already be gone, and the stream is dropped either way.
        if let Err(e) = ws_stream.close(None).await {
            debug!("close failed: {e}");
        }

        outcome
    }

    /// Sends the request frame and awaits the one response frame.
    async fn exchange(&self, ws_stream: &mut WsStream, payload: String) -> Result<f64, ClientError> {
        ws_stream.send(WsMessage::Text(payload)).await?;

        let text = timeout(self.config.response_timeout, next_data_frame(ws_stream))
            .await
            .map_err(|_| ClientError::Timeout {
                phase: "response",
                timeout: self.config.response_timeout,
            })??;

        let response: Response = serde_json::from_str(&text)
            .map_err(|e| ClientError::Protocol(format!("{e} (payload: {text})")))?;

        response_to_result(response)
    }
}

/// Reads frames until a data frame (text or binary) arrives.
///
/// Control frames (ping/pong) are skipped; tokio-tungstenite answers pings
/// automatically when the stream is flushed.  A Close frame or end of stream
/// before any data frame is a transport fault: the call got no response.
async fn next_data_frame(ws_stream: &mut WsStream) -> Result<String, ClientError> {
    loop {
        match ws_stream.next().await {
            Some(Ok(WsMessage::Text(text))) => return Ok(text),
            Some(Ok(WsMessage::Binary(bytes))) => {
                return String::from_utf8(bytes)
                    .map_err(|e| ClientError::Protocol(format!("non-UTF-8 response: {e}")));
            }
            Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {
                debug!("skipping control frame while waiting for response");
            }
            Some(Ok(WsMessage::Close(_))) | None => return Err(ClientError::Closed),
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                return Err(ClientError::Closed)
            }
            Some(Err(e)) => return Err(ClientError::Connection(e)),
        }
    }
}

/// Interprets a wire response as the call's outcome.
fn response_to_result(response: Response) -> Result<f64, ClientError> {
    match response {
        Response::Success { result, .. } => Ok(result),
        // `message` defaults to "Unknown error" when the server omitted it.
        Response::Error { message, .. } => Err(ClientError::Remote { message }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
