//! End-to-end tests for the full client ↔ server call path.
//!
//! # Purpose
//!
//! These tests run a real `mathrpc-server` on an ephemeral port (bind
//! address `127.0.0.1:0`) and exercise it two ways:
//!
//! - Through [`RpcClient`], the way an application calls it.
//! - Through a raw tokio-tungstenite connection, for scenarios the one-shot
//!   client cannot produce: unknown actions, malformed JSON, and multiple
//!   sequential requests on one persistent connection.
//!
//! They verify the protocol invariants end to end:
//!
//! - Every request gets exactly one response, in order.
//! - A malformed or invalid request never costs the client its connection.
//! - Transport faults and remote-reported errors surface as distinct
//!   [`ClientError`] kinds.

use std::net::SocketAddr;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use mathrpc_client::{ClientConfig, ClientError, RpcClient};
use mathrpc_server::domain::ServerConfig;
use mathrpc_server::infrastructure::RpcServer;

// ── Test scaffolding ──────────────────────────────────────────────────────────

/// Starts a server on an ephemeral port and returns its address.
///
/// The serving task runs until the test process exits; each test gets its
/// own listener, so tests never collide on a port.
async fn start_server(config: ServerConfig) -> SocketAddr {
    let server = RpcServer::bind(config).await.expect("bind test server");
    let addr = server.local_addr().expect("read bound address");

    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn(async move {
        server.serve(running).await.expect("serve");
    });

    addr
}

/// Starts a server with default settings on an ephemeral port.
async fn start_default_server() -> SocketAddr {
    start_server(ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ..ServerConfig::default()
    })
    .await
}

/// Builds a client pointing at the given test server.
fn client_for(addr: SocketAddr) -> RpcClient {
    RpcClient::new(ClientConfig::for_host_port("127.0.0.1", addr.port()))
}

/// Opens a raw WebSocket connection to the given test server.
async fn raw_connect(
    addr: SocketAddr,
) -> tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("raw connect");
    ws_stream
}

/// Sends one text frame and returns the next text response as JSON.
async fn roundtrip(
    ws_stream: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    payload: &str,
) -> serde_json::Value {
    ws_stream
        .send(WsMessage::Text(payload.to_string()))
        .await
        .expect("send");

    loop {
        match ws_stream.next().await.expect("stream ended").expect("recv") {
            WsMessage::Text(text) => return serde_json::from_str(&text).expect("response JSON"),
            // Keep-alive pings may interleave; skip anything that is not data.
            _ => continue,
        }
    }
}

// ── Client call path ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_call_add_integers() {
    let addr = start_default_server().await;
    let result = client_for(addr).call_add(10.0, 20.0).await.unwrap();
    assert_eq!(result, 30.0);
}

#[tokio::test]
async fn test_call_add_floats() {
    let addr = start_default_server().await;
    let result = client_for(addr).call_add(5.5, 2.5).await.unwrap();
    assert_eq!(result, 8.0);
}

#[tokio::test]
async fn test_call_add_negative_operands() {
    let addr = start_default_server().await;
    let result = client_for(addr).call_add(-100.0, 100.0).await.unwrap();
    assert_eq!(result, 0.0);
}

#[tokio::test]
async fn test_each_call_opens_a_fresh_connection() {
    // Three sequential one-shot calls against the same server must all
    // succeed: no state leaks from one call's connection to the next.
    let addr = start_default_server().await;
    let client = client_for(addr);

    assert_eq!(client.call_add(1.0, 2.0).await.unwrap(), 3.0);
    assert_eq!(client.call_add(3.0, 4.0).await.unwrap(), 7.0);
    assert_eq!(client.call_add(-1.5, 0.5).await.unwrap(), -1.0);
}

#[tokio::test]
async fn test_connect_to_dead_port_is_a_transport_fault() {
    // Bind a listener and drop it immediately: the port is now closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr).call_add(1.0, 2.0).await.unwrap_err();

    assert!(err.is_transport(), "expected transport fault, got: {err}");
    assert!(matches!(err, ClientError::ConnectFailed { .. }));
}

#[tokio::test]
async fn test_remote_error_surfaces_as_remote_kind() {
    // A fake server that answers every request with an error response,
    // which the one-shot client cannot otherwise provoke with `add`.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws_stream = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
        // Swallow the request, answer with a canned error.
        let _ = ws_stream.next().await;
        ws_stream
            .send(WsMessage::Text(
                r#"{"status":"error","message":"maintenance window","code":500}"#.to_string(),
            ))
            .await
            .expect("send error response");
    });

    let err = client_for(addr).call_add(1.0, 2.0).await.unwrap_err();

    assert!(!err.is_transport());
    match err {
        ClientError::Remote { message } => assert_eq!(message, "maintenance window"),
        other => panic!("expected Remote, got {:?}", other),
    }
}

// ── Raw-connection protocol behavior ──────────────────────────────────────────

#[tokio::test]
async fn test_unknown_action_yields_structured_error() {
    let addr = start_default_server().await;
    let mut ws_stream = raw_connect(addr).await;

    let resp = roundtrip(&mut ws_stream, r#"{"action":"multiply","params":{}}"#).await;

    assert_eq!(resp["status"], "error");
    assert_eq!(resp["message"], "Unknown action: 'multiply'");
    assert_eq!(resp["code"], 404);
}

#[tokio::test]
async fn test_missing_params_error_keeps_connection_usable() {
    let addr = start_default_server().await;
    let mut ws_stream = raw_connect(addr).await;

    // First request is invalid: only `a` is supplied.
    let resp = roundtrip(&mut ws_stream, r#"{"action":"add","params":{"a":1}}"#).await;
    assert_eq!(resp["status"], "error");
    assert_eq!(resp["message"], "Missing required parameters 'a' or 'b'");

    // The same connection must still answer a valid request.
    let resp = roundtrip(&mut ws_stream, r#"{"action":"add","params":{"a":1,"b":2}}"#).await;
    assert_eq!(resp["status"], "success");
    assert_eq!(resp["result"], 3.0);
}

#[tokio::test]
async fn test_malformed_json_keeps_connection_usable() {
    let addr = start_default_server().await;
    let mut ws_stream = raw_connect(addr).await;

    let resp = roundtrip(&mut ws_stream, "this is not json").await;
    assert_eq!(resp["status"], "error");
    assert_eq!(resp["message"], "Invalid JSON format");
    assert_eq!(resp["code"], 400);

    let resp = roundtrip(&mut ws_stream, r#"{"action":"add","params":{"a":4,"b":6}}"#).await;
    assert_eq!(resp["result"], 10.0);
}

#[tokio::test]
async fn test_non_numeric_params_yield_structured_error() {
    let addr = start_default_server().await;
    let mut ws_stream = raw_connect(addr).await;

    let resp = roundtrip(
        &mut ws_stream,
        r#"{"action":"add","params":{"a":"ten","b":20}}"#,
    )
    .await;

    assert_eq!(resp["message"], "Parameters 'a' and 'b' must be numeric");
    assert_eq!(resp["code"], 400);
}

#[tokio::test]
async fn test_two_sequential_requests_answered_in_order() {
    let addr = start_default_server().await;
    let mut ws_stream = raw_connect(addr).await;

    // Send both requests before reading anything: the responses must come
    // back one per request, in request order.
    ws_stream
        .send(WsMessage::Text(
            r#"{"action":"add","params":{"a":1,"b":2}}"#.to_string(),
        ))
        .await
        .unwrap();
    ws_stream
        .send(WsMessage::Text(
            r#"{"action":"add","params":{"a":30,"b":40}}"#.to_string(),
        ))
        .await
        .unwrap();

    let mut results = Vec::new();
    while results.len() < 2 {
        if let WsMessage::Text(text) = ws_stream.next().await.unwrap().unwrap() {
            let resp: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(resp["status"], "success");
            results.push(resp["result"].as_f64().unwrap());
        }
    }

    assert_eq!(results, vec![3.0, 70.0]);
}

#[tokio::test]
async fn test_binary_frame_with_json_is_answered() {
    // The server accepts JSON in binary frames as well as text frames.
    let addr = start_default_server().await;
    let mut ws_stream = raw_connect(addr).await;

    ws_stream
        .send(WsMessage::Binary(
            br#"{"action":"add","params":{"a":7,"b":8}}"#.to_vec(),
        ))
        .await
        .unwrap();

    loop {
        if let WsMessage::Text(text) = ws_stream.next().await.unwrap().unwrap() {
            let resp: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(resp["result"], 15.0);
            break;
        }
    }
}

// ── Idle timeout ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_idle_connection_is_closed_by_server() {
    // A server with a very short idle window and a ping interval too long
    // to interfere: the quiet connection must be closed from the far side.
    let addr = start_server(ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ping_interval: Duration::from_secs(60),
        idle_timeout: Duration::from_millis(300),
    })
    .await;

    let mut ws_stream = raw_connect(addr).await;

    // Without sending anything, the next frame must be the server's Close
    // (or end of stream), well before the test's own deadline.
    let shutdown = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws_stream.next().await {
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(_)) => break,
            }
        }
    })
    .await;

    assert!(shutdown.is_ok(), "server did not close the idle connection");
}
