//! Infrastructure layer for mathrpc-client.
//!
//! Handles the WebSocket call path: connecting, sending the request frame,
//! awaiting the response frame, and closing.

pub mod rpc_client;

pub use rpc_client::{ClientError, RpcClient};
