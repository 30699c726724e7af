//! # mathrpc-core
//!
//! Shared library for MathRPC containing the JSON wire protocol types and
//! request validation logic.
//!
//! This crate is used by both the server and client applications.
//! It has zero dependencies on sockets, async runtimes, or I/O of any kind;
//! everything here is pure data transformation, which keeps it trivially
//! unit-testable.
//!
//! # Protocol overview
//!
//! MathRPC is a minimal request/response protocol carried as JSON text frames
//! over a persistent WebSocket connection:
//!
//! ```text
//! Client → Server:  {"action": "add", "params": {"a": 10, "b": 20}}
//! Server → Client:  {"status": "success", "result": 30.0, "code": 200}
//!            or:    {"status": "error", "message": "...", "code": 400}
//! ```
//!
//! Each request produces exactly one response on the same connection, in
//! order.  There is no pipelining and no request identifier: a connection
//! carries at most one outstanding request at a time.
//!
//! This crate defines:
//!
//! - **`protocol::messages`** – The untyped wire envelope ([`Request`]) and
//!   the response type ([`Response`]) with its informational status codes.
//! - **`protocol::call`** – The closed set of supported operations
//!   ([`RpcCall`]) and the validation that turns a raw [`Request`] into one,
//!   rejecting shape and type errors at the protocol boundary.

pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `mathrpc_core::Request` instead of `mathrpc_core::protocol::messages::Request`.
pub use protocol::call::{DispatchError, RpcCall};
pub use protocol::messages::{status, Request, Response};
