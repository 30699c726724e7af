//! mathrpc-server library crate.
//!
//! This crate implements the MathRPC connection handler: a WebSocket server
//! that owns each client connection for its lifetime, answering a sequence of
//! JSON request frames with exactly one JSON response frame each.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Client (JSON over WebSocket)
//!         ↕
//! [mathrpc-server]
//!   ├── domain/           Pure types: ServerConfig
//!   ├── application/      Dispatch: payload → Request → RpcCall → Response
//!   └── infrastructure/
//!         └── ws_server/  Accept loop + per-connection task (tokio-tungstenite)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain` and `mathrpc-core` only.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.
//!
//! # Connection-handling contract
//!
//! Within one connection, responses are emitted in the same order requests
//! were received: the handler reads a frame, dispatches it synchronously, and
//! writes the response before reading the next frame.  A malformed or invalid
//! request never terminates the connection: it produces a structured error
//! response and the loop continues.  Only a peer disconnect, the idle
//! timeout, or a transport failure ends a connection's task.

/// Domain layer: pure configuration types (no I/O).
pub mod domain;

/// Application layer: request dispatch logic.
pub mod application;

/// Infrastructure layer: WebSocket accept loop and per-connection tasks.
pub mod infrastructure;
