//! JSON wire message types for the MathRPC protocol.
//!
//! The protocol has exactly two message shapes: a request envelope sent by
//! the client and a response envelope sent by the server.  Both travel as
//! JSON text frames over a persistent WebSocket connection.
//!
//! # JSON discriminant
//!
//! Responses are a JSON object with a `"status"` field that identifies the
//! variant.  All other fields are flattened into the same object:
//!
//! ```json
//! {"status":"success","result":30.0,"code":200}
//! {"status":"error","message":"Invalid JSON format","code":400}
//! ```
//!
//! Serde's `#[serde(tag = "status")]` attribute handles this automatically.
//!
//! # Why is the request untyped?
//!
//! The request envelope keeps `params` as a raw JSON map on purpose: the
//! server must be able to *receive* any well-formed request (wrong types,
//! missing fields, unknown actions) and answer it with a structured error
//! response rather than a transport failure.  Typing happens one step later,
//! in [`crate::protocol::call::RpcCall::from_request`], once the action tag
//! is known.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Status classification ─────────────────────────────────────────────────────

/// Informational numeric status codes attached to responses.
///
/// These mirror the familiar HTTP taxonomy (ok / bad request / not found /
/// internal error) but are purely diagnostic: no component uses them for
/// control flow, and a peer that omits them entirely is still conformant.
pub mod status {
    /// The request was executed successfully.
    pub const OK: u16 = 200;
    /// The request was malformed: bad JSON, missing or non-numeric params.
    pub const BAD_REQUEST: u16 = 400;
    /// The request named an action the server does not support.
    pub const NOT_FOUND: u16 = 404;
    /// An unanticipated fault occurred while dispatching the request.
    pub const INTERNAL_ERROR: u16 = 500;
}

// ── Request envelope ──────────────────────────────────────────────────────────

/// A single RPC request as it appears on the wire.
///
/// ```json
/// {"action":"add","params":{"a":10,"b":20}}
/// ```
///
/// `action` selects the operation; `params` supplies its operands.  Both
/// fields tolerate absence: a request with no `action` is answered with an
/// unknown-action error, and a missing `params` defaults to the empty map so
/// parameter validation can report *which* operands are missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The string tag selecting which operation to execute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Operands for the operation, keyed by parameter name.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Request {
    /// Builds an `"add"` request for the given operands.
    ///
    /// This is the request shape the client sends for
    /// [`RpcCall::Add`](crate::protocol::call::RpcCall::Add).
    pub fn add(a: f64, b: f64) -> Self {
        let mut params = Map::new();
        params.insert("a".to_string(), Value::from(a));
        params.insert("b".to_string(), Value::from(b));
        Self {
            action: Some("add".to_string()),
            params,
        }
    }
}

// ── Response envelope ─────────────────────────────────────────────────────────

/// A single RPC response as it appears on the wire.
///
/// Exactly one response is produced per request, on the same connection.
/// The `"status"` field discriminates the two variants:
///
/// ```json
/// {"status":"success","result":8.0,"code":200}
/// {"status":"error","message":"Unknown action: 'multiply'","code":404}
/// ```
///
/// The numeric `code` is the optional informational classifier from
/// [`status`]; peers must accept responses without it.  An error response
/// missing the `message` field deserializes with the fallback text
/// `"Unknown error"` so the client always has something to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    /// The operation executed; `result` carries its numeric value.
    Success {
        /// The computed value (IEEE-754 double, like every JSON number here).
        result: f64,
        /// Informational status code, normally [`status::OK`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },

    /// The operation failed; `message` says why.
    ///
    /// An error response never terminates the connection: the sender keeps
    /// the connection open for further requests.
    Error {
        /// Human-readable description of the failure.
        #[serde(default = "default_error_message")]
        message: String,
        /// Informational status code classifying the failure.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },
}

/// Fallback text for an error response that carries no `message` field.
fn default_error_message() -> String {
    "Unknown error".to_string()
}

impl Response {
    /// Builds a success response with [`status::OK`] attached.
    pub fn success(result: f64) -> Self {
        Response::Success {
            result,
            code: Some(status::OK),
        }
    }

    /// Builds an error response with the given message and status code.
    pub fn error(message: impl Into<String>, code: u16) -> Self {
        Response::Error {
            message: message.into(),
            code: Some(code),
        }
    }

    /// Returns `true` for the `Success` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
