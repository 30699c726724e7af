//! Request dispatch: frame payload in, wire response out.
//!
//! This is the pure core of the connection handler.  Each inbound frame runs
//! through the same pipeline:
//!
//! ```text
//! payload bytes ──serde_json──▶ Request ──validate──▶ RpcCall ──execute──▶ Response
//!        │                         │                     │
//!        └─ parse failure          └─ unknown action     └─ (infallible)
//!           "Invalid JSON format"     missing / non-numeric params
//! ```
//!
//! Every failure becomes a structured error [`Response`]; nothing here ever
//! returns an `Err` to the connection loop, because a bad request must never
//! cost the client its connection.
//!
//! # The panic boundary
//!
//! Rust has no exceptions, and every anticipated failure is already a typed
//! [`DispatchError`].  The one remaining "unanticipated internal fault" is a
//! panic, so [`dispatch_bytes`] runs the pipeline under
//! `std::panic::catch_unwind`: a panicking dispatch produces the generic
//! `"Internal server error"` response (code 500) with the panic detail logged
//! server-side only; it is never leaked to the client and never kills the
//! connection task.

use std::any::Any;
use std::panic;

use tracing::{debug, error};

use mathrpc_core::{DispatchError, Request, Response, RpcCall};

/// Dispatches one frame payload and produces the response to send back.
///
/// Never fails and never panics: parse errors, validation errors, and
/// unknown actions each map to their structured error response, and a panic
/// anywhere in the pipeline is caught and converted to the generic
/// internal-error response.
pub fn dispatch_bytes(payload: &[u8]) -> Response {
    match panic::catch_unwind(|| run_pipeline(payload)) {
        Ok(response) => response,
        Err(cause) => {
            // Logged server-side only; the client sees the generic message.
            error!("dispatch panicked: {}", panic_message(cause.as_ref()));
            DispatchError::Internal.to_response()
        }
    }
}

/// Text-frame convenience wrapper around [`dispatch_bytes`].
pub fn dispatch_text(payload: &str) -> Response {
    dispatch_bytes(payload.as_bytes())
}

/// The dispatch pipeline proper: parse, validate, execute.
fn run_pipeline(payload: &[u8]) -> Response {
    // Step 1: parse the payload as JSON into the request envelope.  Both
    // syntactic failures (not JSON) and shape failures (e.g. a non-string
    // `action`) are reported as invalid format.
    let request: Request = match serde_json::from_slice(payload) {
        Ok(request) => request,
        Err(e) => {
            debug!("request failed to parse: {e}");
            return DispatchError::InvalidJson.to_response();
        }
    };

    // Step 2 + 3: extract action and params, promote to a typed call.
    match RpcCall::from_request(&request) {
        Ok(call) => Response::success(call.execute()),
        Err(e) => e.to_response(),
    }
}

/// Extracts a printable message from a panic payload.
///
/// `catch_unwind` yields a `Box<dyn Any>`; panics raised with a string
/// literal or a formatted message downcast to `&str` or `String`.
fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(s) = cause.downcast_ref::<&str>() {
        s
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
