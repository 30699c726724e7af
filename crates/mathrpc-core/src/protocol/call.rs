//! Typed call parsing and the dispatch error taxonomy.
//!
//! The wire [`Request`] is an untyped envelope: any well-formed JSON object
//! can arrive.  This module is the protocol boundary where that envelope is
//! either promoted to a strongly typed [`RpcCall`] variant or rejected with a
//! [`DispatchError`] carrying the exact client-facing message.
//!
//! Keeping the set of operations as a closed enum (rather than string
//! comparisons scattered through the server) makes dispatch exhaustive: the
//! compiler flags every `match` that forgets to handle a new operation when
//! one is added here.
//!
//! # Validation order
//!
//! For `"add"`, presence is checked before type: a request missing `a` gets
//! the missing-parameters message even if `b` is also a string.  This matches
//! the observable order a client can rely on.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{status, Request, Response};

// ── Error taxonomy ────────────────────────────────────────────────────────────

/// Everything that can go wrong between receiving a frame and producing a
/// result.
///
/// Each variant's `Display` text is the exact `message` string sent to the
/// client, and [`DispatchError::status_code`] supplies the informational
/// `code` classifier.  None of these are fatal to the connection: the server
/// answers with a structured error response and keeps reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The frame payload was not parseable as JSON, or did not have the
    /// request envelope shape.
    #[error("Invalid JSON format")]
    InvalidJson,

    /// The `"add"` request did not supply both operands.
    #[error("Missing required parameters 'a' or 'b'")]
    MissingParams,

    /// Both operands were present but at least one was not a JSON number.
    #[error("Parameters 'a' and 'b' must be numeric")]
    NonNumericParams,

    /// The request named an action outside the supported set.
    ///
    /// The string is the offending action value; a request with no action
    /// field at all reports the value `None`.
    #[error("Unknown action: '{0}'")]
    UnknownAction(String),

    /// An unanticipated fault occurred while dispatching.
    ///
    /// The client only ever sees this generic text; whatever detail exists
    /// is logged server-side.
    #[error("Internal server error")]
    Internal,
}

impl DispatchError {
    /// The informational status code attached to this error's response.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::InvalidJson => status::BAD_REQUEST,
            DispatchError::MissingParams => status::BAD_REQUEST,
            DispatchError::NonNumericParams => status::BAD_REQUEST,
            DispatchError::UnknownAction(_) => status::NOT_FOUND,
            DispatchError::Internal => status::INTERNAL_ERROR,
        }
    }

    /// Converts this error into the wire response sent back to the client.
    pub fn to_response(&self) -> Response {
        Response::error(self.to_string(), self.status_code())
    }
}

// ── Typed calls ───────────────────────────────────────────────────────────────

/// The closed set of operations this protocol supports.
///
/// A [`Request`] is promoted to an `RpcCall` as soon as its action tag is
/// known, so type and shape errors are rejected at the boundary and the
/// execution code only ever sees valid operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RpcCall {
    /// Numeric addition of two operands.
    Add {
        /// First addend.
        a: f64,
        /// Second addend.
        b: f64,
    },
}

impl RpcCall {
    /// Validates a wire request and promotes it to a typed call.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::MissingParams`] if `"add"` lacks `params.a` or
    ///   `params.b`.
    /// - [`DispatchError::NonNumericParams`] if either operand is present
    ///   but not a JSON number (integers and floats both qualify).
    /// - [`DispatchError::UnknownAction`] for any other action, including a
    ///   request with no action field.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mathrpc_core::{Request, RpcCall};
    ///
    /// let call = RpcCall::from_request(&Request::add(10.0, 20.0)).unwrap();
    /// assert_eq!(call, RpcCall::Add { a: 10.0, b: 20.0 });
    /// ```
    pub fn from_request(request: &Request) -> Result<Self, DispatchError> {
        match request.action.as_deref() {
            Some("add") => {
                let (a, b) = match (request.params.get("a"), request.params.get("b")) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return Err(DispatchError::MissingParams),
                };

                match (as_number(a), as_number(b)) {
                    (Some(a), Some(b)) => Ok(RpcCall::Add { a, b }),
                    _ => Err(DispatchError::NonNumericParams),
                }
            }

            // Any other action value, present or absent, is answered with an
            // error message naming the offending value.  An absent action
            // reports the value `None`.
            Some(other) => Err(DispatchError::UnknownAction(other.to_string())),
            None => Err(DispatchError::UnknownAction("None".to_string())),
        }
    }

    /// Executes the call.
    ///
    /// Execution is infallible and synchronous: every way a request can fail
    /// has already been rejected by [`RpcCall::from_request`], and nothing
    /// here suspends, which is what guarantees the one-request-one-response
    /// ordering per connection without extra locking.
    pub fn execute(self) -> f64 {
        match self {
            RpcCall::Add { a, b } => add_numbers(a, b),
        }
    }
}

/// Widens a JSON number (integer or float) to `f64`.
///
/// Returns `None` for every non-number value, including numeric strings;
/// the protocol requires real JSON numbers, not representations of them.
fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Adds two numbers with standard IEEE-754 double semantics.
fn add_numbers(a: f64, b: f64) -> f64 {
    a + b
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Builds a `Request` straight from a JSON literal, the way the server
    /// sees it after envelope parsing.
    fn request_from_json(value: Value) -> Request {
        serde_json::from_value(value).unwrap()
    }

    // ── Happy path ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_request_parses_to_typed_call() {
        // Arrange
        let req = request_from_json(json!({"action":"add","params":{"a":10,"b":20}}));

        // Act
        let call = RpcCall::from_request(&req).unwrap();

        // Assert: integer operands widen to f64
        assert_eq!(call, RpcCall::Add { a: 10.0, b: 20.0 });
    }

    #[test]
    fn test_add_accepts_floating_point_operands() {
        let req = request_from_json(json!({"action":"add","params":{"a":5.5,"b":2.5}}));
        let call = RpcCall::from_request(&req).unwrap();
        assert_eq!(call, RpcCall::Add { a: 5.5, b: 2.5 });
    }

    #[test]
    fn test_add_accepts_negative_operands() {
        let req = request_from_json(json!({"action":"add","params":{"a":-100,"b":100}}));
        let call = RpcCall::from_request(&req).unwrap();
        assert_eq!(call.execute(), 0.0);
    }

    #[test]
    fn test_execute_adds_integers() {
        assert_eq!(RpcCall::Add { a: 10.0, b: 20.0 }.execute(), 30.0);
    }

    #[test]
    fn test_execute_adds_floats() {
        assert_eq!(RpcCall::Add { a: 5.5, b: 2.5 }.execute(), 8.0);
    }

    #[test]
    fn test_extra_params_are_ignored() {
        // Unknown operands do not invalidate a request that has a and b.
        let req = request_from_json(json!({"action":"add","params":{"a":1,"b":2,"c":3}}));
        assert!(RpcCall::from_request(&req).is_ok());
    }

    // ── Missing parameters ────────────────────────────────────────────────────

    #[test]
    fn test_missing_b_reports_missing_params() {
        // Arrange: only `a` is supplied
        let req = request_from_json(json!({"action":"add","params":{"a":1}}));

        // Act
        let err = RpcCall::from_request(&req).unwrap_err();

        // Assert: exact client-facing message and classification
        assert_eq!(err, DispatchError::MissingParams);
        assert_eq!(err.to_string(), "Missing required parameters 'a' or 'b'");
        assert_eq!(err.status_code(), status::BAD_REQUEST);
    }

    #[test]
    fn test_missing_a_reports_missing_params() {
        let req = request_from_json(json!({"action":"add","params":{"b":2}}));
        assert_eq!(
            RpcCall::from_request(&req).unwrap_err(),
            DispatchError::MissingParams
        );
    }

    #[test]
    fn test_empty_params_reports_missing_params() {
        let req = request_from_json(json!({"action":"add","params":{}}));
        assert_eq!(
            RpcCall::from_request(&req).unwrap_err(),
            DispatchError::MissingParams
        );
    }

    #[test]
    fn test_absent_params_field_reports_missing_params() {
        // No params key at all; the envelope defaults it to the empty map.
        let req = request_from_json(json!({"action":"add"}));
        assert_eq!(
            RpcCall::from_request(&req).unwrap_err(),
            DispatchError::MissingParams
        );
    }

    #[test]
    fn test_presence_is_checked_before_type() {
        // `a` missing and `b` non-numeric: the missing-params message wins.
        let req = request_from_json(json!({"action":"add","params":{"b":"two"}}));
        assert_eq!(
            RpcCall::from_request(&req).unwrap_err(),
            DispatchError::MissingParams
        );
    }

    // ── Non-numeric parameters ────────────────────────────────────────────────

    #[test]
    fn test_string_operand_reports_non_numeric() {
        // Arrange: `a` is a numeric *string*, which the protocol rejects
        let req = request_from_json(json!({"action":"add","params":{"a":"10","b":20}}));

        // Act
        let err = RpcCall::from_request(&req).unwrap_err();

        // Assert
        assert_eq!(err, DispatchError::NonNumericParams);
        assert_eq!(err.to_string(), "Parameters 'a' and 'b' must be numeric");
        assert_eq!(err.status_code(), status::BAD_REQUEST);
    }

    #[test]
    fn test_boolean_operand_reports_non_numeric() {
        let req = request_from_json(json!({"action":"add","params":{"a":true,"b":1}}));
        assert_eq!(
            RpcCall::from_request(&req).unwrap_err(),
            DispatchError::NonNumericParams
        );
    }

    #[test]
    fn test_null_operand_reports_non_numeric() {
        // null is *present* but not a number, so this is a type error, not
        // a missing-parameter error.
        let req = request_from_json(json!({"action":"add","params":{"a":null,"b":2}}));
        assert_eq!(
            RpcCall::from_request(&req).unwrap_err(),
            DispatchError::NonNumericParams
        );
    }

    // ── Unknown actions ───────────────────────────────────────────────────────

    #[test]
    fn test_unknown_action_names_the_offender() {
        // Arrange
        let req = request_from_json(json!({"action":"multiply","params":{}}));

        // Act
        let err = RpcCall::from_request(&req).unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "Unknown action: 'multiply'");
        assert_eq!(err.status_code(), status::NOT_FOUND);
    }

    #[test]
    fn test_absent_action_reports_none() {
        let req = request_from_json(json!({"params":{"a":1,"b":2}}));
        let err = RpcCall::from_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "Unknown action: 'None'");
    }

    #[test]
    fn test_action_matching_is_case_sensitive() {
        let req = request_from_json(json!({"action":"Add","params":{"a":1,"b":2}}));
        assert_eq!(
            RpcCall::from_request(&req).unwrap_err(),
            DispatchError::UnknownAction("Add".to_string())
        );
    }

    // ── Error → response conversion ───────────────────────────────────────────

    #[test]
    fn test_error_to_response_carries_message_and_code() {
        // Arrange
        let err = DispatchError::UnknownAction("multiply".to_string());

        // Act
        let resp = err.to_response();

        // Assert: the full wire shape of the error response
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Unknown action: 'multiply'");
        assert_eq!(json["code"], 404);
    }

    #[test]
    fn test_internal_error_response_is_generic() {
        let resp = DispatchError::Internal.to_response();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["code"], 500);
    }

    #[test]
    fn test_invalid_json_error_classified_as_bad_request() {
        assert_eq!(DispatchError::InvalidJson.status_code(), status::BAD_REQUEST);
        assert_eq!(DispatchError::InvalidJson.to_string(), "Invalid JSON format");
    }
}
