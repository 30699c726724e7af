//! Protocol module containing the wire message types and call validation.

pub mod call;
pub mod messages;

pub use call::{DispatchError, RpcCall};
pub use messages::{status, Request, Response};
