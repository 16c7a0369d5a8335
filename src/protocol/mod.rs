// ABOUTME: Payloads for the clocksy request/response exchange
// ABOUTME: Typed messages plus helpers for untyped JSON payloads

/// Payload type definitions and serialization
pub mod messages;

pub use messages::{from_json, read_millis, to_json, Millis, Request, Response};
