// ABOUTME: Server side of the clock sync exchange
// ABOUTME: Stamps each incoming request with server time and echoes everything else back

use crate::protocol::messages::T_SERVER;
use crate::protocol::{Request, Response};
use crate::sync::{Clock, SystemClock};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Answers clock sync requests
///
/// Call [`process_request`](Responder::process_request) and return the result
/// to the client as fast as possible; time spent between the two widens the
/// error of the client's estimate.
#[derive(Clone)]
pub struct Responder {
    clock: Arc<dyn Clock>,
}

impl Responder {
    /// Create a responder reading the wall clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a responder reading `clock`
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Stamp a typed request
    pub fn process_request(&self, req: &Request) -> Response {
        Response::stamp(req.clone(), self.clock.now_millis())
    }

    /// Stamp an untyped payload
    ///
    /// Any object is accepted, with or without `tTx`; every field is kept and
    /// `tServer` is added or overwritten. A payload that is not an object has no
    /// fields to keep and comes back as `{ "tServer": ... }`.
    pub fn process_value(&self, req: &Value) -> Value {
        let mut fields = match req {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        fields.insert(T_SERVER.to_string(), Value::from(self.clock.now_millis()));
        Value::Object(fields)
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder").finish_non_exhaustive()
    }
}
