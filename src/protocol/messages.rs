// ABOUTME: Request/response payload definitions and serialization
// ABOUTME: Self-describing messages carry their own send timestamp back to the client

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Milliseconds since the Unix epoch (or a duration in milliseconds)
pub type Millis = f64;

/// Wire name of the client send timestamp
pub const T_TX: &str = "tTx";
/// Wire name of the server timestamp
pub const T_SERVER: &str = "tServer";

/// Clock sync request, created by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Client send time
    #[serde(rename = "tTx")]
    pub t_tx: Millis,

    /// Any other fields the caller piggybacks on the request
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Request {
    /// Create a request sent at `t_tx`
    pub fn new(t_tx: Millis) -> Self {
        Self {
            t_tx,
            extra: Map::new(),
        }
    }

    /// Attach an extra field that the responder will echo back
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Clock sync response: the original request plus the server timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The request as received, untouched
    #[serde(flatten)]
    pub request: Request,

    /// Server time when the request was processed
    #[serde(rename = "tServer")]
    pub t_server: Millis,
}

impl Response {
    /// Stamp `request` with `t_server`, replacing any `tServer` it already carried
    pub fn stamp(mut request: Request, t_server: Millis) -> Self {
        request.extra.remove(T_SERVER);
        Self { request, t_server }
    }

    /// Client send time echoed back by the server
    #[inline]
    pub fn t_tx(&self) -> Millis {
        self.request.t_tx
    }
}

/// Read a numeric field out of an untyped payload
///
/// Missing or non-numeric fields read as NaN, which then flows through any
/// arithmetic done with them.
pub fn read_millis(payload: &Value, key: &str) -> Millis {
    payload.get(key).and_then(Value::as_f64).unwrap_or(f64::NAN)
}

/// Encode a payload as JSON text
pub fn to_json<T: Serialize>(msg: &T) -> Result<String, Error> {
    serde_json::to_string(msg).map_err(|e| Error::Protocol(e.to_string()))
}

/// Decode a payload from JSON text
pub fn from_json<'a, T: Deserialize<'a>>(text: &'a str) -> Result<T, Error> {
    serde_json::from_str(text).map_err(|e| Error::Protocol(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_millis_missing_is_nan() {
        let payload = json!({ "tTx": 1000 });
        assert_eq!(read_millis(&payload, T_TX), 1000.0);
        assert!(read_millis(&payload, T_SERVER).is_nan());
        assert!(read_millis(&json!({ "tTx": "soon" }), T_TX).is_nan());
        assert!(read_millis(&json!(42), T_TX).is_nan());
    }

    #[test]
    fn test_stamp_overwrites_existing_server_field() {
        let req = Request::new(1.0).with_field("tServer", 5).with_field("seq", 3);
        let rsp = Response::stamp(req, 9.0);
        assert_eq!(rsp.t_server, 9.0);
        assert!(!rsp.request.extra.contains_key(T_SERVER));
        assert_eq!(rsp.request.extra["seq"], json!(3));
    }
}
