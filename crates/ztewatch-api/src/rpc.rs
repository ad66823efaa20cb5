// JSON-RPC 2.0 envelope for the router's ubus bridge
//
// Every call is `method: "call"` with positional params
// `[session, object, method, args]`. The router answers with
// `result: [status, data]` on success or a JSON-RPC `error` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Session id the router accepts for calls that need no login.
pub const UNAUTHENTICATED_SESSION: &str = "00000000000000000000000000000000";

/// JSON-RPC error code the router returns when a session is missing,
/// expired, or lacks permission for the object.
pub const ACCESS_DENIED: i64 = -32002;

/// ubus status code for "permission denied".
pub const UBUS_STATUS_PERMISSION_DENIED: i64 = 6;

/// One request inside the batch array posted to the endpoint.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: (&'a str, &'a str, &'a str, &'a Value),
}

impl<'a> RpcRequest<'a> {
    pub fn call(id: u64, session: &'a str, object: &'a str, method: &'a str, args: &'a Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: "call",
            params: (session, object, method, args),
        }
    }
}

/// One response element from the batch array.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl RpcResponse {
    /// Strip the envelope, returning the `data` half of `result`.
    pub fn into_data(self) -> Result<Value, Error> {
        if let Some(err) = self.error {
            let message = err.message.unwrap_or_default();
            return Err(if err.code == ACCESS_DENIED {
                Error::unauthorized(format!("access denied ({message})"))
            } else {
                Error::malformed(format!("JSON-RPC error {}: {message}", err.code))
            });
        }

        let mut result = self
            .result
            .ok_or_else(|| Error::malformed("response carries neither result nor error"))?
            .into_iter();

        let status = result
            .next()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| Error::malformed("result is missing its ubus status"))?;

        match status {
            0 => {}
            UBUS_STATUS_PERMISSION_DENIED => {
                return Err(Error::unauthorized("ubus permission denied"));
            }
            other => return Err(Error::malformed(format!("ubus status {other}"))),
        }

        result
            .next()
            .ok_or_else(|| Error::malformed("result carries no data"))
    }
}
