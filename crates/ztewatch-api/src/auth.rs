// Challenge-response login
//
// The router hands out a salt through `web_login_info`; the client proves
// knowledge of the password by sending
// `HEX(SHA256(HEX(SHA256(password)) + salt))`, upper-case hex at both steps.
// The password itself never crosses the wire.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::RouterClient;
use crate::error::Error;

const LOGIN_OBJECT: &str = "zwrt_web";
const LOGIN_INFO_METHOD: &str = "web_login_info";
const LOGIN_METHOD: &str = "web_login";

/// Derive the submitted credential from the password and the router's salt.
pub fn challenge_response(password: &SecretString, salt: &str) -> SecretString {
    let first = hex::encode_upper(Sha256::digest(password.expose_secret().as_bytes()));

    let mut hasher = Sha256::new();
    hasher.update(first.as_bytes());
    hasher.update(salt.as_bytes());
    SecretString::from(hex::encode_upper(hasher.finalize()))
}

/// Reply to `zwrt_web.web_login_info`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInfo {
    /// The per-login salt (the router spells it `sault`).
    #[serde(rename = "zte_web_sault")]
    pub salt: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Outcome of a `zwrt_web.web_login` call the router actually answered.
#[derive(Debug)]
pub enum LoginReply {
    /// Credential accepted; carries the new session token.
    Accepted { session: SecretString },
    /// Wrong password. `failures` is the router's own count when reported.
    Rejected {
        failures: Option<u32>,
        message: Option<String>,
    },
    /// The router refuses logins for now. `remaining` is its countdown.
    Locked { remaining: Option<Duration> },
}

impl LoginReply {
    /// Interpret the `data` half of a login result.
    ///
    /// `result` is `0` on success, `1` for a wrong password, `2` while the
    /// router is locked; it may arrive as a number or a numeric string.
    pub fn from_payload(payload: &Value) -> Result<Self, Error> {
        let code = payload
            .get("result")
            .and_then(lenient_u64)
            .ok_or_else(|| Error::malformed("login reply carries no result code"))?;

        let message = payload
            .get("msg")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match code {
            0 => {
                let session = payload
                    .get("ubus_rpc_session")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| Error::malformed("login accepted without a session token"))?;
                Ok(Self::Accepted {
                    session: SecretString::from(session.to_owned()),
                })
            }
            2 => Ok(Self::Locked {
                remaining: payload
                    .get("login_fail_lock_lefttime")
                    .and_then(lenient_u64)
                    .map(Duration::from_secs),
            }),
            _ => Ok(Self::Rejected {
                failures: payload
                    .get("login_fail_num")
                    .and_then(lenient_u64)
                    .and_then(|n| u32::try_from(n).ok()),
                message,
            }),
        }
    }
}

impl RouterClient {
    /// Fetch the login challenge (unauthenticated).
    ///
    /// `zwrt_web.web_login_info`
    pub async fn login_info(&self) -> Result<LoginInfo, Error> {
        debug!("requesting login challenge");
        let data = self
            .call(LOGIN_OBJECT, LOGIN_INFO_METHOD, &json!({}), None)
            .await?;
        serde_json::from_value(data)
            .map_err(|e| Error::malformed(format!("login info without salt: {e}")))
    }

    /// Submit a derived credential (see [`challenge_response`]).
    ///
    /// `zwrt_web.web_login` with `{"password": credential}`
    pub async fn login(&self, credential: &SecretString) -> Result<LoginReply, Error> {
        debug!("submitting login credential");
        let args = json!({ "password": credential.expose_secret() });
        let data = self.call(LOGIN_OBJECT, LOGIN_METHOD, &args, None).await?;
        LoginReply::from_payload(&data)
    }
}

/// Accept `3`, `"3"` and `" 3 "` alike.
fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
