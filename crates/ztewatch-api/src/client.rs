// ubus JSON-RPC HTTP client
//
// Wraps `reqwest::Client` with the router's envelope, header, and
// cache-busting conventions. Endpoint-specific calls (login) live in
// separate files as inherent methods to keep this module focused on
// transport mechanics.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, ORIGIN, REFERER};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::rpc::{RpcRequest, RpcResponse, UNAUTHENTICATED_SESSION};
use crate::transport::TransportConfig;

/// The router insists on a text/plain body even though it carries JSON.
const BODY_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Raw client for the router's ubus endpoint.
///
/// One POST per call, each carrying a single-element batch. Responses are
/// unwrapped to the `data` value; the envelope never reaches the caller.
pub struct RouterClient {
    http: reqwest::Client,
    endpoint: Url,
    origin: String,
    next_id: AtomicU64,
}

impl RouterClient {
    /// Create a client for `endpoint` (e.g. `http://192.168.0.1/ubus/`).
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        let origin = endpoint.origin().ascii_serialization();
        Self {
            http,
            endpoint,
            origin,
            next_id: AtomicU64::new(1),
        }
    }

    /// The configured ubus endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Invoke `object.method` with `args`.
    ///
    /// `session` fills the first positional param; `None` sends the
    /// unauthenticated session id.
    pub async fn call(
        &self,
        object: &str,
        method: &str,
        args: &Value,
        session: Option<&SecretString>,
    ) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session_id = session.map_or(UNAUTHENTICATED_SESSION, |s| s.expose_secret());
        let batch = [RpcRequest::call(id, session_id, object, method, args)];
        let body = serde_json::to_string(&batch)
            .map_err(|e| Error::malformed(format!("cannot encode request: {e}")))?;

        debug!(id, object, method, authenticated = session.is_some(), "ubus call");

        let resp = self
            .http
            .post(self.request_url())
            .header(CONTENT_TYPE, BODY_CONTENT_TYPE)
            .header(ORIGIN, self.origin.as_str())
            .header(REFERER, format!("{}/", self.origin))
            .body(body)
            .send()
            .await?;

        Self::parse_response(resp).await
    }

    /// The endpoint with a `t=<unix millis>` cache buster appended.
    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("t", &Utc::now().timestamp_millis().to_string());
        url
    }

    async fn parse_response(resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::unauthorized(format!("HTTP {status}")));
        }

        let body = resp.text().await?;
        trace!(%status, body = %preview(&body), "ubus response");

        if !status.is_success() {
            return Err(Error::malformed(format!("HTTP {status}: {}", preview(&body))));
        }

        let batch: Vec<RpcResponse> = serde_json::from_str(&body).map_err(|e| {
            Error::malformed(format!("{e} (body preview: {:?})", preview(&body)))
        })?;

        batch
            .into_iter()
            .next()
            .ok_or_else(|| Error::malformed("empty response batch"))?
            .into_data()
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn request_url_keeps_path_and_adds_cache_buster() {
        let client = RouterClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://192.168.0.1/ubus/").unwrap(),
        );
        let url = client.request_url();
        assert_eq!(url.path(), "/ubus/");
        assert!(url.query_pairs().any(|(k, v)| k == "t" && !v.is_empty()));
    }

    #[test]
    fn origin_derived_from_endpoint() {
        let client = RouterClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.0.0.1:8080/ubus/").unwrap(),
        );
        assert_eq!(client.origin, "http://10.0.0.1:8080");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        assert!(preview(&body).len() <= 200);
    }
}
