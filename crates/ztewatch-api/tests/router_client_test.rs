#![allow(clippy::unwrap_used)]
// Integration tests for `RouterClient` using wiremock.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use ztewatch_api::{
    Error, LoginReply, RouterClient, TransportConfig, UNAUTHENTICATED_SESSION, challenge_response,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Matches a posted batch whose first call targets `object.method`.
struct UbusCall {
    object: &'static str,
    method: &'static str,
}

fn ubus(object: &'static str, method: &'static str) -> UbusCall {
    UbusCall { object, method }
}

impl Match for UbusCall {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        body[0]["params"][1] == self.object && body[0]["params"][2] == self.method
    }
}

async fn setup() -> (MockServer, RouterClient) {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/ubus/", server.uri())).unwrap();
    let transport = TransportConfig::with_timeout(Duration::from_millis(500));
    let client = RouterClient::new(endpoint, &transport).unwrap();
    (server, client)
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([{ "jsonrpc": "2.0", "id": 1, "result": [0, data] }]))
}

fn posted_bodies(requests: &[Request]) -> Vec<Value> {
    requests
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ── Envelope tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_call_returns_data() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/ubus/"))
        .and(header("content-type", "text/plain;charset=UTF-8"))
        .and(ubus("zte_nwinfo_api", "nwinfo_get_netinfo"))
        .respond_with(ok(json!({ "network_type": "SA", "lte_rsrp": "-95" })))
        .expect(1)
        .mount(&server)
        .await;

    let data = client
        .call("zte_nwinfo_api", "nwinfo_get_netinfo", &json!({}), None)
        .await
        .unwrap();

    assert_eq!(data["network_type"], "SA");
}

#[tokio::test]
async fn test_call_envelope_shape() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ok(json!({})))
        .mount(&server)
        .await;

    let session = SecretString::from("feedface".to_owned());
    client
        .call("zwrt_wlan", "report", &json!({}), None)
        .await
        .unwrap();
    client
        .call("zwrt_data", "get_wwandst", &json!({ "cid": 1 }), Some(&session))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let bodies = posted_bodies(&requests);

    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0][0]["jsonrpc"], "2.0");
    assert_eq!(bodies[0][0]["method"], "call");
    assert_eq!(bodies[0][0]["params"][0], UNAUTHENTICATED_SESSION);
    assert_eq!(bodies[1][0]["params"][0], "feedface");
    assert_eq!(bodies[1][0]["params"][3], json!({ "cid": 1 }));

    // ids increase per call
    let first = bodies[0][0]["id"].as_u64().unwrap();
    let second = bodies[1][0]["id"].as_u64().unwrap();
    assert!(second > first);

    // cache buster and browser-style headers
    assert!(requests[0].url.query_pairs().any(|(k, _)| k == "t"));
    let origin = requests[0].headers.get("origin").unwrap().to_str().unwrap();
    assert_eq!(origin, server.uri());
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_access_denied_is_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32002, "message": "Access denied" }
        }])))
        .mount(&server)
        .await;

    let result = client.call("zwrt_wlan", "report", &json!({}), None).await;

    assert!(
        matches!(result, Err(Error::Unauthorized { .. })),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = client.call("zwrt_wlan", "report", &json!({}), None).await;

    match result {
        Err(Error::Malformed { ref message }) => {
            assert!(message.contains("<html>"), "expected body preview, got: {message}");
        }
        other => panic!("expected Malformed error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_server_error_is_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = client.call("zwrt_wlan", "report", &json!({}), None).await;

    assert!(matches!(result, Err(Error::Malformed { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_http_forbidden_is_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.call("zwrt_wlan", "report", &json!({}), None).await;

    assert!(result.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ok(json!({})).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = client
        .call("zwrt_wlan", "report", &json!({}), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)), "expected Network, got: {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/ubus/", server.uri())).unwrap();
    drop(server);

    let client = RouterClient::new(endpoint, &TransportConfig::default()).unwrap();
    let err = client
        .call("zwrt_wlan", "report", &json!({}), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)), "expected Network, got: {err:?}");
}

// ── Login tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_flow_submits_double_hash() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(ubus("zwrt_web", "web_login_info"))
        .respond_with(ok(json!({ "zte_web_sault": "abc123" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(ubus("zwrt_web", "web_login"))
        .respond_with(ok(json!({ "result": 0, "ubus_rpc_session": "0123456789abcdef" })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.login_info().await.unwrap();
    let credential = challenge_response(&SecretString::from("secret".to_owned()), &info.salt);
    let reply = client.login(&credential).await.unwrap();

    match reply {
        LoginReply::Accepted { session } => {
            assert_eq!(session.expose_secret(), "0123456789abcdef");
        }
        other => panic!("expected Accepted, got {other:?}"),
    }

    let bodies = posted_bodies(&server.received_requests().await.unwrap());
    let login = &bodies[1][0]["params"];
    assert_eq!(login[0], UNAUTHENTICATED_SESSION);
    assert_eq!(
        login[3]["password"],
        "E59724AABF6581701F9AB558DEBA75B101E2809BF574187F9F0D29F913FB3048"
    );
    assert!(
        !bodies.iter().any(|b| b.to_string().contains("\"secret\"")),
        "clear-text password must never be posted"
    );
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(ubus("zwrt_web", "web_login"))
        .respond_with(ok(json!({ "result": "1", "login_fail_num": 2 })))
        .mount(&server)
        .await;

    let reply = client
        .login(&SecretString::from("00".to_owned()))
        .await
        .unwrap();

    assert!(
        matches!(reply, LoginReply::Rejected { failures: Some(2), .. }),
        "got {reply:?}"
    );
}
