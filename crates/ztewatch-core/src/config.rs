// ── Runtime connection configuration ──
//
// Describes *how* to reach one router. Carries the password but never
// touches disk; the binary builds a `RouterConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Address most ZTE mobile routers ship with.
pub const DEFAULT_HOST: &str = "192.168.0.1";

/// Configuration for polling a single router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// ubus endpoint (e.g. `http://192.168.0.1/ubus/`).
    pub endpoint: Url,
    /// Admin password. `None` is legal and skips auth-required groups.
    pub password: Option<SecretString>,
    /// Upper bound for every single HTTP call.
    pub timeout: Duration,
    /// Cadence for [`Monitor`](crate::Monitor).
    pub poll_interval: Duration,
}

impl RouterConfig {
    /// Build a config from a host, `host:port`, or full URL.
    ///
    /// A bare host or a URL without a path gets the `/ubus/` endpoint.
    pub fn for_host(host: &str) -> Result<Self, CoreError> {
        Ok(Self {
            endpoint: endpoint_for(host)?,
            password: None,
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(30),
        })
    }

    pub fn with_password(mut self, password: Option<SecretString>) -> Self {
        self.password = password;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

fn endpoint_for(host: &str) -> Result<Url, CoreError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(CoreError::Config {
            message: "router host is empty".into(),
        });
    }

    let raw = if host.contains("://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    };

    let mut url = Url::parse(&raw).map_err(|e| CoreError::Config {
        message: format!("invalid router address '{host}': {e}"),
    })?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(CoreError::Config {
            message: format!("router address '{host}' has no host"),
        });
    }

    if url.path() == "/" {
        url.set_path("/ubus/");
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_ubus_endpoint() {
        let cfg = RouterConfig::for_host("192.168.0.1").unwrap();
        assert_eq!(cfg.endpoint.as_str(), "http://192.168.0.1/ubus/");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.poll_interval, Duration::from_secs(30));
        assert!(cfg.password.is_none());
    }

    #[test]
    fn host_with_port() {
        let cfg = RouterConfig::for_host("10.0.0.1:8080").unwrap();
        assert_eq!(cfg.endpoint.as_str(), "http://10.0.0.1:8080/ubus/");
    }

    #[test]
    fn explicit_endpoint_kept() {
        let cfg = RouterConfig::for_host("http://router.lan/cgi/ubus").unwrap();
        assert_eq!(cfg.endpoint.as_str(), "http://router.lan/cgi/ubus");
    }

    #[test]
    fn unusable_addresses_rejected() {
        assert!(matches!(
            RouterConfig::for_host("  "),
            Err(CoreError::Config { .. })
        ));
        assert!(matches!(
            RouterConfig::for_host("http://"),
            Err(CoreError::Config { .. })
        ));
    }
}
