use thiserror::Error;

/// Top-level error type for the `ztewatch-api` crate.
///
/// The three transport outcomes callers branch on are [`Network`](Self::Network),
/// [`Malformed`](Self::Malformed) and [`Unauthorized`](Self::Unauthorized).
/// The remaining variants only occur while constructing a client.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout, or the body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    // ── Response classification ─────────────────────────────────────
    /// The router rejected the session (`Access denied`, ubus permission
    /// denied, or HTTP 401/403).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Non-JSON body, unexpected envelope, or a JSON-RPC error that is not
    /// an authorization problem.
    #[error("malformed response: {message}")]
    Malformed { message: String },

    // ── Construction ────────────────────────────────────────────────
    /// Endpoint URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl Error {
    /// Returns `true` if the router refused the session token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` for failures that say nothing about the credentials:
    /// timeouts and connection problems.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}
