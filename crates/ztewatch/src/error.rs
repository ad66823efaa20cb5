//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use ztewatch_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach router at {endpoint}: {reason}")]
    #[diagnostic(
        code(ztewatch::connection_failed),
        help(
            "Check that the router is powered on and reachable from this machine.\n\
             Endpoint: {endpoint}\n\
             Override the address with --host or ZTEWATCH_HOST."
        )
    )]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("{count} metric group(s) unavailable")]
    #[diagnostic(
        code(ztewatch::incomplete),
        help("Run with -v for per-call details.")
    )]
    Incomplete { count: usize },

    #[error("Could not build HTTP client: {message}")]
    #[diagnostic(code(ztewatch::client))]
    Client { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ztewatch::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ztewatch::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(ztewatch::config))]
    Config(Box<figment::Error>),

    // ── Serialization ────────────────────────────────────────────────
    #[error("Could not render output: {0}")]
    #[diagnostic(code(ztewatch::render))]
    Render(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::ProfileNotFound { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => CliError::Validation {
                field: "host".into(),
                reason: message,
            },
            CoreError::Api(err) => CliError::Client {
                message: err.to_string(),
            },
        }
    }
}
