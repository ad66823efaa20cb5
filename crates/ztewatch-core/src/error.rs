// ── Core error types ──
//
// Construction-time failures only. Everything that can go wrong during a
// polling cycle is localized to its metric group inside the Snapshot.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Api(#[from] ztewatch_api::Error),
}
