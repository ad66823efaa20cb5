//! Polling core for ZTE LTE/5G routers, sitting between `ztewatch-api`
//! and whatever presents the numbers.
//!
//! - **[`Poller`]**: runs one polling cycle over the [`MethodCatalog`],
//!   logging in at most once and merging every group's outcome into a
//!   [`Snapshot`]. A failing group never aborts the others.
//!
//! - **[`Authenticator`] / [`AuthState`]**: challenge-response login and the
//!   session/lockout bookkeeping that keeps the client from burning attempts
//!   against the router's five-strike lockout.
//!
//! - **[`Monitor`]**: optional background driver that ticks a `Poller` on a
//!   fixed interval and publishes snapshots through a `watch` channel.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod monitor;
pub mod poller;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AuthFailure, AuthOutcome, AuthState, Authenticator};
pub use catalog::{MethodCatalog, MethodDescriptor, MetricGroup};
pub use config::RouterConfig;
pub use error::CoreError;
pub use monitor::Monitor;
pub use poller::Poller;
pub use snapshot::{
    DataUsage, DeviceCounts, ErrorCause, GroupError, GroupState, NetworkInfo, RouterStatus,
    Snapshot, WifiInfo,
};
