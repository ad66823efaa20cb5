//! Async client for the ubus JSON-RPC management API exposed by ZTE
//! LTE/5G routers at `http://<router>/ubus/`.
//!
//! This crate is the transport layer only: it builds the JSON-RPC 2.0
//! envelope, carries the session token in the slot the router expects,
//! and classifies every response as data, [`Error::Network`],
//! [`Error::Malformed`] or [`Error::Unauthorized`]. It never retries and
//! holds no session state -- login policy lives in `ztewatch-core`.

pub mod auth;
pub mod client;
pub mod error;
pub mod rpc;
pub mod transport;

pub use auth::{LoginInfo, LoginReply, challenge_response};
pub use client::RouterClient;
pub use error::Error;
pub use rpc::UNAUTHENTICATED_SESSION;
pub use transport::TransportConfig;
