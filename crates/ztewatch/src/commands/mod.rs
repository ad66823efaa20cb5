//! Command handlers.

pub mod config_cmd;
pub mod poll;
pub mod watch;

use strum::IntoEnumIterator;

use ztewatch_core::{ErrorCause, GroupState, MetricGroup, RouterConfig, Snapshot};

use crate::error::CliError;

/// `Some` when nothing came back and every failure was a network error:
/// the router itself is unreachable, as opposed to partially working.
pub(crate) fn unreachable_router(snapshot: &Snapshot, router: &RouterConfig) -> Option<CliError> {
    let all_network = MetricGroup::iter().all(|group| {
        snapshot
            .error(group)
            .is_some_and(|e| e.cause == ErrorCause::Network || e.cause == ErrorCause::NoCredentials)
    });
    let any_network = snapshot
        .group_errors
        .values()
        .any(|e| e.cause == ErrorCause::Network);

    (all_network && any_network).then(|| CliError::ConnectionFailed {
        endpoint: router.endpoint.to_string(),
        reason: snapshot
            .group_errors
            .values()
            .find(|e| e.cause == ErrorCause::Network)
            .map(|e| e.message.clone())
            .unwrap_or_default(),
    })
}

/// Groups that failed for a reason other than a missing password.
pub(crate) fn unavailable_groups(snapshot: &Snapshot) -> usize {
    MetricGroup::iter()
        .filter(|g| matches!(snapshot.group_state(*g), GroupState::Unavailable(_)))
        .count()
}
