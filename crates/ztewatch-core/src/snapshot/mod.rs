// ── Snapshot ──
//
// The merged outcome of one polling cycle. Every metric group ends up
// either populated or in `group_errors`, never both and never neither.

mod normalize;

pub use normalize::{DataUsage, DeviceCounts, NetworkInfo, RouterStatus, WifiInfo};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use strum::{Display, IntoEnumIterator};

use crate::catalog::MetricGroup;

/// Why a group is missing from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorCause {
    Network,
    MalformedResponse,
    Unauthorized,
    /// No password configured. Expected, not a fault.
    NoCredentials,
    LockedOut,
}

/// A group's failure for this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupError {
    pub cause: ErrorCause,
    pub message: String,
}

impl GroupError {
    pub fn new(cause: ErrorCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
        }
    }

    pub(crate) fn from_api(err: &ztewatch_api::Error) -> Self {
        use ztewatch_api::Error;

        let cause = match err {
            Error::Unauthorized { .. } => ErrorCause::Unauthorized,
            Error::Malformed { .. } => ErrorCause::MalformedResponse,
            Error::Network(_) | Error::InvalidUrl(_) | Error::Client(_) => ErrorCause::Network,
        };
        Self::new(cause, err.to_string())
    }
}

/// How a presentation layer should show a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// Fresh values from this cycle.
    Fresh,
    /// Absent because no password was ever configured.
    NotConfigured,
    /// Failed this cycle.
    Unavailable(ErrorCause),
}

/// Result of one polling cycle. Immutable once delivered.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// 1-based cycle number within this process.
    pub cycle: u64,
    pub taken_at: DateTime<Utc>,
    /// At least one call succeeded with a session token this cycle.
    pub authenticated: bool,
    pub status: Option<RouterStatus>,
    pub network: Option<NetworkInfo>,
    pub usage: Option<DataUsage>,
    pub devices: Option<DeviceCounts>,
    pub wifi: Option<WifiInfo>,
    /// `object.method` that populated each group.
    pub sources: BTreeMap<MetricGroup, String>,
    pub group_errors: BTreeMap<MetricGroup, GroupError>,
}

impl Snapshot {
    pub fn is_populated(&self, group: MetricGroup) -> bool {
        match group {
            MetricGroup::Status => self.status.is_some(),
            MetricGroup::Netinfo => self.network.is_some(),
            MetricGroup::Usage => self.usage.is_some(),
            MetricGroup::Devices => self.devices.is_some(),
            MetricGroup::Wifi => self.wifi.is_some(),
        }
    }

    pub fn error(&self, group: MetricGroup) -> Option<&GroupError> {
        self.group_errors.get(&group)
    }

    pub fn group_state(&self, group: MetricGroup) -> GroupState {
        match self.error(group) {
            None => GroupState::Fresh,
            Some(err) if err.cause == ErrorCause::NoCredentials => GroupState::NotConfigured,
            Some(err) => GroupState::Unavailable(err.cause),
        }
    }

    /// Every group populated.
    pub fn is_complete(&self) -> bool {
        self.group_errors.is_empty()
    }
}

/// Accumulates one cycle's results.
pub(crate) struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub(crate) fn new(cycle: u64) -> Self {
        Self {
            snapshot: Snapshot {
                cycle,
                taken_at: Utc::now(),
                authenticated: false,
                status: None,
                network: None,
                usage: None,
                devices: None,
                wifi: None,
                sources: BTreeMap::new(),
                group_errors: BTreeMap::new(),
            },
        }
    }

    pub(crate) fn mark_authenticated(&mut self) {
        self.snapshot.authenticated = true;
    }

    /// Decode `payload` into `group`. On success any earlier error recorded
    /// for the group is dropped.
    pub(crate) fn populate(
        &mut self,
        group: MetricGroup,
        source: String,
        payload: Value,
    ) -> Result<(), GroupError> {
        let malformed = |reason: String| {
            GroupError::new(
                ErrorCause::MalformedResponse,
                format!("cannot decode {source}: {reason}"),
            )
        };

        let snap = &mut self.snapshot;
        match group {
            MetricGroup::Status => snap.status = Some(normalize::decode(payload).map_err(malformed)?),
            MetricGroup::Netinfo => {
                snap.network = Some(normalize::decode(payload).map_err(malformed)?);
            }
            MetricGroup::Usage => snap.usage = Some(normalize::decode(payload).map_err(malformed)?),
            MetricGroup::Devices => {
                snap.devices = Some(normalize::decode(payload).map_err(malformed)?);
            }
            MetricGroup::Wifi => snap.wifi = Some(normalize::decode(payload).map_err(malformed)?),
        }

        snap.group_errors.remove(&group);
        snap.sources.insert(group, source);
        Ok(())
    }

    pub(crate) fn fail(&mut self, group: MetricGroup, error: GroupError) {
        self.snapshot.group_errors.insert(group, error);
    }

    pub(crate) fn finish(mut self) -> Snapshot {
        for group in MetricGroup::iter() {
            if !self.snapshot.is_populated(group) && !self.snapshot.group_errors.contains_key(&group) {
                self.snapshot.group_errors.insert(
                    group,
                    GroupError::new(ErrorCause::MalformedResponse, "no method catalogued"),
                );
            }
        }
        self.snapshot
    }
}
