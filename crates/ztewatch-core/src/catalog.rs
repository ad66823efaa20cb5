// ── Method catalog ──
//
// The fixed set of ubus calls a polling cycle makes, built once and never
// written afterwards.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumIter};

/// One logical category of router data.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricGroup {
    Status,
    Netinfo,
    Usage,
    Devices,
    Wifi,
}

/// One catalogued ubus call.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// ubus object, e.g. `zwrt_router.api`.
    pub object: &'static str,
    /// Method on that object.
    pub method: &'static str,
    pub args: Value,
    pub requires_auth: bool,
    pub group: MetricGroup,
}

impl MethodDescriptor {
    fn new(object: &'static str, method: &'static str, requires_auth: bool, group: MetricGroup) -> Self {
        Self {
            object,
            method,
            args: json!({}),
            requires_auth,
            group,
        }
    }

    fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    /// `object.method`, for logs and snapshot provenance.
    pub fn name(&self) -> String {
        format!("{}.{}", self.object, self.method)
    }
}

static STANDARD: LazyLock<MethodCatalog> = LazyLock::new(MethodCatalog::standard);

/// Immutable table of the calls a cycle makes.
#[derive(Debug, Clone)]
pub struct MethodCatalog {
    entries: Vec<MethodDescriptor>,
}

impl MethodCatalog {
    /// The process-wide catalog.
    pub fn global() -> &'static Self {
        &STANDARD
    }

    /// The six calls the router's web UI makes for its dashboard.
    pub fn standard() -> Self {
        use MetricGroup::{Devices, Netinfo, Status, Usage, Wifi};

        Self {
            entries: vec![
                MethodDescriptor::new("zwrt_router.api", "router_get_status_no_auth", false, Status),
                MethodDescriptor::new("zwrt_router.api", "router_get_status", true, Status),
                MethodDescriptor::new("zte_nwinfo_api", "nwinfo_get_netinfo", false, Netinfo),
                MethodDescriptor::new("zwrt_data", "get_wwandst", true, Usage)
                    .with_args(json!({ "source_module": "web", "cid": 1, "type": 4 })),
                MethodDescriptor::new("zwrt_router.api", "router_get_user_list_num", true, Devices),
                MethodDescriptor::new("zwrt_wlan", "report", true, Wifi),
            ],
        }
    }

    pub fn entries(&self) -> &[MethodDescriptor] {
        &self.entries
    }

    /// The calls able to populate `group`, most preferred first: variants
    /// that need a session come before their unauthenticated fallbacks.
    pub fn variants(&self, group: MetricGroup) -> impl Iterator<Item = &MethodDescriptor> {
        let of_group = move |d: &&MethodDescriptor| d.group == group;
        let authed = self
            .entries
            .iter()
            .filter(of_group)
            .filter(|d| d.requires_auth);
        let open = self
            .entries
            .iter()
            .filter(of_group)
            .filter(|d| !d.requires_auth);
        authed.chain(open)
    }
}
