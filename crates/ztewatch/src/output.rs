//! Output formatting: table, JSON, YAML, plain.
//!
//! Table uses `tabled`, structured formats serialize the `Snapshot`
//! as-is, plain emits one `group<TAB>state<TAB>summary` line per group.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use strum::IntoEnumIterator;
use tabled::{Table, Tabled, settings::Style};

use ztewatch_core::{
    DataUsage, DeviceCounts, GroupState, MetricGroup, NetworkInfo, RouterStatus, Snapshot,
    WifiInfo,
};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(plain_fn(data)),
    }
}

/// Render a snapshot in the chosen format.
pub fn render_snapshot(
    format: OutputFormat,
    snapshot: &Snapshot,
    color: bool,
) -> Result<String, CliError> {
    render_single(
        format,
        snapshot,
        |s| snapshot_table(s, color),
        snapshot_plain,
    )
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Snapshot views ───────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "GROUP")]
    group: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "DETAILS")]
    details: String,
}

fn snapshot_table(snapshot: &Snapshot, color: bool) -> String {
    let rows: Vec<GroupRow> = MetricGroup::iter()
        .map(|group| GroupRow {
            group: group.to_string(),
            state: state_label(snapshot.group_state(group), color),
            details: details(snapshot, group),
        })
        .collect();

    let header = format!(
        "cycle {} at {}{}",
        snapshot.cycle,
        snapshot
            .taken_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S"),
        if snapshot.authenticated {
            " (authenticated)"
        } else {
            ""
        }
    );
    format!("{header}\n{}", Table::new(rows).with(Style::rounded()))
}

fn snapshot_plain(snapshot: &Snapshot) -> String {
    MetricGroup::iter()
        .map(|group| {
            format!(
                "{group}\t{}\t{}",
                state_label(snapshot.group_state(group), false),
                details(snapshot, group)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn state_label(state: GroupState, color: bool) -> String {
    match state {
        GroupState::Fresh if color => "ok".green().to_string(),
        GroupState::Fresh => "ok".into(),
        GroupState::NotConfigured if color => "not configured".dimmed().to_string(),
        GroupState::NotConfigured => "not configured".into(),
        GroupState::Unavailable(cause) if color => format!("unavailable ({cause})").red().to_string(),
        GroupState::Unavailable(cause) => format!("unavailable ({cause})"),
    }
}

fn details(snapshot: &Snapshot, group: MetricGroup) -> String {
    let summary = match group {
        MetricGroup::Status => snapshot.status.as_ref().map(status_summary),
        MetricGroup::Netinfo => snapshot.network.as_ref().map(network_summary),
        MetricGroup::Usage => snapshot.usage.as_ref().map(usage_summary),
        MetricGroup::Devices => snapshot.devices.as_ref().map(devices_summary),
        MetricGroup::Wifi => snapshot.wifi.as_ref().map(wifi_summary),
    };
    summary
        .or_else(|| snapshot.error(group).map(|e| e.message.clone()))
        .unwrap_or_default()
}

fn status_summary(status: &RouterStatus) -> String {
    format!("wan {}", status.wan_status.as_deref().unwrap_or("?"))
}

fn network_summary(net: &NetworkInfo) -> String {
    let mut parts = Vec::new();
    if let Some(kind) = &net.network_type {
        parts.push(kind.clone());
    }
    if let Some(provider) = &net.provider {
        parts.push(provider.clone());
    }
    if let Some(bars) = net.signal_bars {
        parts.push(format!("{bars} bars"));
    }
    if let Some(rsrp) = net.nr5g_rsrp {
        parts.push(format!("5G RSRP {rsrp} dBm"));
    }
    if let Some(rsrp) = net.lte_rsrp {
        parts.push(format!("LTE RSRP {rsrp} dBm"));
    }
    if let Some(band) = net.nr5g_band.as_ref().or(net.active_band.as_ref()) {
        parts.push(format!("band {band}"));
    }
    parts.join(", ")
}

fn usage_summary(usage: &DataUsage) -> String {
    format!(
        "down {} up {} (total {} / {})",
        rate(usage.rx_rate),
        rate(usage.tx_rate),
        bytes(usage.rx_bytes),
        bytes(usage.tx_bytes),
    )
}

fn devices_summary(devices: &DeviceCounts) -> String {
    format!(
        "{} wireless, {} wired",
        count(devices.wireless),
        count(devices.lan)
    )
}

fn wifi_summary(wifi: &WifiInfo) -> String {
    let state = match wifi.enabled {
        Some(true) => "on",
        Some(false) => "off",
        None => "?",
    };
    match &wifi.ssid {
        Some(ssid) => format!("{state}, ssid {ssid}"),
        None => state.into(),
    }
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| "?".into(), |n| n.to_string())
}

fn rate(value: Option<u64>) -> String {
    value.map_or_else(|| "?".into(), |n| format!("{}/s", bytes_human(n)))
}

fn bytes(value: Option<u64>) -> String {
    value.map_or_else(|| "?".into(), bytes_human)
}

#[allow(clippy::cast_precision_loss)]
fn bytes_human(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}
