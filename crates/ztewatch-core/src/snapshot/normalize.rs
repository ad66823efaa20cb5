// ── Payload normalization ──
//
// The router reports most numbers as strings ("-95", "3"), sometimes as
// numbers, and uses "" for "not applicable". Fields are modelled
// explicitly where a consumer needs them; everything else lands in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `zwrt_router.api.router_get_status[_no_auth]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterStatus {
    #[serde(default, rename = "current_wan_status", deserialize_with = "opt_text")]
    pub wan_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `zte_nwinfo_api.nwinfo_get_netinfo` -- radio and operator details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(default, deserialize_with = "opt_text")]
    pub network_type: Option<String>,
    /// Signal bars as the router's UI shows them.
    #[serde(default, rename = "signalbar", deserialize_with = "opt_u64")]
    pub signal_bars: Option<u64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub lte_rsrp: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub lte_rsrq: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub lte_rssi: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub lte_snr: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub nr5g_rsrp: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub nr5g_rssi: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub nr5g_snr: Option<f64>,
    #[serde(default, rename = "network_provider_fullname", deserialize_with = "opt_text")]
    pub provider: Option<String>,
    #[serde(default, rename = "wan_active_band", deserialize_with = "opt_text")]
    pub active_band: Option<String>,
    #[serde(default, rename = "nr5g_action_band", deserialize_with = "opt_text")]
    pub nr5g_band: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub cell_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `zwrt_data.get_wwandst` -- live rates (bytes/s) and totals (bytes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataUsage {
    #[serde(default, rename = "real_tx_speed", deserialize_with = "opt_u64")]
    pub tx_rate: Option<u64>,
    #[serde(default, rename = "real_rx_speed", deserialize_with = "opt_u64")]
    pub rx_rate: Option<u64>,
    #[serde(default, rename = "real_tx_bytes", deserialize_with = "opt_u64")]
    pub tx_bytes: Option<u64>,
    #[serde(default, rename = "real_rx_bytes", deserialize_with = "opt_u64")]
    pub rx_bytes: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `zwrt_router.api.router_get_user_list_num`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCounts {
    #[serde(default, rename = "wireless_num", deserialize_with = "opt_u64")]
    pub wireless: Option<u64>,
    #[serde(default, rename = "lan_num", deserialize_with = "opt_u64")]
    pub lan: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceCounts {
    /// Wireless plus wired, when at least one is known.
    pub fn total(&self) -> Option<u64> {
        match (self.wireless, self.lan) {
            (None, None) => None,
            (w, l) => Some(w.unwrap_or(0).saturating_add(l.unwrap_or(0))),
        }
    }
}

/// `zwrt_wlan.report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiInfo {
    #[serde(default, rename = "wifi_onoff", deserialize_with = "opt_flag")]
    pub enabled: Option<bool>,
    #[serde(default, rename = "main2g_ssid", deserialize_with = "opt_text")]
    pub ssid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode one group's payload. Anything but a JSON object is rejected.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, String> {
    if !payload.is_object() {
        return Err(format!("expected an object, got {}", kind(&payload)));
    }
    serde_json::from_value(payload).map_err(|e| e.to_string())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Lenient field decoders ──────────────────────────────────────────

fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_u64().map(|n| n != 0),
        Some(Value::String(s)) => match s.trim() {
            "1" | "on" | "true" => Some(true),
            "0" | "off" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
