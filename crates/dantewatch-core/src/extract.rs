// ── Raw response extraction ──
//
// Converts untouched Director device payloads into `DeviceRecord`s.
// Every cached property is located by a JSON pointer from the table
// below; missing or null nodes are simply absent from the record.

use std::collections::BTreeMap;

use dantewatch_api::types::{DomainDevices, DomainSummary};
use serde_json::Value;
use tracing::debug;

use crate::model::catalog::{NONE, UNICAST_FOLLOWER, UNICAST_LEADER};
use crate::model::{DeviceRecord, Domain, DomainStatus};

/// Cache key → JSON pointer into a raw device node.
const PROPERTY_POINTERS: &[(&str, &str)] = &[
    ("Manufacturer", "/manufacturer/name"),
    ("ProductVersion", "/identity/productVersion"),
    ("ConnectedSince(GMT)", "/connection/lastChanged"),
    ("EnrolmentState", "/enrolmentState"),
    ("Clocking", "/status/clocking"),
    ("Connectivity", "/status/connectivity"),
    ("Latency", "/status/latency"),
    ("Subscriptions", "/status/subscriptions"),
    ("Location", "/location"),
    ("Description", "/description"),
    ("Comments", "/comments"),
    ("DiscoveryType", "/discovery/type"),
    ("DiscoveryDomainName", "/discovery/fqdn"),
    ("IPAddress", "/interfaces/0/address"),
    ("MACAddress", "/interfaces/0/macAddress"),
    ("DanteSoftwareVersion", "/identity/productSoftwareVersion"),
    ("DanteVersion", "/identity/danteVersion"),
    ("SiteName", "/domain/name"),
    ("MuteStatus", "/clockingState/muteStatus"),
    ("SyncStatus", "/clockingState/locked"),
    ("DomainClocking", "/clockingState/grandLeader"),
    ("PrimaryMulticast", "/clockingState/multicastLeader"),
    (UNICAST_FOLLOWER, "/clockingState/unicastFollower"),
    (UNICAST_LEADER, "/clockingState/unicastLeader"),
    ("FrequencyOffset(ppm)", "/clockingState/frequencyOffset"),
    ("SyncToExternalWordClock", "/clockPreferences/externalWordClock"),
    ("PreferredLeader", "/clockPreferences/leader"),
    ("UnicastClocking", "/clockPreferences/unicastClocking"),
    ("V1DelayRequests", "/clockPreferences/v1UnicastDelayRequests"),
    ("ExtWordClockCapability", "/capabilities/CAN_WRITE_EXT_WORD_CLOCK"),
    ("LeaderCapability", "/capabilities/CAN_WRITE_PREFERRED_MASTER"),
    ("UnicastClockingCapability", "/capabilities/CAN_UNICAST_CLOCKING"),
    (
        "V1DelayRequestsCapability",
        "/capabilities/CAN_WRITE_UNICAST_DELAY_REQUESTS",
    ),
    ("ReceiveChannels", "/rxChannels"),
];

/// Connection state that marks a device online.
const ONLINE_STATE: &str = "ONLINE";

/// Records extracted from one domain's device list.
#[derive(Debug, Clone)]
pub struct DomainBatch {
    pub domain_id: String,
    pub records: Vec<DeviceRecord>,
}

// ── Public entry points ─────────────────────────────────────────────

/// Extract every domain's devices. Devices without an id are dropped.
pub fn extract_batches(domains: &[DomainDevices]) -> Vec<DomainBatch> {
    domains
        .iter()
        .map(|domain| DomainBatch {
            domain_id: domain.id.clone(),
            records: domain
                .devices
                .iter()
                .filter_map(|raw| extract_device(&domain.id, raw))
                .collect(),
        })
        .collect()
}

/// Extract a single device node.
pub fn extract_device(domain_id: &str, raw: &Value) -> Option<DeviceRecord> {
    let Some(device_id) = text(raw, "/id") else {
        debug!(domain_id, "skipping device without id");
        return None;
    };

    let properties: BTreeMap<String, String> = PROPERTY_POINTERS
        .iter()
        .filter_map(|(key, pointer)| {
            raw.pointer(pointer)
                .and_then(render)
                .map(|value| ((*key).to_owned(), value))
        })
        .collect();

    let online = raw
        .pointer("/connection/state")
        .and_then(Value::as_str)
        .is_some_and(|state| state.eq_ignore_ascii_case(ONLINE_STATE));

    Some(DeviceRecord {
        device_id,
        domain_id: domain_id.to_owned(),
        device_name: text(raw, "/name"),
        device_model: text(raw, "/identity/productModelName"),
        online,
        properties,
    })
}

/// Non-empty string at `pointer`.
fn text(raw: &Value, pointer: &str) -> Option<String> {
    raw.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Render a node as a cache string. Empty strings become `None` and
/// containers become JSON text.
fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => Some(NONE.to_owned()),
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

// ── Domain summaries ────────────────────────────────────────────────

impl From<DomainSummary> for Domain {
    fn from(summary: DomainSummary) -> Self {
        Domain {
            id: summary.id,
            name: summary.name,
            device_ids: summary.devices.into_iter().map(|d| d.id).collect(),
            status: DomainStatus {
                clocking: summary.status.clocking,
                connectivity: summary.status.connectivity,
                latency: summary.status.latency,
                subscriptions: summary.status.subscriptions,
            },
        }
    }
}
