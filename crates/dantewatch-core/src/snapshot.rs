// ── Snapshot builder ──
//
// Turns cached raw properties into the published shape: grouped keys,
// display labels, `None` sentinels, and switch/dropdown controls.
// Every transform is a small pure function driven by the catalog.

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::warn;

use crate::model::catalog::{
    DEVICE_PROPERTIES, NONE, NUMBER_OF_DEVICES, PropertySpec, RECEIVE_CHANNEL_GROUP, SITE_NAME,
    Transform, UNICAST_FOLLOWER, UNICAST_LEADER,
};
use crate::model::{
    ControlDescriptor, DeviceRecord, Domain, FleetDevice, SiteStatus, Statistics,
};

const INPUT_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DISPLAY_DATETIME: &str = "%b %-d, %Y, %-I:%M %p";

// ── Devices ──────────────────────────────────────────────────────────

/// Build the published view of one cached device.
///
/// Offline devices keep their plain statistics but lose every control
/// and control-backed statistic.
pub fn build_device(record: &DeviceRecord) -> FleetDevice {
    let mut stats = Statistics::default();
    let mut control_stats = Statistics::default();

    for spec in DEVICE_PROPERTIES {
        apply_transform(spec, record, &mut stats, &mut control_stats);
    }

    if record.online {
        stats.statistics.extend(control_stats.statistics);
        stats.controls = control_stats.controls;
    }

    FleetDevice {
        device_id: record.device_id.clone(),
        device_name: record.device_name.clone(),
        device_model: record.device_model.clone(),
        online: record.online,
        properties: stats.statistics,
        controls: stats.controls,
    }
}

fn apply_transform(
    spec: &PropertySpec,
    record: &DeviceRecord,
    stats: &mut Statistics,
    control_stats: &mut Statistics,
) {
    let raw = record.property(spec.name);
    let key = spec.key();

    match spec.transform {
        Transform::Plain => stats.insert(key, or_none(raw)),
        Transform::ConnectedSince => stats.insert(key, connected_since(raw)),
        Transform::GrandLeader => stats.insert(key, grand_leader(raw)),
        Transform::MulticastRole => stats.insert(key, multicast_role(raw)),
        Transform::Unicast => stats.insert(
            key,
            unicast_role(
                record.property(UNICAST_LEADER),
                record.property(UNICAST_FOLLOWER),
            ),
        ),
        Transform::Toggle(control) => {
            if is_true(record.property(control.capability_key())) {
                control_stats.add_control(ControlDescriptor::switch(key, is_true(raw)));
            }
        }
        Transform::ReceiveChannels => receive_channels(&record.device_id, raw, stats),
    }
}

// ── Transforms ───────────────────────────────────────────────────────

fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}

fn or_none(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NONE)
}

/// `2024-03-13T02:28:00.000Z` → `Mar 13, 2024, 2:28 AM`. Unparseable → `None`.
pub fn connected_since(raw: Option<&str>) -> String {
    raw.and_then(|value| NaiveDateTime::parse_from_str(value, INPUT_DATETIME).ok())
        .map_or_else(
            || NONE.to_owned(),
            |at| at.format(DISPLAY_DATETIME).to_string(),
        )
}

pub fn grand_leader(raw: Option<&str>) -> &'static str {
    if is_true(raw) { "Grand Leader" } else { NONE }
}

pub fn multicast_role(raw: Option<&str>) -> &'static str {
    if is_true(raw) {
        "Multicast Leader"
    } else {
        "Multicast Follower"
    }
}

pub fn unicast_role(leader: Option<&str>, follower: Option<&str>) -> &'static str {
    match (is_true(leader), is_true(follower)) {
        (true, true) => "Unicast Leader, Unicast Follower",
        (true, false) => "Unicast Leader",
        (false, true) => "Unicast Follower",
        (false, false) => NONE,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiveChannel {
    name: Option<String>,
    subscribed_channel: Option<String>,
    subscribed_device: Option<String>,
}

/// One `ReceiveChannels#<name>` statistic per subscribed channel.
fn receive_channels(device_id: &str, raw: Option<&str>, stats: &mut Statistics) {
    let Some(raw) = raw.filter(|v| *v != NONE) else {
        return;
    };

    let channels: Vec<ReceiveChannel> = match serde_json::from_str(raw) {
        Ok(channels) => channels,
        Err(e) => {
            warn!(device_id, error = %e, "malformed receive channel list");
            return;
        }
    };

    for channel in channels {
        let (Some(name), Some(sub_channel), Some(sub_device)) = (
            channel.name,
            channel.subscribed_channel.filter(|s| !s.is_empty()),
            channel.subscribed_device.filter(|s| !s.is_empty()),
        ) else {
            continue;
        };
        stats.insert(
            format!("{RECEIVE_CHANNEL_GROUP}{name}"),
            format!("{sub_channel}@{sub_device}"),
        );
    }
}

// ── Site ─────────────────────────────────────────────────────────────

/// Site-level statistics for the selected domain.
///
/// `SiteName` becomes a dropdown over every known domain name when
/// there is more than one domain to choose from.
pub fn build_site_statistics(domains: &[Domain], current: &Domain) -> Statistics {
    let mut stats = Statistics::default();

    for status in <SiteStatus as strum::IntoEnumIterator>::iter() {
        stats.insert(status.name(), or_none(status.pick(&current.status)));
    }

    if domains.len() > 1 {
        let options = domains.iter().map(|d| d.name.clone()).collect();
        stats.add_control(ControlDescriptor::dropdown(
            SITE_NAME,
            options,
            current.name.clone(),
        ));
    } else {
        stats.insert(SITE_NAME, current.name.clone());
    }

    stats.insert(NUMBER_OF_DEVICES, current.device_ids.len().to_string());
    stats
}
