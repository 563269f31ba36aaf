// ── Device model ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stats::ControlDescriptor;

/// Cached state of one device, as extracted from the last refresh.
///
/// `properties` holds raw strings keyed by catalog name (no group
/// prefix); display transforms happen in the snapshot builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub domain_id: String,
    pub device_name: Option<String>,
    pub device_model: Option<String>,
    pub online: bool,
    pub properties: BTreeMap<String, String>,
}

impl DeviceRecord {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Normalized per-device output handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetDevice {
    pub device_id: String,
    pub device_name: Option<String>,
    pub device_model: Option<String>,
    pub online: bool,
    pub properties: BTreeMap<String, String>,
    pub controls: Vec<ControlDescriptor>,
}
