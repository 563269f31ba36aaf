// ── Device cache ──
//
// Per-device property maps keyed by device id, in first-seen order.
// All access goes through one short-lived mutex; callers receive owned
// copies so no lock is held across an await or a transform.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::debug;

use crate::model::DeviceRecord;

/// Shared device cache written by the collection loop and read by
/// snapshot and control paths.
pub struct DeviceCache {
    records: Mutex<IndexMap<String, DeviceRecord>>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceCache {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            records: Mutex::new(IndexMap::new()),
            last_refresh,
        }
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, DeviceRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert or overwrite each record by id.
    ///
    /// Devices not present in `records` are left untouched, so a domain
    /// that drops a device keeps the stale entry until the id is reused.
    pub fn replace_domain(&self, domain_id: &str, records: Vec<DeviceRecord>) {
        let mut map = self.lock();
        let count = records.len();
        for mut record in records {
            if record.device_id.is_empty() {
                continue;
            }
            record.domain_id = domain_id.to_owned();
            map.insert(record.device_id.clone(), record);
        }
        debug!(domain_id, devices = count, "domain cached");
    }

    /// Set one property on a cached device. Returns `false` for unknown ids.
    pub fn update_property(&self, device_id: &str, key: &str, value: &str) -> bool {
        match self.lock().get_mut(device_id) {
            Some(record) => {
                record.properties.insert(key.to_owned(), value.to_owned());
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
        self.last_refresh.send_replace(None);
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Owned copy of every cached device.
    pub fn read_all(&self) -> Vec<DeviceRecord> {
        self.lock().values().cloned().collect()
    }

    pub fn get(&self, device_id: &str) -> Option<DeviceRecord> {
        self.lock().get(device_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // ── Refresh tracking ─────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Subscribe to completed refreshes.
    pub fn subscribe_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}

impl Default for DeviceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn record(id: &str, location: &str) -> DeviceRecord {
        DeviceRecord {
            device_id: id.into(),
            domain_id: String::new(),
            device_name: Some(format!("{id}-name")),
            device_model: None,
            online: true,
            properties: BTreeMap::from([("Location".to_owned(), location.to_owned())]),
        }
    }

    #[test]
    fn replace_domain_is_idempotent() {
        let cache = DeviceCache::new();
        let batch = vec![record("dev-1", "FOH"), record("dev-2", "Stage")];

        cache.replace_domain("dom-a", batch.clone());
        let first = cache.read_all();
        cache.replace_domain("dom-a", batch);

        assert_eq!(cache.read_all(), first);
        assert_eq!(first[0].domain_id, "dom-a");
    }

    #[test]
    fn replace_domain_keeps_other_devices() {
        let cache = DeviceCache::new();
        cache.replace_domain("dom-a", vec![record("dev-1", "FOH")]);
        cache.replace_domain("dom-b", vec![record("dev-2", "Stage")]);
        cache.replace_domain("dom-a", vec![record("dev-1", "Booth")]);

        let all = cache.read_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].property("Location"), Some("Booth"));
        assert_eq!(all[1].device_id, "dev-2");
    }

    #[test]
    fn update_property_on_unknown_device_is_noop() {
        let cache = DeviceCache::new();
        cache.replace_domain("dom-a", vec![record("dev-1", "FOH")]);

        assert!(!cache.update_property("ghost", "PreferredLeader", "true"));
        assert!(cache.update_property("dev-1", "PreferredLeader", "true"));
        assert_eq!(
            cache.get("dev-1").unwrap().property("PreferredLeader"),
            Some("true")
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn read_all_returns_detached_copies() {
        let cache = DeviceCache::new();
        cache.replace_domain("dom-a", vec![record("dev-1", "FOH")]);

        let mut copy = cache.read_all();
        copy[0].properties.insert("Location".into(), "Elsewhere".into());

        assert_eq!(cache.get("dev-1").unwrap().property("Location"), Some("FOH"));
    }

    #[test]
    fn clear_empties_cache_and_refresh_marker() {
        let cache = DeviceCache::new();
        cache.apply_refresh(Vec::new());
        cache.replace_domain("dom-a", vec![record("dev-1", "FOH")]);
        assert!(cache.last_refresh().is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.last_refresh().is_none());
    }
}
