// ── Bulk refresh application ──
//
// Applies a completed collection cycle to the cache, then notifies
// subscribers of the refresh time.

use chrono::Utc;
use tracing::debug;

use super::DeviceCache;
use crate::extract::DomainBatch;

impl DeviceCache {
    /// Apply every domain batch from one collection cycle.
    pub(crate) fn apply_refresh(&self, batches: Vec<DomainBatch>) {
        let domains = batches.len();
        for batch in batches {
            self.replace_domain(&batch.domain_id, batch.records);
        }
        self.last_refresh.send_replace(Some(Utc::now()));
        debug!(domains, devices = self.len(), "cache refresh applied");
    }
}
