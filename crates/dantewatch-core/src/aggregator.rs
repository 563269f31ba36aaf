// ── Aggregator ──
//
// Lifecycle and public surface for one Dante Director endpoint.
// Owns the collection loop, the device cache, the activity gate, and
// the site selection. Snapshot builds and controls are serialized by
// the site lock; the cache has its own finer-grained lock.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use dantewatch_api::{DirectorClient, TlsMode, TransportConfig};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::activity::ActivityGate;
use crate::config::{DirectorConfig, TlsVerification};
use crate::control::{self, ControlOutcome, ControlRequest};
use crate::error::CoreError;
use crate::extract;
use crate::model::{Domain, FleetDevice, SiteSelection, Statistics};
use crate::snapshot;
use crate::store::DeviceCache;

// ── Aggregator ───────────────────────────────────────────────────────

/// Entry point for hosts.
///
/// Cheaply cloneable via `Arc<AggregatorInner>`. Nothing runs until
/// [`start()`](Self::start) or the first [`get_fleet()`](Self::get_fleet).
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<AggregatorInner>,
}

struct AggregatorInner {
    config: DirectorConfig,
    client: DirectorClient,
    cache: Arc<DeviceCache>,
    activity: ActivityGate,
    /// Outer lock: snapshot builds, controls, and shutdown.
    sites: Mutex<SiteSelection>,
    last_statistics: ArcSwapOption<Statistics>,
    cancel: CancellationToken,
    /// Child token for the current run; cancelled on stop, replaced on start.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Aggregator {
    /// Build the HTTP client from `config`. Does not contact the Director.
    pub fn new(config: DirectorConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let client =
            DirectorClient::from_api_key(config.url.as_str(), &config.api_key, &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client (auth headers are the caller's concern).
    pub fn with_client(config: DirectorConfig, client: DirectorClient) -> Self {
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let activity = ActivityGate::new(config.inactivity_window);

        Self {
            inner: Arc::new(AggregatorInner {
                config,
                client,
                cache: Arc::new(DeviceCache::new()),
                activity,
                sites: Mutex::new(SiteSelection::default()),
                last_statistics: ArcSwapOption::empty(),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &Arc<DeviceCache> {
        &self.inner.cache
    }

    pub fn activity(&self) -> &ActivityGate {
        &self.inner.activity
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the collection loop. No-op while a loop is already running.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if handles.iter().any(|h| !h.is_finished()) {
            return;
        }
        handles.clear();

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        handles.push(tokio::spawn(collection_task(self.clone(), child)));
        info!(url = %self.inner.config.url, "collection loop started");
    }

    /// Stop the collection loop and drop all cached state.
    ///
    /// An in-flight fetch is abandoned before it reaches the cache.
    /// Holds the task lock until the reset is done, so a concurrent
    /// [`start()`](Self::start) only spawns against cleared state.
    pub async fn stop(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        self.inner.cancel_child.lock().await.cancel();

        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "collection task ended abnormally");
            }
        }

        let mut sites = self.inner.sites.lock().await;
        sites.clear();
        self.inner.cache.clear();
        self.inner.last_statistics.store(None);
        self.inner.activity.reset();
        drop(sites);
        drop(handles);
        debug!("aggregator stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.inner
            .task_handles
            .lock()
            .await
            .iter()
            .any(|h| !h.is_finished())
    }

    // ── Public surface ───────────────────────────────────────────────

    /// Fetch domains and build site-level statistics for the selected site.
    ///
    /// The first call selects the first domain returned.
    pub async fn get_snapshot(&self) -> Result<Statistics, CoreError> {
        let mut sites = self.inner.sites.lock().await;

        let domains = self.inner.client.list_domains().await?;
        if domains.is_empty() {
            return Err(CoreError::Unreachable {
                message: "account is empty".into(),
            });
        }
        sites.replace(domains.into_iter().map(Domain::from).collect());

        let Some(current) = sites.current() else {
            return Err(CoreError::Unreachable {
                message: "no site selected".into(),
            });
        };
        let stats = snapshot::build_site_statistics(sites.domains(), current);
        self.inner
            .last_statistics
            .store(Some(Arc::new(stats.clone())));

        Ok(stats)
    }

    /// Statistics published by the last successful [`get_snapshot()`](Self::get_snapshot).
    pub fn last_statistics(&self) -> Option<Arc<Statistics>> {
        self.inner.last_statistics.load_full()
    }

    /// Normalized devices from the cache, optionally restricted to `ids`.
    ///
    /// Starts the collection loop if needed and marks the host active.
    /// Returns an empty list until the first refresh has completed.
    pub async fn get_fleet(&self, ids: Option<&[String]>) -> Vec<FleetDevice> {
        self.start().await;
        self.inner.activity.touch();

        let _sites = self.inner.sites.lock().await;
        self.inner
            .cache
            .read_all()
            .iter()
            .filter(|record| ids.is_none_or(|ids| ids.contains(&record.device_id)))
            .map(snapshot::build_device)
            .collect()
    }

    /// Apply one control request.
    pub async fn apply_control(
        &self,
        request: &ControlRequest,
    ) -> Result<ControlOutcome, CoreError> {
        let mut sites = self.inner.sites.lock().await;
        control::dispatch(&self.inner.client, &self.inner.cache, &mut sites, request).await
    }

    /// Apply each request independently; one failure never stops the rest.
    pub async fn apply_controls(
        &self,
        requests: &[ControlRequest],
    ) -> Result<Vec<Result<ControlOutcome, CoreError>>, CoreError> {
        if requests.is_empty() {
            return Err(CoreError::invalid("control batch is empty"));
        }

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = self.apply_control(request).await;
            if let Err(ref e) = result {
                error!(
                    device_id = request.device_id.as_deref().unwrap_or("-"),
                    property = %request.property,
                    error = %e,
                    "control failed"
                );
            }
            results.push(result);
        }
        Ok(results)
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch every device and apply the result to the cache.
    ///
    /// The cache is only touched once the whole response is extracted.
    pub async fn full_refresh(&self) -> Result<usize, CoreError> {
        let domains = self.inner.client.list_domain_devices().await?;
        let batches = extract::extract_batches(&domains);
        let devices = batches.iter().map(|b| b.records.len()).sum();
        self.inner.cache.apply_refresh(batches);
        Ok(devices)
    }

    /// Subscribe to completed refreshes.
    pub fn refreshed(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.cache.subscribe_refresh()
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

// ── Collection loop ──────────────────────────────────────────────────

/// Decides whether a tick should trigger a refresh.
///
/// Refreshes happen only while the host is active, at most once per
/// `interval`, and immediately after activity resumes.
#[derive(Debug)]
struct RefreshSchedule {
    interval: Duration,
    next: Instant,
    active: bool,
}

impl RefreshSchedule {
    fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
            active: false,
        }
    }

    fn due(&mut self, active: bool, now: Instant) -> bool {
        if !active {
            self.active = false;
            return false;
        }
        if !self.active {
            self.active = true;
            self.next = now;
        }
        now >= self.next
    }

    fn completed(&mut self, now: Instant) {
        self.next = now + self.interval;
    }
}

async fn collection_task(aggregator: Aggregator, cancel: CancellationToken) {
    let config = &aggregator.inner.config;
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut schedule = RefreshSchedule::new(config.refresh_interval, Instant::now());

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if !schedule.due(aggregator.inner.activity.is_active(), Instant::now()) {
            continue;
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = aggregator.full_refresh() => match result {
                Ok(devices) => debug!(devices, "device refresh complete"),
                Err(e) => warn!(error = %e, "device refresh failed"),
            },
        }
        schedule.completed(Instant::now());
    }

    debug!("collection loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(30);

    #[test]
    fn idle_schedule_never_fires() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(INTERVAL, start);
        assert!(!schedule.due(false, start));
        assert!(!schedule.due(false, start + INTERVAL * 4));
    }

    #[test]
    fn fires_immediately_then_throttles() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(INTERVAL, start);

        assert!(schedule.due(true, start));
        schedule.completed(start);

        assert!(!schedule.due(true, start + Duration::from_secs(29)));
        assert!(schedule.due(true, start + INTERVAL));
    }

    #[test]
    fn resuming_activity_fires_right_away() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(INTERVAL, start);
        assert!(schedule.due(true, start));
        schedule.completed(start);

        let later = start + Duration::from_secs(5);
        assert!(!schedule.due(false, later));
        assert!(schedule.due(true, later + Duration::from_secs(1)));
    }
}
