#![allow(clippy::unwrap_used)]
// Integration tests for `Aggregator` against a wiremock Director.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dantewatch_core::{
    Aggregator, ClockControl, ControlOutcome, ControlRequest, CoreError, DirectorConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> DirectorConfig {
    let mut config = DirectorConfig::new(
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("test-key".to_owned()),
    );
    config.poll_interval = Duration::from_millis(10);
    config.refresh_interval = Duration::from_secs(3600);
    config.timeout = Duration::from_secs(5);
    config
}

fn domains_body() -> Value {
    json!({
        "data": {
            "domains": [
                {
                    "id": "dom-a",
                    "name": "Site A",
                    "devices": [{ "id": "dev-1" }, { "id": "dev-2" }],
                    "status": { "clocking": "OK", "connectivity": "OK", "latency": "OK", "subscriptions": "WARNING" }
                },
                {
                    "id": "dom-b",
                    "name": "Site B",
                    "devices": [{ "id": "dev-3" }],
                    "status": { "clocking": "ERROR", "connectivity": null, "latency": "OK", "subscriptions": "OK" }
                }
            ]
        }
    })
}

fn device(id: &str, leader_capable: bool) -> Value {
    json!({
        "id": id,
        "name": format!("{id}-name"),
        "connection": { "state": "ONLINE", "lastChanged": "2024-03-13T02:28:00.000Z" },
        "identity": { "productModelName": "AVIO-AI2" },
        "capabilities": {
            "CAN_WRITE_PREFERRED_MASTER": leader_capable,
            "CAN_WRITE_EXT_WORD_CLOCK": true,
            "CAN_UNICAST_CLOCKING": false,
            "CAN_WRITE_UNICAST_DELAY_REQUESTS": false
        },
        "clockingState": { "unicastLeader": true, "unicastFollower": true },
        "clockPreferences": {
            "externalWordClock": false,
            "leader": false,
            "unicastClocking": false,
            "v1UnicastDelayRequests": false
        }
    })
}

fn devices_body() -> Value {
    json!({
        "data": {
            "domains": [
                { "id": "dom-a", "name": "Site A", "devices": [device("dev-1", true), device("dev-2", false)] },
                { "id": "dom-b", "name": "Site B", "devices": [device("dev-3", true)] }
            ]
        }
    })
}

async fn mount_domains(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_devices(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_body()))
        .mount(server)
        .await;
}

async fn mount_mutation(server: &MockServer, mutation: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains(mutation))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { mutation: { "ok": true } } })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Trigger the collection loop and wait for the first refresh to land.
async fn primed(server: &MockServer) -> Aggregator {
    mount_devices(server).await;
    let aggregator = Aggregator::new(config(server)).unwrap();
    let mut refreshed = aggregator.refreshed();

    assert!(aggregator.get_fleet(None).await.is_empty());

    tokio::time::timeout(Duration::from_secs(5), refreshed.wait_for(Option::is_some))
        .await
        .unwrap()
        .unwrap();
    aggregator
}

// ── Site statistics ─────────────────────────────────────────────────

#[tokio::test]
async fn test_snapshot_selects_first_site() {
    let server = MockServer::start().await;
    mount_domains(&server, domains_body()).await;
    let aggregator = Aggregator::new(config(&server)).unwrap();

    let stats = aggregator.get_snapshot().await.unwrap();

    assert_eq!(stats.get("SiteName"), Some("Site A"));
    assert_eq!(stats.get("NumberOfDevices"), Some("2"));
    assert_eq!(stats.get("Subscriptions"), Some("WARNING"));
    assert_eq!(stats.controls.len(), 1);
    assert!(aggregator.last_statistics().is_some());
}

#[tokio::test]
async fn test_site_control_switches_selected_domain() {
    let server = MockServer::start().await;
    mount_domains(&server, domains_body()).await;
    let aggregator = Aggregator::new(config(&server)).unwrap();
    aggregator.get_snapshot().await.unwrap();

    let outcome = aggregator
        .apply_control(&ControlRequest::site("Site B"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ControlOutcome::SiteSelected {
            domain_id: "dom-b".into(),
            name: "Site B".into()
        }
    );

    let stats = aggregator.get_snapshot().await.unwrap();
    assert_eq!(stats.get("SiteName"), Some("Site B"));
    assert_eq!(stats.get("NumberOfDevices"), Some("1"));
    assert_eq!(stats.get("Connectivity"), Some("None"));
}

#[tokio::test]
async fn test_unknown_site_is_invalid_argument() {
    let server = MockServer::start().await;
    mount_domains(&server, domains_body()).await;
    let aggregator = Aggregator::new(config(&server)).unwrap();
    aggregator.get_snapshot().await.unwrap();

    let result = aggregator
        .apply_control(&ControlRequest::site("Site Z"))
        .await;
    assert!(matches!(result, Err(CoreError::InvalidArgument { .. })), "got: {result:?}");

    let stats = aggregator.get_snapshot().await.unwrap();
    assert_eq!(stats.get("SiteName"), Some("Site A"));
}

#[tokio::test]
async fn test_empty_account_is_unreachable() {
    let server = MockServer::start().await;
    mount_domains(&server, json!({ "data": { "domains": [] } })).await;
    let aggregator = Aggregator::new(config(&server)).unwrap();

    let result = aggregator.get_snapshot().await;
    assert!(matches!(result, Err(CoreError::Unreachable { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_unauthenticated_is_authentication_failure() {
    let server = MockServer::start().await;
    mount_domains(
        &server,
        json!({
            "data": null,
            "errors": [{ "message": "Not authenticated", "extensions": { "code": "UNAUTHENTICATED" } }]
        }),
    )
    .await;
    let aggregator = Aggregator::new(config(&server)).unwrap();

    let result = aggregator.get_snapshot().await;
    assert!(
        matches!(result, Err(CoreError::AuthenticationFailed { .. })),
        "got: {result:?}"
    );
}

// ── Fleet ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fleet_populates_after_first_refresh() {
    let server = MockServer::start().await;
    let aggregator = primed(&server).await;

    assert!(aggregator.is_running().await);
    let fleet = aggregator.get_fleet(None).await;
    assert_eq!(fleet.len(), 3);

    let dev1 = &fleet[0];
    assert_eq!(dev1.device_id, "dev-1");
    assert_eq!(dev1.device_model.as_deref(), Some("AVIO-AI2"));
    assert_eq!(dev1.properties["ConnectedSince(GMT)"], "Mar 13, 2024, 2:28 AM");
    assert_eq!(
        dev1.properties["ClockSynchronisation#Unicast"],
        "Unicast Leader, Unicast Follower"
    );
    assert!(dev1.properties.values().all(|v| !v.is_empty()));

    aggregator.stop().await;
}

#[tokio::test]
async fn test_fleet_filters_by_id() {
    let server = MockServer::start().await;
    let aggregator = primed(&server).await;

    let ids = vec!["dev-3".to_owned(), "missing".to_owned()];
    let fleet = aggregator.get_fleet(Some(&ids)).await;

    assert_eq!(fleet.len(), 1);
    assert_eq!(fleet[0].device_id, "dev-3");

    aggregator.stop().await;
}

#[tokio::test]
async fn test_stop_clears_state_and_restart_works() {
    let server = MockServer::start().await;
    mount_domains(&server, domains_body()).await;
    let aggregator = primed(&server).await;
    aggregator.get_snapshot().await.unwrap();

    aggregator.stop().await;
    assert!(!aggregator.is_running().await);
    assert!(aggregator.cache().is_empty());
    assert!(aggregator.last_statistics().is_none());
    assert!(!aggregator.activity().is_active());

    let mut refreshed = aggregator.refreshed();
    assert!(aggregator.get_fleet(None).await.is_empty());
    tokio::time::timeout(Duration::from_secs(5), refreshed.wait_for(Option::is_some))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(aggregator.get_fleet(None).await.len(), 3);

    aggregator.stop().await;
}

#[tokio::test]
async fn test_stop_racing_fleet_read_never_leaves_idle_loop() {
    let server = MockServer::start().await;
    mount_devices(&server).await;
    let aggregator = Aggregator::new(config(&server)).unwrap();

    for _ in 0..3 {
        tokio::join!(aggregator.stop(), aggregator.get_fleet(None));

        // A loop that survives stop() must have been started after the reset.
        assert!(!aggregator.is_running().await || aggregator.activity().is_active());
    }

    aggregator.stop().await;
}

// ── Collection loop ─────────────────────────────────────────────────

fn device_fetches(requests: &[wiremock::Request]) -> usize {
    requests
        .iter()
        .filter(|r| String::from_utf8_lossy(&r.body).contains("query Devices"))
        .count()
}

#[tokio::test]
async fn test_idle_loop_makes_no_remote_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_body()))
        .expect(0)
        .mount(&server)
        .await;
    let aggregator = Aggregator::new(config(&server)).unwrap();

    aggregator.start().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(aggregator.is_running().await);
    assert!(!aggregator.activity().is_active());
    assert!(aggregator.cache().is_empty());
    assert_eq!(device_fetches(&server.received_requests().await.unwrap()), 0);

    aggregator.stop().await;
}

#[tokio::test]
async fn test_failed_refresh_keeps_cache_and_loop() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_body()))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Devices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("director down"))
        .with_priority(2)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.refresh_interval = Duration::from_millis(20);
    let aggregator = Aggregator::new(config).unwrap();
    let mut refreshed = aggregator.refreshed();

    assert!(aggregator.get_fleet(None).await.is_empty());
    tokio::time::timeout(Duration::from_secs(5), refreshed.wait_for(Option::is_some))
        .await
        .unwrap()
        .unwrap();
    let first_refresh = *refreshed.borrow();

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(device_fetches(&server.received_requests().await.unwrap()) >= 3);
    assert!(aggregator.is_running().await);
    assert_eq!(*refreshed.borrow(), first_refresh);

    let fleet = aggregator.get_fleet(None).await;
    assert_eq!(fleet.len(), 3);
    assert_eq!(fleet[0].device_name.as_deref(), Some("dev-1-name"));

    aggregator.stop().await;
}

// ── Device controls ─────────────────────────────────────────────────

#[tokio::test]
async fn test_control_updates_cache_optimistically() {
    let server = MockServer::start().await;
    mount_mutation(&server, "DeviceClockingPreferredLeaderSet", 1).await;
    let aggregator = primed(&server).await;

    let before = aggregator.get_fleet(None).await;
    assert_eq!(before[0].properties["ClockSynchronisation#PreferredLeader"], "0");

    let outcome = aggregator
        .apply_control(&ControlRequest::device(
            "dev-1",
            "ClockSynchronisation#PreferredLeader",
            "1",
        ))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ControlOutcome::Applied {
            device_id: "dev-1".into(),
            control: ClockControl::PreferredLeader,
            enabled: true
        }
    );

    let after = aggregator.get_fleet(None).await;
    assert_eq!(after[0].properties["ClockSynchronisation#PreferredLeader"], "1");

    aggregator.stop().await;
}

#[tokio::test]
async fn test_control_without_capability_is_ignored() {
    let server = MockServer::start().await;
    mount_mutation(&server, "DeviceClockingPreferredLeaderSet", 0).await;
    let aggregator = primed(&server).await;

    let outcome = aggregator
        .apply_control(&ControlRequest::device("dev-2", "PreferredLeader", "1"))
        .await
        .unwrap();
    assert!(matches!(outcome, ControlOutcome::Ignored { .. }), "got: {outcome:?}");

    let record = aggregator.cache().get("dev-2").unwrap();
    assert_eq!(record.property("PreferredLeader"), Some("false"));

    aggregator.stop().await;
}

#[tokio::test]
async fn test_unsupported_property_is_ignored() {
    let server = MockServer::start().await;
    let aggregator = primed(&server).await;

    let outcome = aggregator
        .apply_control(&ControlRequest::device("dev-1", "Location", "1"))
        .await
        .unwrap();
    assert!(matches!(outcome, ControlOutcome::Ignored { .. }));

    aggregator.stop().await;
}

#[tokio::test]
async fn test_control_on_unknown_device_is_invalid_argument() {
    let server = MockServer::start().await;
    let aggregator = primed(&server).await;

    let result = aggregator
        .apply_control(&ControlRequest::device("ghost", "PreferredLeader", "1"))
        .await;
    assert!(matches!(result, Err(CoreError::InvalidArgument { .. })), "got: {result:?}");

    aggregator.stop().await;
}

#[tokio::test]
async fn test_remote_error_is_control_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("DeviceClockingSyncToExternalSet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "device rejected request" }]
        })))
        .mount(&server)
        .await;
    let aggregator = primed(&server).await;

    let result = aggregator
        .apply_control(&ControlRequest::device("dev-1", "syncToExternalWordClock", "1"))
        .await;

    match result {
        Err(CoreError::ControlFailed { property, label, reason }) => {
            assert_eq!(property, "SyncToExternalWordClock");
            assert_eq!(label, "On");
            assert!(reason.contains("device rejected request"));
        }
        other => panic!("expected ControlFailed, got: {other:?}"),
    }
    let record = aggregator.cache().get("dev-1").unwrap();
    assert_eq!(record.property("SyncToExternalWordClock"), Some("false"));

    aggregator.stop().await;
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let server = MockServer::start().await;
    mount_mutation(&server, "DeviceClockingPreferredLeaderSet", 1).await;
    mount_mutation(&server, "DeviceClockingSyncToExternalSet", 1).await;
    let aggregator = primed(&server).await;

    let results = aggregator
        .apply_controls(&[
            ControlRequest::device("dev-1", "PreferredLeader", "1"),
            ControlRequest::device("ghost", "PreferredLeader", "1"),
            ControlRequest::device("dev-3", "SyncToExternalWordClock", "1"),
        ])
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Ok(ControlOutcome::Applied { .. })));
    assert!(matches!(results[1], Err(CoreError::InvalidArgument { .. })));
    assert!(matches!(results[2], Ok(ControlOutcome::Applied { .. })));

    aggregator.stop().await;
}

#[tokio::test]
async fn test_empty_batch_is_invalid_argument() {
    let server = MockServer::start().await;
    let aggregator = Aggregator::new(config(&server)).unwrap();

    let result = aggregator.apply_controls(&[]).await;
    assert!(matches!(result, Err(CoreError::InvalidArgument { .. })));
}
