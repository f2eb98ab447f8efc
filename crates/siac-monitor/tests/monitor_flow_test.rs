//! Integration tests for the monitor's end-to-end flow.
//!
//! Each test starts a dispatcher against the mock reader:
//! 1. Endpoint listing → connect → device events
//! 2. Card readout → verdict → auto-clear
//! 3. Transport loss, failed connects and shutdown

mod common;

use std::time::Duration;

use chrono::NaiveDate;
use siac_core::constants::MSG_CONFIG_WARNING_TITLE;
use siac_core::{CardReading, Error, StatusLevel};
use siac_hardware::{ConfigurationOutcome, DeviceEndpoint, ProductFamily, StationConfiguration};
use siac_monitor::{ConnectionState, ConnectionStatus, Notification, Severity};
use tokio::time::{Instant, sleep};

// ============================================================================
// Connection Flow
// ============================================================================

#[tokio::test]
async fn test_connect_shows_device_and_status() {
    let h = common::start_monitor(&["COM3"]);

    h.monitor.connect(0).await.unwrap();
    let snapshot = h.monitor.snapshot().await.unwrap();

    assert_eq!(snapshot.connection_state, ConnectionState::Connected);
    assert_eq!(snapshot.connected_endpoint.unwrap().device_name, "COM3");
    assert_eq!(
        h.sink.notifications(),
        vec![
            Notification::SetEndpointList {
                entries: vec![(0, "COM3".to_string())]
            },
            Notification::SetConnectedUiState { connected: true },
            Notification::ShowDeviceInfo {
                text: "Input source: COM3".to_string()
            },
            Notification::ShowConnectionStatus {
                status: ConnectionStatus::Ready
            },
        ]
    );
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connect_errors_leave_monitor_disconnected() {
    let h = common::start_monitor(&["COM3"]);

    let result = h.monitor.connect(3).await;
    assert!(matches!(result, Err(Error::InvalidEndpoint(_))));

    h.device.fail_next_select("unknown device type");
    let result = h.monitor.connect(0).await;
    assert!(matches!(result, Err(Error::DeviceConstructionError { .. })));

    h.device.fail_next_open("access denied");
    let result = h.monitor.connect(0).await;
    assert!(matches!(result, Err(Error::DeviceOpenError { .. })));

    let snapshot = h.monitor.snapshot().await.unwrap();
    assert_eq!(snapshot.connection_state, ConnectionState::Disconnected);
    assert!(!h.device.is_open());

    let messages = h.sink.blocking_messages();
    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|(_, _, severity)| *severity == Severity::Error));

    h.monitor.connect(0).await.unwrap();
    common::assert_ui_connected(&h.sink, true);
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connect_twice_is_rejected() {
    let h = common::start_monitor(&["COM3"]);

    h.monitor.connect(0).await.unwrap();
    let result = h.monitor.connect(0).await;

    assert!(matches!(result, Err(Error::AlreadyConnected)));
    assert_eq!(h.device.open_count(), 1);
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disconnect_when_disconnected_is_noop() {
    let h = common::start_monitor(&["COM3"]);

    h.monitor.disconnect().await.unwrap();
    h.monitor.disconnect().await.unwrap();

    let snapshot = h.monitor.snapshot().await.unwrap();
    assert_eq!(snapshot.connection_state, ConnectionState::Disconnected);
    assert_eq!(h.sink.notifications().len(), 1, "only the endpoint list");
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disconnect_closes_device() {
    let h = common::start_monitor(&["COM3"]);
    h.monitor.connect(0).await.unwrap();

    h.monitor.disconnect().await.unwrap();
    let snapshot = h.monitor.snapshot().await.unwrap();

    assert_eq!(snapshot.connection_state, ConnectionState::Disconnected);
    assert!(snapshot.connected_endpoint.is_none());
    assert!(!h.device.is_open());
    common::assert_ui_connected(&h.sink, false);
    assert_eq!(
        h.sink.count(|n| matches!(n, Notification::ClearDeviceInfo)),
        1
    );
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_transport_loss_forces_disconnect() {
    let h = common::start_monitor(&["COM3"]);
    h.monitor.connect(0).await.unwrap();

    h.device.unplug().await.unwrap();
    let snapshot = h.monitor.snapshot().await.unwrap();

    assert_eq!(snapshot.connection_state, ConnectionState::Disconnected);
    common::assert_ui_connected(&h.sink, false);

    let messages = h.sink.blocking_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.ends_with("\n\nDisconnected"));

    // The device was already gone, so nothing was left to close.
    assert_eq!(h.device.close_count(), 0);

    // Selection is usable again.
    h.monitor.connect(0).await.unwrap();
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_other_reader_errors_keep_connection() {
    let h = common::start_monitor(&["COM3"]);
    h.monitor.connect(0).await.unwrap();

    h.device
        .report_error("Readout failed", Some("CRC mismatch".to_string()))
        .await
        .unwrap();
    let snapshot = h.monitor.snapshot().await.unwrap();

    assert_eq!(snapshot.connection_state, ConnectionState::Connected);
    assert_eq!(
        h.sink.blocking_messages()[0].1,
        "Readout failed\n\nCRC mismatch"
    );
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_configuration_warning_after_connect() {
    let h = common::start_monitor(&["COM3"]);
    h.device.set_configuration(ConfigurationOutcome::Read(
        StationConfiguration::master(ProductFamily::Bs8SiMaster, 501).with_auto_send(true),
    ));

    h.monitor.connect(0).await.unwrap();
    h.monitor.snapshot().await.unwrap();

    let messages = h.sink.blocking_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, MSG_CONFIG_WARNING_TITLE);
    assert_eq!(messages[0].2, Severity::Warning);
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_refresh_replaces_endpoint_list() {
    let h = common::start_monitor(&["COM3"]);

    h.device.set_endpoints(vec![
        DeviceEndpoint::serial(0, "COM5"),
        DeviceEndpoint::serial(0, "COM6"),
    ]);
    let endpoints = h.monitor.refresh_endpoints().await.unwrap();

    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[1].id, 1);
    assert_eq!(
        h.sink.last(),
        Some(Notification::SetEndpointList {
            entries: vec![(0, "COM5".to_string()), (1, "COM6".to_string())]
        })
    );

    let snapshot = h.monitor.snapshot().await.unwrap();
    assert_eq!(snapshot.default_endpoint, Some(0));

    h.monitor.connect(1).await.unwrap();
    let snapshot = h.monitor.snapshot().await.unwrap();
    assert_eq!(snapshot.connected_endpoint.unwrap().device_name, "COM6");
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_disconnects() {
    let h = common::start_monitor(&["COM3"]);
    h.monitor.connect(0).await.unwrap();

    h.monitor.shutdown().await.unwrap();

    assert!(!h.device.is_open());
    common::assert_ui_connected(&h.sink, false);
}

// ============================================================================
// Readout and Auto-Clear
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_readout_shows_verdict_then_clears() {
    let h = common::start_monitor(&["COM3"]);
    let start = Instant::now();

    h.device
        .read_card(common::healthy_card("8001234"))
        .await
        .unwrap();
    let snapshot = h.monitor.snapshot().await.unwrap();

    let verdict = snapshot.current_verdict.unwrap();
    assert_eq!(verdict.card_id, "8001234");
    assert_eq!(verdict.voltage.status, StatusLevel::Ok);
    assert_eq!(verdict.age.status, StatusLevel::Ok);
    assert!(snapshot.clear_armed);

    sleep(Duration::from_millis(4999)).await;
    assert_eq!(common::clear_count(&h.sink), 0);

    sleep(Duration::from_millis(2)).await;
    let snapshot = h.monitor.snapshot().await.unwrap();
    assert_eq!(common::clear_count(&h.sink), 1);
    assert!(snapshot.current_verdict.is_none());
    assert!(!snapshot.clear_armed);
    assert!(start.elapsed() >= Duration::from_millis(5001));

    h.monitor.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_second_readout_restarts_clear_timer() {
    let h = common::start_monitor(&["COM3"]);

    h.device.read_card(common::healthy_card("1")).await.unwrap();
    h.monitor.snapshot().await.unwrap();

    sleep(Duration::from_secs(3)).await;
    h.device.read_card(common::healthy_card("2")).await.unwrap();
    h.monitor.snapshot().await.unwrap();

    // Five seconds after the first readout: nothing cleared.
    sleep(Duration::from_millis(4999)).await;
    let snapshot = h.monitor.snapshot().await.unwrap();
    assert_eq!(common::clear_count(&h.sink), 0);
    assert_eq!(snapshot.current_verdict.unwrap().card_id, "2");

    // Five seconds after the second readout: exactly one clear.
    sleep(Duration::from_millis(2)).await;
    h.monitor.snapshot().await.unwrap();
    assert_eq!(common::clear_count(&h.sink), 1);

    sleep(Duration::from_secs(60)).await;
    h.monitor.snapshot().await.unwrap();
    assert_eq!(common::clear_count(&h.sink), 1);

    h.monitor.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_multi_card_readout_arms_once() {
    let h = common::start_monitor(&["COM3"]);

    h.device
        .read_cards(vec![common::healthy_card("A"), common::healthy_card("B")])
        .await
        .unwrap();
    let snapshot = h.monitor.snapshot().await.unwrap();

    assert_eq!(common::shown_cards(&h.sink), vec!["A", "B"]);
    assert_eq!(snapshot.current_verdict.unwrap().card_id, "B");

    sleep(Duration::from_secs(6)).await;
    h.monitor.snapshot().await.unwrap();
    assert_eq!(common::clear_count(&h.sink), 1);

    h.monitor.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_leaves_clear_timer_running() {
    let h = common::start_monitor(&["COM3"]);
    h.monitor.connect(0).await.unwrap();

    h.device.read_card(common::healthy_card("1")).await.unwrap();
    h.monitor.disconnect().await.unwrap();

    let snapshot = h.monitor.snapshot().await.unwrap();
    assert!(snapshot.clear_armed);
    assert!(snapshot.current_verdict.is_some());

    sleep(Duration::from_secs(6)).await;
    h.monitor.snapshot().await.unwrap();
    assert_eq!(common::clear_count(&h.sink), 1);

    h.monitor.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_custom_clear_delay() {
    let config = siac_monitor::MonitorConfig::default().with_clear_after(Duration::from_secs(1));
    let h = common::start_monitor_with(&["COM3"], config);

    h.device.read_card(common::healthy_card("1")).await.unwrap();
    sleep(Duration::from_millis(1001)).await;
    h.monitor.snapshot().await.unwrap();

    assert_eq!(common::clear_count(&h.sink), 1);
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_worn_card_verdict() {
    let h = common::start_monitor(&["COM3"]);

    // Due 2026-11-16, 30 days after the fixed "today".
    let battery_date = NaiveDate::from_ymd_opt(2023, 11, 16).unwrap();
    h.device
        .read_card(CardReading::new("2004711", 2.6, 2.5, battery_date))
        .await
        .unwrap();
    let verdict = h.monitor.snapshot().await.unwrap().current_verdict.unwrap();

    assert_eq!(verdict.voltage.status, StatusLevel::Warning);
    assert!(verdict.voltage.message.contains("2.72"));
    assert_eq!(verdict.age.status, StatusLevel::Warning);
    assert_eq!(verdict.age.days_remaining, 30);
    assert!(verdict.age.message.contains("Nov 2026"));
    h.monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_log_messages_have_no_visible_effect() {
    let h = common::start_monitor(&["COM3"]);

    h.device.log("Station firmware 656").await.unwrap();
    h.monitor.snapshot().await.unwrap();

    assert_eq!(h.sink.notifications().len(), 1, "only the endpoint list");
    h.monitor.shutdown().await.unwrap();
}
