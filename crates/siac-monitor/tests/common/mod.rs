//! Common test utilities for monitor integration tests.
//!
//! Every test drives a real [`Monitor`] dispatcher against the mock reader
//! and inspects what reached the [`RecordingSink`]. Reader events queued
//! before a command are always processed before it, so awaiting
//! `snapshot()` is enough to let earlier events settle.

#![allow(dead_code)]

use chrono::NaiveDate;
use siac_core::CardReading;
use siac_hardware::mock::{MockReader, MockReaderHandle};
use siac_monitor::{FixedClock, Monitor, MonitorConfig, MonitorHandle, Notification, RecordingSink};

/// Date the monitor's clock is fixed to.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

/// Everything a test needs to drive and observe one monitor.
pub struct Harness {
    pub monitor: MonitorHandle,
    pub device: MockReaderHandle,
    pub sink: RecordingSink,
}

/// Start a monitor listing `ports`, with the default configuration.
pub fn start_monitor(ports: &[&str]) -> Harness {
    start_monitor_with(ports, MonitorConfig::default())
}

/// Start a monitor listing `ports`, with `config`.
pub fn start_monitor_with(ports: &[&str], config: MonitorConfig) -> Harness {
    let (reader, device) = MockReader::with_endpoints(ports.iter().copied());
    let sink = RecordingSink::new();

    let monitor = Monitor::builder(reader, sink.clone())
        .config(config)
        .clock(FixedClock(today()))
        .build()
        .expect("valid test configuration")
        .start();

    Harness {
        monitor,
        device,
        sink,
    }
}

/// A reading whose battery is fine on both counts.
pub fn healthy_card(card_id: &str) -> CardReading {
    CardReading::new(card_id, 3.0, 2.5, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
}

/// Number of `ClearDisplay` notifications recorded.
pub fn clear_count(sink: &RecordingSink) -> usize {
    sink.count(|n| matches!(n, Notification::ClearDisplay))
}

/// Card ids of the `ShowVerdict` notifications recorded, in order.
pub fn shown_cards(sink: &RecordingSink) -> Vec<String> {
    sink.notifications()
        .into_iter()
        .filter_map(|n| match n {
            Notification::ShowVerdict { card_id, .. } => Some(card_id),
            _ => None,
        })
        .collect()
}

/// Assert the last `SetConnectedUiState` recorded equals `connected`.
pub fn assert_ui_connected(sink: &RecordingSink, connected: bool) {
    let last = sink
        .notifications()
        .into_iter()
        .rev()
        .find_map(|n| match n {
            Notification::SetConnectedUiState { connected } => Some(connected),
            _ => None,
        });
    assert_eq!(last, Some(connected), "connected UI state");
}
