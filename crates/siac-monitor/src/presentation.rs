//! Presentation sink contract.
//!
//! The monitor never renders anything itself. Every visible effect goes
//! through a [`PresentationSink`], which is the only place where a
//! rendering layer (window, console, web page) plugs in.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use siac_core::{AgeVerdict, VoltageVerdict};
use siac_hardware::DeviceState;

/// Three-way status signal of the connected station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Ready,
    Busy,
    Fault,
}

impl ConnectionStatus {
    /// Map a hardware device state to the status signal.
    ///
    /// ```
    /// use siac_hardware::DeviceState;
    /// use siac_monitor::ConnectionStatus;
    ///
    /// assert_eq!(ConnectionStatus::from_device_state(DeviceState::Online), ConnectionStatus::Ready);
    /// assert_eq!(ConnectionStatus::from_device_state(DeviceState::Offline), ConnectionStatus::Fault);
    /// ```
    pub fn from_device_state(state: DeviceState) -> Self {
        match state {
            DeviceState::Online => Self::Ready,
            DeviceState::Busy => Self::Busy,
            DeviceState::Offline | DeviceState::ErrorState => Self::Fault,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Busy => write!(f, "busy"),
            Self::Fault => write!(f, "fault"),
        }
    }
}

/// Severity of a blocking message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Receiver of everything the operator gets to see.
///
/// Calls are made from the monitor's dispatcher task, one at a time and in
/// the order the underlying events were processed. Implementations that
/// render on another thread do their own marshaling.
pub trait PresentationSink: Send {
    /// Show the verdicts for one card.
    fn show_verdict(&mut self, card_id: &str, voltage: &VoltageVerdict, age: &AgeVerdict);

    /// Blank all verdict fields.
    fn clear_display(&mut self);

    /// Show the station status signal.
    fn show_connection_status(&mut self, status: ConnectionStatus);

    /// Show informational text about the connected device.
    fn show_device_info(&mut self, text: &str);

    /// Blank the device information text.
    fn clear_device_info(&mut self);

    /// Show a message the operator must acknowledge.
    fn show_blocking_message(&mut self, title: &str, body: &str, severity: Severity);

    /// Replace the list of selectable endpoints, as `(id, display name)`.
    fn set_endpoint_list(&mut self, entries: &[(usize, String)]);

    /// Switch between the connected and the endpoint-selection UI.
    fn set_connected_ui_state(&mut self, connected: bool);
}

/// One call made on a [`PresentationSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    ShowVerdict {
        card_id: String,
        voltage: VoltageVerdict,
        age: AgeVerdict,
    },
    ClearDisplay,
    ShowConnectionStatus {
        status: ConnectionStatus,
    },
    ShowDeviceInfo {
        text: String,
    },
    ClearDeviceInfo,
    ShowBlockingMessage {
        title: String,
        body: String,
        severity: Severity,
    },
    SetEndpointList {
        entries: Vec<(usize, String)>,
    },
    SetConnectedUiState {
        connected: bool,
    },
}

/// Sink that records every notification.
///
/// Clones share the same record, so a test can keep one clone while the
/// monitor owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, notification: Notification) {
        self.record().push(notification);
    }

    /// Copy of everything recorded so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.record().clone()
    }

    /// Take everything recorded so far, leaving the record empty.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.record())
    }

    /// Number of recorded notifications matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.record().iter().filter(|n| predicate(n)).count()
    }

    /// Most recent notification, if any.
    pub fn last(&self) -> Option<Notification> {
        self.record().last().cloned()
    }

    /// Blocking messages recorded so far, as `(title, body, severity)`.
    pub fn blocking_messages(&self) -> Vec<(String, String, Severity)> {
        self.record()
            .iter()
            .filter_map(|n| match n {
                Notification::ShowBlockingMessage {
                    title,
                    body,
                    severity,
                } => Some((title.clone(), body.clone(), *severity)),
                _ => None,
            })
            .collect()
    }
}

impl PresentationSink for RecordingSink {
    fn show_verdict(&mut self, card_id: &str, voltage: &VoltageVerdict, age: &AgeVerdict) {
        self.push(Notification::ShowVerdict {
            card_id: card_id.to_string(),
            voltage: voltage.clone(),
            age: age.clone(),
        });
    }

    fn clear_display(&mut self) {
        self.push(Notification::ClearDisplay);
    }

    fn show_connection_status(&mut self, status: ConnectionStatus) {
        self.push(Notification::ShowConnectionStatus { status });
    }

    fn show_device_info(&mut self, text: &str) {
        self.push(Notification::ShowDeviceInfo {
            text: text.to_string(),
        });
    }

    fn clear_device_info(&mut self) {
        self.push(Notification::ClearDeviceInfo);
    }

    fn show_blocking_message(&mut self, title: &str, body: &str, severity: Severity) {
        self.push(Notification::ShowBlockingMessage {
            title: title.to_string(),
            body: body.to_string(),
            severity,
        });
    }

    fn set_endpoint_list(&mut self, entries: &[(usize, String)]) {
        self.push(Notification::SetEndpointList {
            entries: entries.to_vec(),
        });
    }

    fn set_connected_ui_state(&mut self, connected: bool) {
        self.push(Notification::SetConnectedUiState { connected });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DeviceState::Online, ConnectionStatus::Ready)]
    #[case(DeviceState::Busy, ConnectionStatus::Busy)]
    #[case(DeviceState::Offline, ConnectionStatus::Fault)]
    #[case(DeviceState::ErrorState, ConnectionStatus::Fault)]
    fn test_status_mapping(#[case] state: DeviceState, #[case] expected: ConnectionStatus) {
        assert_eq!(ConnectionStatus::from_device_state(state), expected);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Ready.to_string(), "ready");
        assert_eq!(ConnectionStatus::Busy.to_string(), "busy");
        assert_eq!(ConnectionStatus::Fault.to_string(), "fault");
    }

    #[test]
    fn test_recording_sink_shares_record() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();

        sink.show_device_info("Input source: COM3");
        sink.show_blocking_message("Error", "boom", Severity::Error);
        sink.set_connected_ui_state(true);

        assert_eq!(recorder.notifications().len(), 3);
        assert_eq!(
            recorder.blocking_messages(),
            vec![("Error".to_string(), "boom".to_string(), Severity::Error)]
        );
        assert_eq!(
            recorder.last(),
            Some(Notification::SetConnectedUiState { connected: true })
        );
    }

    #[test]
    fn test_recording_sink_drain() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();

        sink.clear_display();
        sink.clear_display();

        assert_eq!(
            recorder.count(|n| matches!(n, Notification::ClearDisplay)),
            2
        );
        assert_eq!(recorder.drain().len(), 2);
        assert!(recorder.notifications().is_empty());
    }

    #[test]
    fn test_notification_json() {
        let json = serde_json::to_value(Notification::ShowConnectionStatus {
            status: ConnectionStatus::Busy,
        })
        .unwrap();

        assert_eq!(json["type"], "show_connection_status");
        assert_eq!(json["status"], "busy");
    }
}
