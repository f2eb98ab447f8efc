//! Presentation sink that writes to standard output.

use siac_core::{AgeVerdict, VoltageVerdict};
use siac_monitor::{ConnectionStatus, Notification, PresentationSink, Severity};
use tracing::warn;

/// Prints every notification, as text or as one JSON object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    json: bool,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit(&self, notification: Notification) {
        if self.json {
            match serde_json::to_string(&notification) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Cannot encode notification: {}", e),
            }
        } else {
            println!("{}", render(&notification));
        }
    }
}

/// Human-readable rendering of a notification.
pub fn render(notification: &Notification) -> String {
    match notification {
        Notification::ShowVerdict {
            card_id,
            voltage,
            age,
        } => format!(
            "Card {}\n  {} {:<10} {}\n  {} {:<10} {}",
            card_id,
            voltage.status.symbol(),
            voltage.voltage_text(),
            voltage.message,
            age.status.symbol(),
            age.battery_date_text(),
            age.message
        ),
        Notification::ClearDisplay => "-- display cleared --".to_string(),
        Notification::ShowConnectionStatus { status } => format!("[station {}]", status),
        Notification::ShowDeviceInfo { text } => format!("[info] {}", text),
        Notification::ClearDeviceInfo => "[info]".to_string(),
        Notification::ShowBlockingMessage {
            title,
            body,
            severity,
        } => {
            let marker = match severity {
                Severity::Info => "i",
                Severity::Warning => "!",
                Severity::Error => "x",
            };
            format!("({}) {}: {}", marker, title, body.replace("\n\n", " - "))
        }
        Notification::SetEndpointList { entries } if entries.is_empty() => {
            "No reading device found".to_string()
        }
        Notification::SetEndpointList { entries } => entries
            .iter()
            .map(|(id, name)| format!("  [{}] {}", id, name))
            .collect::<Vec<_>>()
            .join("\n"),
        Notification::SetConnectedUiState { connected: true } => "Connected".to_string(),
        Notification::SetConnectedUiState { connected: false } => "Disconnected".to_string(),
    }
}

impl PresentationSink for ConsoleSink {
    fn show_verdict(&mut self, card_id: &str, voltage: &VoltageVerdict, age: &AgeVerdict) {
        self.emit(Notification::ShowVerdict {
            card_id: card_id.to_string(),
            voltage: voltage.clone(),
            age: age.clone(),
        });
    }

    fn clear_display(&mut self) {
        self.emit(Notification::ClearDisplay);
    }

    fn show_connection_status(&mut self, status: ConnectionStatus) {
        self.emit(Notification::ShowConnectionStatus { status });
    }

    fn show_device_info(&mut self, text: &str) {
        self.emit(Notification::ShowDeviceInfo {
            text: text.to_string(),
        });
    }

    fn clear_device_info(&mut self) {
        self.emit(Notification::ClearDeviceInfo);
    }

    fn show_blocking_message(&mut self, title: &str, body: &str, severity: Severity) {
        self.emit(Notification::ShowBlockingMessage {
            title: title.to_string(),
            body: body.to_string(),
            severity,
        });
    }

    fn set_endpoint_list(&mut self, entries: &[(usize, String)]) {
        self.emit(Notification::SetEndpointList {
            entries: entries.to_vec(),
        });
    }

    fn set_connected_ui_state(&mut self, connected: bool) {
        self.emit(Notification::SetConnectedUiState { connected });
    }
}
