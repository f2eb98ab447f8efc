//! Connection state machine.
//!
//! Tracks the lifecycle of the session with the reading station and turns
//! the device events that concern the connection into operator-visible
//! notifications.
//!
//! # States
//!
//! - `Disconnected`: no session; endpoint selection enabled
//! - `Connecting`: session being constructed and opened
//! - `Connected`: input device open; endpoint selection disabled
//!
//! # Valid Transitions
//!
//! - Disconnected → Connecting → Connected → Disconnected
//! - Connecting → Disconnected (failed connect)
//!
//! # Examples
//!
//! ```
//! use siac_hardware::mock::MockReader;
//! use siac_monitor::{ConnectionMachine, ConnectionState, EndpointRegistry, RecordingSink};
//!
//! #[tokio::main]
//! async fn main() -> siac_core::Result<()> {
//!     let (reader, _handle) = MockReader::with_endpoints(["COM3"]);
//!     let mut machine = ConnectionMachine::new(reader.into());
//!     let mut registry = EndpointRegistry::new();
//!     registry.refresh(machine.reader());
//!     let mut sink = RecordingSink::new();
//!
//!     machine.connect(&registry, 0, &mut sink).await?;
//!     assert_eq!(machine.state(), ConnectionState::Connected);
//!
//!     machine.disconnect(&mut sink).await;
//!     machine.disconnect(&mut sink).await;
//!     assert_eq!(machine.state(), ConnectionState::Disconnected);
//!     Ok(())
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use siac_core::constants::{
    DISCONNECTED_CAUSE, MAX_CONNECTION_HISTORY, MSG_CONFIG_WARNING_TITLE, MSG_ERROR_TITLE,
};
use siac_core::{Error, Result};
use siac_hardware::{
    AnyReader, ConfigurationFailure, ConfigurationOutcome, DeviceDescriptor, DeviceEndpoint,
    DeviceSessionProvider, DeviceState, OperatingMode, PortEnumerator, ProductFamily,
    ReaderEvent, StationConfiguration,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::endpoints::EndpointRegistry;
use crate::presentation::{ConnectionStatus, PresentationSink, Severity};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
        };
        write!(f, "{}", state_str)
    }
}

impl ConnectionState {
    /// Check if transition to target state is valid from this state.
    ///
    /// ```
    /// use siac_monitor::ConnectionState;
    ///
    /// assert!(ConnectionState::Disconnected.can_transition_to(&ConnectionState::Connecting));
    /// assert!(!ConnectionState::Disconnected.can_transition_to(&ConnectionState::Connected));
    /// ```
    pub fn can_transition_to(&self, target: &ConnectionState) -> bool {
        matches!(
            (self, target),
            (ConnectionState::Disconnected, ConnectionState::Connecting)
                | (
                    ConnectionState::Connecting,
                    ConnectionState::Connected | ConnectionState::Disconnected
                )
                | (ConnectionState::Connected, ConnectionState::Disconnected)
        )
    }
}

/// A single state transition with timestamp.
#[derive(Debug, Clone)]
pub struct ConnectionTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
    pub timestamp: Instant,
}

impl ConnectionTransition {
    pub fn new(from: ConnectionState, to: ConnectionState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Health problem of a master station configuration.
///
/// Checked in declaration order; only the first problem found is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationWarning {
    NotInReadoutMode,
    AutoSendEnabled,
    LegacyProtocolEnabled,
    UnrecognizedDevice,
}

impl ConfigurationWarning {
    /// Message shown to the operator.
    pub fn message(self) -> &'static str {
        match self {
            Self::NotInReadoutMode => "The station must be in readout mode.",
            Self::AutoSendEnabled => "The station must not use autosend.",
            Self::LegacyProtocolEnabled => "The station must not use the legacy protocol.",
            Self::UnrecognizedDevice => "The connected device is an unrecognized device.",
        }
    }

    /// First failing health check of a master station, if any.
    pub fn check_master(configuration: &StationConfiguration) -> Option<Self> {
        if configuration.operating_mode != OperatingMode::Readout {
            Some(Self::NotInReadoutMode)
        } else if configuration.auto_send {
            Some(Self::AutoSendEnabled)
        } else if configuration.legacy_protocol {
            Some(Self::LegacyProtocolEnabled)
        } else {
            None
        }
    }
}

/// Device information text for an SRR dongle.
fn srr_info(configuration: &StationConfiguration) -> String {
    let channel = configuration
        .sim_srr_channel
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    format!(
        "SRR dongle {} (firmware {}, {}), ModD3: {}, channel: {}",
        configuration.serial_number,
        configuration.firmware_version,
        configuration.product_type,
        configuration.sim_srr_mod_d3,
        channel
    )
}

/// Device information text for a master station.
fn master_info(configuration: &StationConfiguration) -> String {
    format!(
        "Master station code {}, mode: {}, autosend: {}, legacy protocol: {}",
        configuration.code_number,
        configuration.operating_mode,
        configuration.auto_send,
        configuration.legacy_protocol
    )
}

/// Body of the blocking message for a configuration that cannot be used.
fn failure_body(failure: ConfigurationFailure) -> String {
    format!(
        "The station configuration could not be used ({}).\n\n{}",
        failure,
        failure.description()
    )
}

/// Connection state machine over the reader.
///
/// The machine exclusively owns the reader, so open and close calls can
/// never overlap.
#[derive(Debug)]
pub struct ConnectionMachine {
    reader: AnyReader,
    state: ConnectionState,
    endpoint: Option<DeviceEndpoint>,
    history: VecDeque<ConnectionTransition>,
}

impl ConnectionMachine {
    /// Create a machine in the `Disconnected` state.
    pub fn new(reader: AnyReader) -> Self {
        Self {
            reader,
            state: ConnectionState::Disconnected,
            endpoint: None,
            history: VecDeque::with_capacity(MAX_CONNECTION_HISTORY),
        }
    }

    pub fn reader(&self) -> &AnyReader {
        &self.reader
    }

    /// Take the reader's event receiver. `Some` exactly once.
    pub fn subscribe(&mut self) -> Option<mpsc::Receiver<ReaderEvent>> {
        self.reader.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Endpoint of the open session, if connected.
    pub fn connected_endpoint(&self) -> Option<&DeviceEndpoint> {
        self.endpoint.as_ref()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<ConnectionTransition> {
        &self.history
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the transition is not
    /// valid from the current state.
    pub fn transition_to(&mut self, new_state: ConnectionState) -> Result<ConnectionTransition> {
        if !self.state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = ConnectionTransition::new(self.state, new_state);
        self.state = new_state;
        self.history.push_back(transition.clone());
        if self.history.len() > MAX_CONNECTION_HISTORY {
            self.history.pop_front();
        }

        debug!("Connection state {} -> {}", transition.from, transition.to);
        Ok(transition)
    }

    /// Connect to the endpoint with `id` in `registry`.
    ///
    /// Every failure is shown to the operator as a blocking error and
    /// leaves the machine `Disconnected`.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyConnected`] if not `Disconnected`; nothing changes
    /// - [`Error::InvalidEndpoint`] if `id` is not in the registry or the
    ///   endpoint fails the reader's validity check
    /// - [`Error::DeviceConstructionError`] if the session cannot be built
    /// - [`Error::DeviceOpenError`] if the input device cannot be opened
    pub async fn connect<S>(
        &mut self,
        registry: &EndpointRegistry,
        id: usize,
        sink: &mut S,
    ) -> Result<()>
    where
        S: PresentationSink + ?Sized,
    {
        if self.state != ConnectionState::Disconnected {
            warn!("Connect to endpoint {} ignored: already {}", id, self.state);
            return Err(Error::AlreadyConnected);
        }

        let endpoint = match registry.get(id) {
            Some(endpoint) if self.reader.is_endpoint_valid(endpoint) => endpoint.clone(),
            Some(endpoint) => {
                return Err(report_failure(
                    Error::InvalidEndpoint(format!(
                        "{} is not a usable SI device",
                        endpoint.device_name
                    )),
                    sink,
                ));
            }
            None => {
                return Err(report_failure(
                    Error::InvalidEndpoint(format!("no endpoint with id {}", id)),
                    sink,
                ));
            }
        };

        info!("Connecting to {}", endpoint);
        self.transition_to(ConnectionState::Connecting)?;

        if let Err(e) = self.reader.select_input(&endpoint).await {
            self.transition_to(ConnectionState::Disconnected)?;
            return Err(report_failure(
                Error::DeviceConstructionError {
                    endpoint: endpoint.device_name.clone(),
                    reason: e.to_string(),
                },
                sink,
            ));
        }

        if let Err(e) = self.reader.open_input().await {
            if let Err(close_err) = self.reader.close_input().await {
                warn!("Close after failed open reported: {}", close_err);
            }
            self.transition_to(ConnectionState::Disconnected)?;
            return Err(report_failure(
                Error::DeviceOpenError {
                    endpoint: endpoint.device_name.clone(),
                    reason: e.to_string(),
                },
                sink,
            ));
        }

        self.transition_to(ConnectionState::Connected)?;
        info!("Connected to {}", endpoint);
        self.endpoint = Some(endpoint);
        sink.set_connected_ui_state(true);
        Ok(())
    }

    /// Close the session and return to `Disconnected`.
    ///
    /// A no-op when already disconnected. Close errors are logged; the
    /// machine still ends up `Disconnected`.
    pub async fn disconnect<S>(&mut self, sink: &mut S)
    where
        S: PresentationSink + ?Sized,
    {
        if self.state == ConnectionState::Disconnected {
            return;
        }

        if self.reader.is_input_open() {
            if let Err(e) = self.reader.close_input().await {
                warn!("Closing input device failed: {}", e);
            }
        }

        if let Err(e) = self.transition_to(ConnectionState::Disconnected) {
            warn!("{}", e);
        }
        if let Some(endpoint) = self.endpoint.take() {
            info!("Disconnected from {}", endpoint);
        }
        sink.set_connected_ui_state(false);
        sink.clear_device_info();
    }

    /// Show the status signal for a hardware state change.
    pub fn on_device_state_changed<S>(&mut self, old: DeviceState, new: DeviceState, sink: &mut S)
    where
        S: PresentationSink + ?Sized,
    {
        let status = ConnectionStatus::from_device_state(new);
        debug!("Device state {} -> {} ({})", old, new, status);
        sink.show_connection_status(status);
    }

    /// Name the reader's current input source.
    pub fn on_device_changed<S>(&mut self, descriptor: &DeviceDescriptor, sink: &mut S)
    where
        S: PresentationSink + ?Sized,
    {
        let text = format!("Input source: {}", descriptor.source_name());
        debug!("{}", text);
        sink.show_device_info(&text);
    }

    /// Show device information for a configuration read and check its
    /// health.
    ///
    /// Returns the warning raised, if any.
    pub fn on_configuration_read<S>(
        &mut self,
        outcome: &ConfigurationOutcome,
        sink: &mut S,
    ) -> Option<ConfigurationWarning>
    where
        S: PresentationSink + ?Sized,
    {
        let configuration = match outcome {
            ConfigurationOutcome::Read(configuration) => configuration,
            ConfigurationOutcome::Failed(failure) => {
                error!("Station configuration unusable: {}", failure);
                sink.show_blocking_message(MSG_ERROR_TITLE, &failure_body(*failure), Severity::Error);
                return None;
            }
        };

        let family = configuration.product_family;
        let warning = if family == ProductFamily::SimSrr {
            sink.show_device_info(&srr_info(configuration));
            None
        } else if family.is_master_station() {
            sink.show_device_info(&master_info(configuration));
            ConfigurationWarning::check_master(configuration)
        } else {
            sink.show_device_info("Unknown device");
            Some(ConfigurationWarning::UnrecognizedDevice)
        };

        if let Some(warning) = warning {
            warn!("Station configuration: {:?}", warning);
            sink.show_blocking_message(MSG_CONFIG_WARNING_TITLE, warning.message(), Severity::Warning);
        }
        warning
    }

    /// Surface a reader error; disconnect if the transport was lost.
    pub async fn on_error<S>(&mut self, message: &str, cause: Option<&str>, sink: &mut S)
    where
        S: PresentationSink + ?Sized,
    {
        let body = match cause {
            Some(cause) => format!("{}\n\n{}", message, cause),
            None => message.to_string(),
        };
        error!("Reader error: {}", body.replace("\n\n", ": "));
        sink.show_blocking_message(MSG_ERROR_TITLE, &body, Severity::Error);

        if cause == Some(DISCONNECTED_CAUSE) && self.is_connected() {
            info!("Station disconnected, closing session");
            self.disconnect(sink).await;
        }
    }
}

/// Show `error` as a blocking message and hand it back.
fn report_failure<S>(error: Error, sink: &mut S) -> Error
where
    S: PresentationSink + ?Sized,
{
    error!("Connect failed: {}", error);
    sink.show_blocking_message(MSG_ERROR_TITLE, &error.to_string(), Severity::Error);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{Notification, RecordingSink};
    use rstest::rstest;
    use siac_hardware::mock::{MockReader, MockReaderHandle};

    fn machine_with(names: &[&str]) -> (ConnectionMachine, MockReaderHandle, EndpointRegistry) {
        let (reader, handle) = MockReader::with_endpoints(names.iter().copied());
        let machine = ConnectionMachine::new(reader.into());
        let mut registry = EndpointRegistry::new();
        registry.refresh(machine.reader());
        (machine, handle, registry)
    }

    #[test]
    fn test_new_machine_starts_disconnected() {
        let (machine, _handle, _registry) = machine_with(&["COM3"]);
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert!(machine.history().is_empty());
        assert!(machine.connected_endpoint().is_none());
    }

    #[rstest]
    #[case(ConnectionState::Disconnected, ConnectionState::Connecting, true)]
    #[case(ConnectionState::Connecting, ConnectionState::Connected, true)]
    #[case(ConnectionState::Connecting, ConnectionState::Disconnected, true)]
    #[case(ConnectionState::Connected, ConnectionState::Disconnected, true)]
    #[case(ConnectionState::Disconnected, ConnectionState::Connected, false)]
    #[case(ConnectionState::Disconnected, ConnectionState::Disconnected, false)]
    #[case(ConnectionState::Connected, ConnectionState::Connecting, false)]
    fn test_transition_rules(
        #[case] from: ConnectionState,
        #[case] to: ConnectionState,
        #[case] valid: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_invalid_transition_error() {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        let result = machine.transition_to(ConnectionState::Connected);
        assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
        assert_eq!(machine.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_history_is_bounded() {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        for _ in 0..60 {
            machine.transition_to(ConnectionState::Connecting).unwrap();
            machine.transition_to(ConnectionState::Disconnected).unwrap();
        }

        assert_eq!(machine.history().len(), MAX_CONNECTION_HISTORY);
        let last = machine.history().back().unwrap();
        assert_eq!(last.to, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_success() {
        let (mut machine, handle, registry) = machine_with(&["COM3", "COM4"]);
        let mut sink = RecordingSink::new();

        machine.connect(&registry, 1, &mut sink).await.unwrap();

        assert!(machine.is_connected());
        assert!(handle.is_open());
        assert_eq!(machine.connected_endpoint().unwrap().device_name, "COM4");
        assert_eq!(
            sink.notifications(),
            vec![Notification::SetConnectedUiState { connected: true }]
        );
        let states: Vec<_> = machine.history().iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![ConnectionState::Connecting, ConnectionState::Connected]
        );
    }

    #[tokio::test]
    async fn test_connect_unknown_id() {
        let (mut machine, _handle, registry) = machine_with(&["COM3"]);
        let mut sink = RecordingSink::new();

        let result = machine.connect(&registry, 5, &mut sink).await;

        assert!(matches!(result, Err(Error::InvalidEndpoint(_))));
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert!(machine.history().is_empty());
        assert_eq!(sink.blocking_messages().len(), 1);
        assert_eq!(sink.blocking_messages()[0].2, Severity::Error);
    }

    #[tokio::test]
    async fn test_connect_rejected_device() {
        let (mut machine, handle, registry) = machine_with(&["COM3"]);
        handle.reject_device("COM3");
        let mut sink = RecordingSink::new();

        let result = machine.connect(&registry, 0, &mut sink).await;

        assert!(matches!(result, Err(Error::InvalidEndpoint(_))));
        assert_eq!(handle.open_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_construction_error() {
        let (mut machine, handle, registry) = machine_with(&["COM3"]);
        handle.fail_next_select("unsupported device");
        let mut sink = RecordingSink::new();

        let result = machine.connect(&registry, 0, &mut sink).await;

        assert!(matches!(result, Err(Error::DeviceConstructionError { .. })));
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(
            sink.count(|n| matches!(n, Notification::SetConnectedUiState { connected: true })),
            0
        );
        assert_eq!(sink.blocking_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_open_error_then_retry() {
        let (mut machine, handle, registry) = machine_with(&["COM3"]);
        handle.fail_next_open("port busy");
        let mut sink = RecordingSink::new();

        let result = machine.connect(&registry, 0, &mut sink).await;
        assert!(matches!(result, Err(Error::DeviceOpenError { .. })));
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert!(!handle.is_open());

        machine.connect(&registry, 0, &mut sink).await.unwrap();
        assert!(machine.is_connected());
    }

    #[tokio::test]
    async fn test_connect_while_connected() {
        let (mut machine, _handle, registry) = machine_with(&["COM3"]);
        let mut sink = RecordingSink::new();
        machine.connect(&registry, 0, &mut sink).await.unwrap();
        let before = sink.notifications().len();

        let result = machine.connect(&registry, 0, &mut sink).await;

        assert!(matches!(result, Err(Error::AlreadyConnected)));
        assert!(machine.is_connected());
        assert_eq!(sink.notifications().len(), before);
    }

    #[tokio::test]
    async fn test_disconnect_idempotent() {
        let (mut machine, handle, registry) = machine_with(&["COM3"]);
        let mut sink = RecordingSink::new();

        machine.disconnect(&mut sink).await;
        assert!(sink.notifications().is_empty());
        assert!(machine.history().is_empty());

        machine.connect(&registry, 0, &mut sink).await.unwrap();
        sink.drain();
        machine.disconnect(&mut sink).await;
        machine.disconnect(&mut sink).await;

        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(handle.close_count(), 1);
        assert_eq!(
            sink.notifications(),
            vec![
                Notification::SetConnectedUiState { connected: false },
                Notification::ClearDeviceInfo,
            ]
        );
    }

    #[tokio::test]
    async fn test_disconnect_survives_close_error() {
        let (mut machine, handle, registry) = machine_with(&["COM3"]);
        let mut sink = RecordingSink::new();
        machine.connect(&registry, 0, &mut sink).await.unwrap();

        handle.fail_next_close("write failed");
        machine.disconnect(&mut sink).await;

        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert!(!handle.is_open());
    }

    #[tokio::test]
    async fn test_disconnected_cause_while_connected() {
        let (mut machine, _handle, registry) = machine_with(&["COM3"]);
        let mut sink = RecordingSink::new();
        machine.connect(&registry, 0, &mut sink).await.unwrap();
        sink.drain();

        machine
            .on_error("Connection lost", Some(DISCONNECTED_CAUSE), &mut sink)
            .await;

        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(
            sink.notifications(),
            vec![
                Notification::ShowBlockingMessage {
                    title: MSG_ERROR_TITLE.to_string(),
                    body: "Connection lost\n\nDisconnected".to_string(),
                    severity: Severity::Error,
                },
                Notification::SetConnectedUiState { connected: false },
                Notification::ClearDeviceInfo,
            ]
        );
    }

    #[rstest]
    #[case(Some("Timeout"))]
    #[case(Some("disconnected"))]
    #[case(None)]
    #[tokio::test]
    async fn test_other_errors_keep_connection(#[case] cause: Option<&str>) {
        let (mut machine, _handle, registry) = machine_with(&["COM3"]);
        let mut sink = RecordingSink::new();
        machine.connect(&registry, 0, &mut sink).await.unwrap();

        machine.on_error("Read failed", cause, &mut sink).await;

        assert!(machine.is_connected());
        assert_eq!(sink.blocking_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnected_cause_while_disconnected() {
        let (mut machine, _handle, _registry) = machine_with(&["COM3"]);
        let mut sink = RecordingSink::new();

        machine
            .on_error("Connection lost", Some(DISCONNECTED_CAUSE), &mut sink)
            .await;

        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(sink.notifications().len(), 1);
    }

    #[test]
    fn test_device_changed_names_source() {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        let mut sink = RecordingSink::new();
        let endpoint = DeviceEndpoint::serial(0, "COM3").with_display_name("BSM8-USB (COM3)");

        machine.on_device_changed(&DeviceDescriptor::si_device(endpoint), &mut sink);
        machine.on_device_changed(&DeviceDescriptor::none(), &mut sink);

        assert_eq!(
            sink.notifications(),
            vec![
                Notification::ShowDeviceInfo {
                    text: "Input source: BSM8-USB (COM3)".to_string()
                },
                Notification::ShowDeviceInfo {
                    text: "Input source: None".to_string()
                },
            ]
        );
    }

    #[rstest]
    #[case(StationConfiguration::master(ProductFamily::Bs8SiMaster, 1), None)]
    #[case(
        StationConfiguration::master(ProductFamily::Bsx7, 1).with_operating_mode(OperatingMode::Control).with_auto_send(true),
        Some(ConfigurationWarning::NotInReadoutMode)
    )]
    #[case(
        StationConfiguration::master(ProductFamily::Bsx8, 1).with_auto_send(true).with_legacy_protocol(true),
        Some(ConfigurationWarning::AutoSendEnabled)
    )]
    #[case(
        StationConfiguration::master(ProductFamily::Bs8SiMaster, 1).with_legacy_protocol(true),
        Some(ConfigurationWarning::LegacyProtocolEnabled)
    )]
    #[case(
        StationConfiguration::master(ProductFamily::Bs11, 1),
        Some(ConfigurationWarning::UnrecognizedDevice)
    )]
    #[case(
        StationConfiguration::master(ProductFamily::Unknown, 1),
        Some(ConfigurationWarning::UnrecognizedDevice)
    )]
    #[case(StationConfiguration::srr_dongle(42, 1), None)]
    fn test_configuration_checks(
        #[case] configuration: StationConfiguration,
        #[case] expected: Option<ConfigurationWarning>,
    ) {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        let mut sink = RecordingSink::new();

        let warning =
            machine.on_configuration_read(&ConfigurationOutcome::Read(configuration), &mut sink);

        assert_eq!(warning, expected);
        assert_eq!(
            sink.count(|n| matches!(n, Notification::ShowDeviceInfo { .. })),
            1
        );
        let messages = sink.blocking_messages();
        match expected {
            Some(warning) => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].0, MSG_CONFIG_WARNING_TITLE);
                assert_eq!(messages[0].1, warning.message());
                assert_eq!(messages[0].2, Severity::Warning);
            }
            None => assert!(messages.is_empty()),
        }
    }

    #[test]
    fn test_master_info_text() {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        let mut sink = RecordingSink::new();
        let configuration = StationConfiguration::master(ProductFamily::Bs8SiMaster, 1);

        machine.on_configuration_read(&ConfigurationOutcome::Read(configuration), &mut sink);

        assert_eq!(
            sink.notifications()[0],
            Notification::ShowDeviceInfo {
                text: "Master station code 1, mode: Readout, autosend: false, legacy protocol: false"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_srr_info_text() {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        let mut sink = RecordingSink::new();

        machine.on_configuration_read(
            &ConfigurationOutcome::Read(StationConfiguration::srr_dongle(42, 1)),
            &mut sink,
        );

        assert_eq!(
            sink.notifications()[0],
            Notification::ShowDeviceInfo {
                text: "SRR dongle 42 (firmware 656, SRR-Dongle), ModD3: false, channel: 1"
                    .to_string()
            }
        );
    }

    #[rstest]
    #[case(ConfigurationFailure::OperatingModeNotSupported)]
    #[case(ConfigurationFailure::DeviceDoesNotHaveBackup)]
    #[case(ConfigurationFailure::ReadoutMasterBackupNotSupported)]
    fn test_configuration_failure_withholds_info(#[case] failure: ConfigurationFailure) {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        let mut sink = RecordingSink::new();

        let warning =
            machine.on_configuration_read(&ConfigurationOutcome::Failed(failure), &mut sink);

        assert!(warning.is_none());
        assert_eq!(
            sink.count(|n| matches!(n, Notification::ShowDeviceInfo { .. })),
            0
        );
        let messages = sink.blocking_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, MSG_ERROR_TITLE);
        assert!(messages[0].1.contains(failure.description()));
        assert_eq!(messages[0].2, Severity::Error);
    }

    #[test]
    fn test_device_state_signal() {
        let (mut machine, _handle, _registry) = machine_with(&[]);
        let mut sink = RecordingSink::new();

        machine.on_device_state_changed(DeviceState::Offline, DeviceState::Busy, &mut sink);

        assert_eq!(
            sink.notifications(),
            vec![Notification::ShowConnectionStatus {
                status: ConnectionStatus::Busy
            }]
        );
    }
}
