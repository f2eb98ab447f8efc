//! Mock SI reading device for testing and development.
//!
//! This module provides a simulated reader that can be controlled
//! programmatically for testing without a physical station. The reader
//! behaves like a real one at its boundary: selecting an input reports the
//! device, opening it brings the device online and reports the station
//! configuration, and closing it takes the device offline.

use std::sync::{Arc, Mutex, MutexGuard};

use siac_core::CardReading;
use siac_core::constants::DEFAULT_EVENT_CHANNEL_CAPACITY;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    HardwareError, Result,
    events::ReaderEvent,
    traits::{DeviceSessionProvider, PortEnumerator},
    types::{ConfigurationOutcome, DeviceDescriptor, DeviceEndpoint, DeviceState},
};

/// Mock SI reader for testing and development.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use siac_core::CardReading;
/// use siac_hardware::ReaderEvent;
/// use siac_hardware::mock::MockReader;
/// use siac_hardware::traits::DeviceSessionProvider;
///
/// #[tokio::main]
/// async fn main() -> siac_hardware::Result<()> {
///     let (mut reader, handle) = MockReader::new();
///     let mut events = reader.subscribe().expect("first subscription");
///
///     let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
///     handle.read_card(CardReading::new("8001234", 3.0, 2.5, date)).await?;
///
///     match events.recv().await {
///         Some(ReaderEvent::CardRead(cards)) => assert_eq!(cards[0].card_id, "8001234"),
///         other => panic!("unexpected event: {:?}", other),
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockReader {
    /// Sender used for events the reader raises itself.
    event_tx: mpsc::Sender<ReaderEvent>,

    /// Receiver handed out by `subscribe`.
    event_rx: Option<mpsc::Receiver<ReaderEvent>>,

    /// State shared with the handle.
    shared: Arc<Mutex<MockReaderState>>,

    /// Input selected by `select_input`.
    selected: Option<DeviceEndpoint>,
}

/// State shared between a mock reader and its handles.
#[derive(Debug, Default)]
struct MockReaderState {
    endpoints: Vec<DeviceEndpoint>,
    rejected_devices: Vec<String>,
    fail_next_select: Option<String>,
    fail_next_open: Option<String>,
    fail_next_close: Option<String>,
    configuration: Option<ConfigurationOutcome>,
    open: bool,
    open_count: usize,
    close_count: usize,
}

fn lock(shared: &Mutex<MockReaderState>) -> MutexGuard<'_, MockReaderState> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockReader {
    /// Create a new mock reader with no endpoints.
    ///
    /// Returns a tuple of (MockReader, MockReaderHandle) where the handle
    /// can be used to script endpoints, failures, and device events.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_capacity(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    /// Create a mock reader whose event channel buffers `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> (Self, MockReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let shared = Arc::new(Mutex::new(MockReaderState::default()));

        let reader = Self {
            event_tx: event_tx.clone(),
            event_rx: Some(event_rx),
            shared: Arc::clone(&shared),
            selected: None,
        };

        let handle = MockReaderHandle { event_tx, shared };

        (reader, handle)
    }

    /// Create a mock reader that lists the given device names.
    pub fn with_endpoints<I, S>(device_names: I) -> (Self, MockReaderHandle)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (reader, handle) = Self::new();
        handle.set_endpoints(
            device_names
                .into_iter()
                .enumerate()
                .map(|(id, name)| DeviceEndpoint::serial(id, name))
                .collect(),
        );
        (reader, handle)
    }

    /// Endpoint currently selected as input, if any.
    pub fn selected_input(&self) -> Option<&DeviceEndpoint> {
        self.selected.as_ref()
    }

    /// Raise an event without blocking.
    ///
    /// The reader raises events from inside open/close calls, so it must
    /// not wait for the consumer to make room. Events that find the channel
    /// full are dropped with a warning; events that get through keep their
    /// order. Handle emitters wait for room instead.
    fn raise(&self, event: ReaderEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Mock reader dropped event: {}", e);
        }
    }
}

impl PortEnumerator for MockReader {
    fn list_endpoints(&self) -> Vec<DeviceEndpoint> {
        lock(&self.shared).endpoints.clone()
    }

    fn is_endpoint_valid(&self, endpoint: &DeviceEndpoint) -> bool {
        !endpoint.device_name.trim().is_empty()
            && !lock(&self.shared)
                .rejected_devices
                .contains(&endpoint.device_name)
    }
}

impl DeviceSessionProvider for MockReader {
    async fn select_input(&mut self, endpoint: &DeviceEndpoint) -> Result<()> {
        if let Some(message) = lock(&self.shared).fail_next_select.take() {
            return Err(HardwareError::construction_failed(
                endpoint.device_name.clone(),
                message,
            ));
        }

        debug!("Mock reader selected {}", endpoint);
        self.selected = Some(endpoint.clone());
        self.raise(ReaderEvent::DeviceChanged(DeviceDescriptor::si_device(
            endpoint.clone(),
        )));
        Ok(())
    }

    async fn open_input(&mut self) -> Result<()> {
        let endpoint = self.selected.clone().ok_or(HardwareError::NotOpen)?;

        let configuration = {
            let mut state = lock(&self.shared);
            if let Some(message) = state.fail_next_open.take() {
                return Err(HardwareError::open_failed(endpoint.device_name, message));
            }
            state.open = true;
            state.open_count += 1;
            state.configuration.clone()
        };

        debug!("Mock reader opened {}", endpoint);
        self.raise(ReaderEvent::DeviceStateChanged {
            old: DeviceState::Offline,
            new: DeviceState::Online,
        });
        if let Some(configuration) = configuration {
            self.raise(ReaderEvent::ConfigurationRead(configuration));
        }
        Ok(())
    }

    async fn close_input(&mut self) -> Result<()> {
        let was_open = {
            let mut state = lock(&self.shared);
            let was_open = state.open;
            state.open = false;
            if was_open {
                state.close_count += 1;
            }
            if let Some(message) = state.fail_next_close.take() {
                return Err(HardwareError::communication(message));
            }
            was_open
        };

        if was_open {
            debug!("Mock reader closed input");
            self.raise(ReaderEvent::DeviceStateChanged {
                old: DeviceState::Online,
                new: DeviceState::Offline,
            });
        }
        Ok(())
    }

    fn is_input_open(&self) -> bool {
        lock(&self.shared).open
    }

    fn subscribe(&mut self) -> Option<mpsc::Receiver<ReaderEvent>> {
        self.event_rx.take()
    }
}

/// Handle for controlling a mock reader.
///
/// The handle scripts what the reader lists and how its next calls fail,
/// and injects device events as if the station had raised them. It can be
/// cloned and shared across tasks; clones control the same reader.
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    /// Channel sender for injected events
    event_tx: mpsc::Sender<ReaderEvent>,

    /// State shared with the reader
    shared: Arc<Mutex<MockReaderState>>,
}

impl MockReaderHandle {
    /// Replace the endpoints the reader lists.
    ///
    /// Ids are reassigned `0..n` in the given order.
    pub fn set_endpoints(&self, endpoints: Vec<DeviceEndpoint>) {
        lock(&self.shared).endpoints = endpoints
            .into_iter()
            .enumerate()
            .map(|(id, endpoint)| endpoint.with_id(id))
            .collect();
    }

    /// Make the validity check reject a device name.
    pub fn reject_device(&self, device_name: impl Into<String>) {
        lock(&self.shared).rejected_devices.push(device_name.into());
    }

    /// Make the next `select_input` fail with a construction error.
    pub fn fail_next_select(&self, message: impl Into<String>) {
        lock(&self.shared).fail_next_select = Some(message.into());
    }

    /// Make the next `open_input` fail with an open error.
    pub fn fail_next_open(&self, message: impl Into<String>) {
        lock(&self.shared).fail_next_open = Some(message.into());
    }

    /// Make the next `close_input` report a transport error after closing.
    pub fn fail_next_close(&self, message: impl Into<String>) {
        lock(&self.shared).fail_next_close = Some(message.into());
    }

    /// Station configuration reported after every successful open.
    pub fn set_configuration(&self, outcome: ConfigurationOutcome) {
        lock(&self.shared).configuration = Some(outcome);
    }

    /// Whether the reader's input device is open.
    pub fn is_open(&self) -> bool {
        lock(&self.shared).open
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> usize {
        lock(&self.shared).open_count
    }

    /// Number of closes of an open device so far.
    pub fn close_count(&self) -> usize {
        lock(&self.shared).close_count
    }

    /// Inject an arbitrary event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub async fn emit(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("Mock reader event channel closed"))
    }

    /// Simulate one card readout.
    pub async fn read_card(&self, reading: CardReading) -> Result<()> {
        self.emit(ReaderEvent::CardRead(vec![reading])).await
    }

    /// Simulate a readout that delivers several cards at once.
    pub async fn read_cards(&self, readings: Vec<CardReading>) -> Result<()> {
        self.emit(ReaderEvent::CardRead(readings)).await
    }

    /// Simulate a hardware state change.
    pub async fn change_state(&self, old: DeviceState, new: DeviceState) -> Result<()> {
        self.emit(ReaderEvent::DeviceStateChanged { old, new }).await
    }

    /// Simulate a reader error.
    pub async fn report_error(
        &self,
        message: impl Into<String>,
        cause: Option<String>,
    ) -> Result<()> {
        self.emit(ReaderEvent::error(message, cause)).await
    }

    /// Simulate the station being unplugged.
    ///
    /// The reader's input is marked closed and a transport-lost error is
    /// raised, as a real reader does when the cable is pulled.
    pub async fn unplug(&self) -> Result<()> {
        lock(&self.shared).open = false;
        self.emit(ReaderEvent::disconnected("Connection to the station was lost"))
            .await
    }

    /// Simulate a diagnostic log line.
    pub async fn log(&self, text: impl Into<String>) -> Result<()> {
        self.emit(ReaderEvent::LogMessage(text.into())).await
    }
}
